// ********* Ballots ***********

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::error::{RuleResult, ValidationSnafu};
use crate::order::*;

/// A ballot expressed as a weak order.
///
/// The voter may have been presented more candidates than they ranked: those are the unranked
/// candidates, which every rule treats as tied below the ranked ones.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct BallotOrder {
    order: WeakOrder,
    // Invariant: contains all the candidates of `order`.
    candidates: CandidateSet,
}

impl BallotOrder {
    /// Creates a ballot. If `candidates` is not given, only the ranked candidates are presented.
    pub fn new(order: WeakOrder, candidates: Option<CandidateSet>) -> RuleResult<BallotOrder> {
        let ranked = flatten(&order);
        if ranked.len() != order.iter().map(|tc| tc.len()).sum::<usize>() {
            return ValidationSnafu {
                reason: format!("candidate ranked twice in {}", format_weak_order(&order)),
            }
            .fail();
        }
        let order: WeakOrder = order.into_iter().filter(|tc| !tc.is_empty()).collect();
        let candidates = match candidates {
            Some(cands) if !ranked.is_subset(&cands) => {
                return ValidationSnafu {
                    reason: format!(
                        "ballot {} ranks candidates outside of {:?}",
                        format_weak_order(&order),
                        cands
                    ),
                }
                .fail();
            }
            Some(cands) => cands,
            None => ranked,
        };
        Ok(BallotOrder { order, candidates })
    }

    pub fn parse(s: &str) -> RuleResult<BallotOrder> {
        BallotOrder::new(parse_weak_order(s)?, None)
    }

    pub fn order(&self) -> &WeakOrder {
        &self.order
    }

    /// All the candidates presented to the voter, ranked or not.
    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    pub fn ranked(&self) -> CandidateSet {
        flatten(&self.order)
    }

    pub fn unranked(&self) -> CandidateSet {
        self.candidates.difference(&self.ranked()).cloned().collect()
    }

    /// The order with the unranked candidates appended as a bottom tie-class.
    pub fn completed_order(&self) -> WeakOrder {
        let mut order = self.order.clone();
        let unranked = self.unranked();
        if !unranked.is_empty() {
            order.push(unranked);
        }
        order
    }

    pub fn restrict(&self, candidates: &CandidateSet) -> BallotOrder {
        BallotOrder {
            order: restrict_order(&self.order, candidates),
            candidates: self.candidates.intersection(candidates).cloned().collect(),
        }
    }
}

/// One voter's expression of preference.
#[derive(PartialEq, Debug, Clone)]
pub enum Ballot {
    /// A ranking, possibly with ties.
    Order(BallotOrder),
    /// A grade for some candidates.
    Levels(BTreeMap<Candidate, f64>),
    /// A single chosen candidate. `None` is an abstention.
    Plurality(Option<Candidate>),
    /// A single rejected candidate. `None` is an abstention.
    Veto(Option<Candidate>),
}

impl Ballot {
    /// Parses an order ballot, such as `"a > b ~ c"`.
    pub fn parse(s: &str) -> RuleResult<Ballot> {
        Ok(Ballot::Order(BallotOrder::parse(s)?))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Ballot::Order(_) => "order",
            Ballot::Levels(_) => "levels",
            Ballot::Plurality(_) => "plurality",
            Ballot::Veto(_) => "veto",
        }
    }

    /// The candidates this ballot mentions.
    pub fn candidates(&self) -> CandidateSet {
        match self {
            Ballot::Order(b) => b.candidates().clone(),
            Ballot::Levels(grades) => grades.keys().cloned().collect(),
            Ballot::Plurality(c) | Ballot::Veto(c) => c.iter().cloned().collect(),
        }
    }

    /// Keeps only the given candidates.
    ///
    /// A plurality or veto ballot whose candidate is removed becomes an abstention.
    pub fn restrict(&self, candidates: &CandidateSet) -> Ballot {
        match self {
            Ballot::Order(b) => Ballot::Order(b.restrict(candidates)),
            Ballot::Levels(grades) => Ballot::Levels(
                grades
                    .iter()
                    .filter(|(c, _)| candidates.contains(*c))
                    .map(|(c, g)| (c.clone(), *g))
                    .collect(),
            ),
            Ballot::Plurality(c) => {
                Ballot::Plurality(c.clone().filter(|name| candidates.contains(name)))
            }
            Ballot::Veto(c) => Ballot::Veto(c.clone().filter(|name| candidates.contains(name))),
        }
    }
}

impl Display for Ballot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ballot::Order(b) => write!(f, "{}", format_weak_order(b.order())),
            Ballot::Levels(grades) => {
                let items: Vec<String> = grades.iter().map(|(c, g)| format!("{c}: {g}")).collect();
                write!(f, "{{{}}}", items.join(", "))
            }
            Ballot::Plurality(Some(c)) => write!(f, "plurality({c})"),
            Ballot::Veto(Some(c)) => write!(f, "veto({c})"),
            Ballot::Plurality(None) | Ballot::Veto(None) => write!(f, "abstention"),
        }
    }
}
