// ********* Ballot converters ***********

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use crate::ballot::{Ballot, BallotOrder};
use crate::error::{ConversionSnafu, RuleResult};
use crate::order::*;
use crate::priority::Priority;
use crate::profile::Profile;

/// Maps a raw ballot to the canonical form a rule needs.
///
/// The result only mentions candidates of `candidates`.
pub trait Converter: Debug + Send + Sync {
    fn convert(&self, ballot: &Ballot, candidates: &CandidateSet) -> RuleResult<Ballot>;

    fn convert_profile(&self, profile: &Profile, candidates: &CandidateSet) -> RuleResult<Profile> {
        profile.map_ballots(|b| self.convert(b, candidates))
    }
}

fn unsupported<T>(ballot: &Ballot, target: &str) -> RuleResult<T> {
    ConversionSnafu {
        ballot: format!("{} ({})", ballot, ballot.kind()),
        target,
    }
    .fail()
}

/// The candidates with the highest (or lowest, if `lowest`) grade.
fn extreme_grades(grades: &BTreeMap<Candidate, f64>, lowest: bool) -> CandidateSet {
    let values = grades.values().cloned();
    let target = if lowest {
        values.reduce(f64::min)
    } else {
        values.reduce(f64::max)
    };
    match target {
        Some(t) => grades
            .iter()
            .filter(|(_, g)| **g == t)
            .map(|(c, _)| c.clone())
            .collect(),
        None => BTreeSet::new(),
    }
}

/// Keeps the format of the ballot and only restricts it to the candidates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConverterGeneral;

impl Converter for ConverterGeneral {
    fn convert(&self, ballot: &Ballot, candidates: &CandidateSet) -> RuleResult<Ballot> {
        Ok(ballot.restrict(candidates))
    }
}

/// Converts to an order ballot.
///
/// Grades are ranked by decreasing value. A plurality ballot ranks its candidate first and a veto
/// ballot ranks its candidate last, the other candidates being tied.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConverterToOrder;

impl Converter for ConverterToOrder {
    fn convert(&self, ballot: &Ballot, candidates: &CandidateSet) -> RuleResult<Ballot> {
        let res = match ballot.restrict(candidates) {
            Ballot::Order(b) => b,
            Ballot::Levels(grades) => {
                let presented: CandidateSet = grades.keys().cloned().collect();
                BallotOrder::new(order_from_scores(&grades), Some(presented))?
            }
            Ballot::Plurality(Some(c)) => {
                BallotOrder::new(vec![BTreeSet::from([c])], Some(candidates.clone()))?
            }
            Ballot::Veto(Some(c)) => {
                let others: CandidateSet = candidates.iter().filter(|x| **x != c).cloned().collect();
                let order: WeakOrder = vec![others, BTreeSet::from([c])];
                BallotOrder::new(order, Some(candidates.clone()))?
            }
            Ballot::Plurality(None) | Ballot::Veto(None) => BallotOrder::new(vec![], None)?,
        };
        Ok(Ballot::Order(res))
    }
}

/// Converts to a plurality ballot: the voter's favourite candidate.
///
/// Ties at the top of the ballot are broken by `priority`.
#[derive(Debug, Clone, Default)]
pub struct ConverterToPlurality {
    pub priority: Priority,
}

impl Converter for ConverterToPlurality {
    fn convert(&self, ballot: &Ballot, candidates: &CandidateSet) -> RuleResult<Ballot> {
        let top: Option<Candidate> = match ballot.restrict(candidates) {
            Ballot::Order(b) => match b.order().first() {
                Some(tie_class) => self.priority.choice(tie_class, false)?,
                None => None,
            },
            Ballot::Levels(grades) => self.priority.choice(&extreme_grades(&grades, false), false)?,
            Ballot::Plurality(c) => c,
            Ballot::Veto(_) => return unsupported(ballot, "plurality"),
        };
        Ok(Ballot::Plurality(top))
    }
}

/// Converts to a veto ballot: the voter's least liked candidate.
///
/// Unranked candidates count as tied at the bottom. Ties are broken by `priority`, the least
/// preferred candidate being vetoed.
#[derive(Debug, Clone, Default)]
pub struct ConverterToVeto {
    pub priority: Priority,
}

impl Converter for ConverterToVeto {
    fn convert(&self, ballot: &Ballot, candidates: &CandidateSet) -> RuleResult<Ballot> {
        let bottom: Option<Candidate> = match ballot.restrict(candidates) {
            Ballot::Order(b) => match b.completed_order().last() {
                Some(tie_class) => self.priority.choice(tie_class, true)?,
                None => None,
            },
            Ballot::Levels(grades) => self.priority.choice(&extreme_grades(&grades, true), true)?,
            Ballot::Veto(c) => c,
            Ballot::Plurality(_) => return unsupported(ballot, "veto"),
        };
        Ok(Ballot::Veto(bottom))
    }
}

/// Converts to grades in the integer range `[low, high]`.
///
/// For an order ballot, a candidate with `r` of the `m` ranked candidates strictly below it gets
/// `low + round((high - low) * r / (m - 1))`; unranked candidates get `low`.
#[derive(Debug, Clone, Copy)]
pub struct ConverterToGrades {
    pub low: i64,
    pub high: i64,
}

impl ConverterToGrades {
    pub fn new(low: i64, high: i64) -> ConverterToGrades {
        ConverterToGrades { low, high }
    }

    fn grades_of_order(&self, b: &BallotOrder) -> BTreeMap<Candidate, f64> {
        let (low, high) = (self.low as f64, self.high as f64);
        let m = b.ranked().len();
        let mut res: BTreeMap<Candidate, f64> = b.unranked().into_iter().map(|c| (c, low)).collect();
        let mut below = m;
        for tie_class in b.order().iter() {
            below -= tie_class.len();
            let grade = if m <= 1 {
                high
            } else {
                low + ((high - low) * below as f64 / (m - 1) as f64).round()
            };
            for c in tie_class.iter() {
                res.insert(c.clone(), grade);
            }
        }
        res
    }
}

impl Default for ConverterToGrades {
    fn default() -> ConverterToGrades {
        ConverterToGrades::new(0, 1)
    }
}

impl Converter for ConverterToGrades {
    fn convert(&self, ballot: &Ballot, candidates: &CandidateSet) -> RuleResult<Ballot> {
        let (low, high) = (self.low as f64, self.high as f64);
        let grades = match ballot.restrict(candidates) {
            Ballot::Levels(grades) => {
                if grades.values().any(|g| *g < low || *g > high) {
                    return unsupported(ballot, &format!("grades in [{}, {}]", self.low, self.high));
                }
                grades
            }
            Ballot::Order(b) => self.grades_of_order(&b),
            Ballot::Plurality(choice) => candidates
                .iter()
                .map(|c| (c.clone(), if Some(c) == choice.as_ref() { high } else { low }))
                .collect(),
            Ballot::Veto(choice) => candidates
                .iter()
                .map(|c| (c.clone(), if Some(c) == choice.as_ref() { low } else { high }))
                .collect(),
        };
        Ok(Ballot::Levels(grades))
    }
}
