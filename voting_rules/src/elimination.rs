// ********* Eliminations ***********

use std::fmt::Debug;
use std::sync::Arc;

use log::{debug, info};
use snafu::OptionExt;

use crate::error::{InvalidEliminationSnafu, MissingInputSnafu, RuleResult};
use crate::memo::Memo;
use crate::order::*;
use crate::rule::Rule;

/// Decides which candidates of an evaluated rule are eliminated.
pub trait EliminationStrategy: Debug + Send + Sync {
    fn name(&self) -> String;

    /// The eliminated candidates, as a weak order best first. It may be empty: [`Elimination`]
    /// reports it as an error.
    fn eliminated_order(&self, rule: &dyn Rule) -> RuleResult<WeakOrder>;
}

/// Eliminates the last `k` candidates of the order of the rule.
///
/// Tie-classes are peeled from the end of the order and never split, so more than `k`
/// candidates may be eliminated. If `k` is negative, `-k` is the number of candidates to keep:
/// all the others are peeled the same way, so fewer than `-k` may qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EliminationLast {
    pub k: i64,
}

impl EliminationStrategy for EliminationLast {
    fn name(&self) -> String {
        format!("last(k={})", self.k)
    }

    fn eliminated_order(&self, rule: &dyn Rule) -> RuleResult<WeakOrder> {
        let order = rule.order()?;
        let target = if self.k >= 0 {
            self.k as usize
        } else {
            let keep = self.k.unsigned_abs() as usize;
            rule.candidates()?.len().saturating_sub(keep)
        };
        let mut count = 0;
        let mut start = order.len();
        while start > 0 && count < target {
            start -= 1;
            count += order[start].len();
        }
        Ok(order[start..].to_vec())
    }
}

/// Eliminates the candidates whose score is strictly below the average score.
///
/// If no candidate is below the average (all the scores are equal, or there is only one
/// candidate), all of them are eliminated. The rule must have scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EliminationBelowAverage;

impl EliminationStrategy for EliminationBelowAverage {
    fn name(&self) -> String {
        "below_average".to_string()
    }

    fn eliminated_order(&self, rule: &dyn Rule) -> RuleResult<WeakOrder> {
        let scores = rule.scores()?;
        if scores.is_empty() {
            return Ok(Vec::new());
        }
        let average = scores.values().sum::<f64>() / scores.len() as f64;
        let below: CandidateSet = scores
            .iter()
            .filter(|(_, s)| **s < average)
            .map(|(c, _)| c.clone())
            .collect();
        debug!(
            "EliminationBelowAverage: average {}, eliminating {:?}",
            average, below
        );
        if below.is_empty() {
            return Ok(rule.order()?.clone());
        }
        Ok(restrict_order(rule.order()?, &below))
    }
}

/// An elimination step: a strategy applied to one evaluated rule.
///
/// The results are computed on first read and dropped when another rule is loaded.
///
/// ```
/// use voting_rules::{Elimination, Profile, Rule, RuleScoreNum};
/// # use voting_rules::RuleError;
///
/// let profile = Profile::parse(&["a > b > c", "a > b > c", "b > a > c", "b > c > a"])?;
/// let rule = RuleScoreNum::plurality().with_profile(profile)?;
/// let elimination = Elimination::last(1).with_rule(Box::new(rule));
/// assert_eq!(elimination.eliminated()?.len(), 1);
/// assert!(elimination.qualified()?.contains("a"));
/// # Ok::<(), RuleError>(())
/// ```
#[derive(Debug)]
pub struct Elimination {
    strategy: Arc<dyn EliminationStrategy>,
    rule: Option<Box<dyn Rule>>,
    eliminated_order: Memo<WeakOrder>,
    eliminated: Memo<CandidateSet>,
    qualified: Memo<CandidateSet>,
}

impl Elimination {
    pub fn new(strategy: Arc<dyn EliminationStrategy>) -> Elimination {
        Elimination {
            strategy,
            rule: None,
            eliminated_order: Memo::new(),
            eliminated: Memo::new(),
            qualified: Memo::new(),
        }
    }

    pub fn last(k: i64) -> Elimination {
        Elimination::new(Arc::new(EliminationLast { k }))
    }

    pub fn below_average() -> Elimination {
        Elimination::new(Arc::new(EliminationBelowAverage))
    }

    pub fn name(&self) -> String {
        self.strategy.name()
    }

    /// A new elimination with the same strategy and no rule.
    pub fn fresh(&self) -> Elimination {
        Elimination::new(self.strategy.clone())
    }

    /// Attaches a rule, dropping the previous results.
    pub fn load(&mut self, rule: Box<dyn Rule>) {
        self.rule = Some(rule);
        self.eliminated_order.clear();
        self.eliminated.clear();
        self.qualified.clear();
    }

    pub fn with_rule(mut self, rule: Box<dyn Rule>) -> Elimination {
        self.load(rule);
        self
    }

    pub fn rule(&self) -> RuleResult<&dyn Rule> {
        match &self.rule {
            Some(r) => Ok(r.as_ref()),
            None => MissingInputSnafu {
                what: format!("rule of elimination {}", self.name()),
            }
            .fail(),
        }
    }

    /// Gives the rule back, dropping the elimination.
    pub fn into_rule(self) -> RuleResult<Box<dyn Rule>> {
        let name = self.name();
        self.rule.context(MissingInputSnafu {
            what: format!("rule of elimination {}", name),
        })
    }

    /// The eliminated candidates, best first. Never empty.
    pub fn eliminated_order(&self) -> RuleResult<&WeakOrder> {
        self.eliminated_order.get_or_try_init(|| {
            let rule = self.rule()?;
            let res = self.strategy.eliminated_order(rule)?;
            if res.iter().all(|tc| tc.is_empty()) {
                return InvalidEliminationSnafu {
                    method: self.name(),
                    candidates: rule.candidates()?.iter().cloned().collect::<Vec<_>>(),
                }
                .fail();
            }
            info!(
                "Elimination {}: eliminated {}",
                self.name(),
                format_weak_order(&res)
            );
            Ok(res)
        })
    }

    pub fn eliminated(&self) -> RuleResult<&CandidateSet> {
        self.eliminated
            .get_or_try_init(|| Ok(flatten(self.eliminated_order()?)))
    }

    /// The candidates of the rule that are not eliminated. May be empty.
    pub fn qualified(&self) -> RuleResult<&CandidateSet> {
        self.qualified.get_or_try_init(|| {
            let eliminated = self.eliminated()?;
            Ok(self
                .rule()?
                .candidates()?
                .difference(eliminated)
                .cloned()
                .collect())
        })
    }
}
