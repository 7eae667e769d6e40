// ********* Scorers ***********

use std::fmt::Debug;

use crate::ballot::Ballot;
use crate::error::{ConversionSnafu, RuleResult};
use crate::order::*;

/// Computes the contribution of one converted ballot to the score of each candidate.
///
/// The result has an entry for every candidate of `candidates`, including the ones the ballot does
/// not mention.
pub trait Scorer: Debug + Send + Sync {
    fn scores(
        &self,
        ballot: &Ballot,
        voter: Option<&str>,
        candidates: &CandidateSet,
    ) -> RuleResult<Scores>;
}

fn zeros(candidates: &CandidateSet) -> Scores {
    candidates.iter().map(|c| (c.clone(), 0.0)).collect()
}

fn wrong_format<T>(ballot: &Ballot, expected: &str) -> RuleResult<T> {
    ConversionSnafu {
        ballot: format!("{} ({})", ballot, ballot.kind()),
        target: format!("a {} ballot for scoring", expected),
    }
    .fail()
}

/// One point for the chosen candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScorerPlurality;

impl Scorer for ScorerPlurality {
    fn scores(&self, ballot: &Ballot, _: Option<&str>, candidates: &CandidateSet) -> RuleResult<Scores> {
        let mut res = zeros(candidates);
        match ballot {
            Ballot::Plurality(choice) => {
                if let Some(s) = choice.as_ref().and_then(|c| res.get_mut(c)) {
                    *s = 1.0;
                }
                Ok(res)
            }
            _ => wrong_format(ballot, "plurality"),
        }
    }
}

/// Minus one point for the vetoed candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScorerVeto;

impl Scorer for ScorerVeto {
    fn scores(&self, ballot: &Ballot, _: Option<&str>, candidates: &CandidateSet) -> RuleResult<Scores> {
        let mut res = zeros(candidates);
        match ballot {
            Ballot::Veto(choice) => {
                if let Some(s) = choice.as_ref().and_then(|c| res.get_mut(c)) {
                    *s = -1.0;
                }
                Ok(res)
            }
            _ => wrong_format(ballot, "veto"),
        }
    }
}

/// Borda points: one point per candidate ranked strictly below, plus half a point per other
/// member of the candidate's tie-class.
///
/// Candidates that the ballot does not rank are tied at the bottom.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScorerBorda;

impl Scorer for ScorerBorda {
    fn scores(&self, ballot: &Ballot, _: Option<&str>, candidates: &CandidateSet) -> RuleResult<Scores> {
        let b = match ballot {
            Ballot::Order(b) => b,
            _ => return wrong_format(ballot, "order"),
        };
        let mut order = restrict_order(b.order(), candidates);
        let bottom: CandidateSet = candidates.difference(&flatten(&order)).cloned().collect();
        if !bottom.is_empty() {
            order.push(bottom);
        }
        let mut res = Scores::new();
        let mut below = candidates.len();
        for tie_class in order.iter() {
            below -= tie_class.len();
            let points = below as f64 + (tie_class.len() - 1) as f64 / 2.0;
            for c in tie_class.iter() {
                res.insert(c.clone(), points);
            }
        }
        Ok(res)
    }
}

/// The grade of each candidate, 0 when the ballot does not grade it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScorerLevels;

impl Scorer for ScorerLevels {
    fn scores(&self, ballot: &Ballot, _: Option<&str>, candidates: &CandidateSet) -> RuleResult<Scores> {
        match ballot {
            Ballot::Levels(grades) => Ok(candidates
                .iter()
                .map(|c| (c.clone(), grades.get(c).cloned().unwrap_or(0.0)))
                .collect()),
            _ => wrong_format(ballot, "levels"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> CandidateSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn borda_splits_ties_and_bottom() {
        let b = Ballot::parse("a > b ~ c").unwrap();
        let s = ScorerBorda
            .scores(&b, None, &set(&["a", "b", "c", "d"]))
            .unwrap();
        assert_eq!(s["a"], 3.0);
        assert_eq!(s["b"], 1.5);
        assert_eq!(s["c"], 1.5);
        assert_eq!(s["d"], 0.0);
    }

    #[test]
    fn plurality_gives_zero_to_everyone_else() {
        let b = Ballot::Plurality(Some("b".to_string()));
        let s = ScorerPlurality.scores(&b, None, &set(&["a", "b"])).unwrap();
        assert_eq!(s["a"], 0.0);
        assert_eq!(s["b"], 1.0);
        assert!(ScorerPlurality
            .scores(&Ballot::Veto(None), None, &set(&["a"]))
            .is_err());
    }

    #[test]
    fn veto_removes_one_point() {
        let b = Ballot::Veto(Some("a".to_string()));
        let s = ScorerVeto.scores(&b, Some("v1"), &set(&["a", "b"])).unwrap();
        assert_eq!(s["a"], -1.0);
        assert_eq!(s["b"], 0.0);
    }
}
