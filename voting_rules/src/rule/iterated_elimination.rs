use log::info;

use crate::elimination::Elimination;
use crate::error::RuleResult;
use crate::memo::Memo;
use crate::order::*;
use crate::rule::{Rule, RuleBase};

/// Runs the base rule and the elimination again and again, until every candidate is eliminated.
///
/// Each round evaluates a fresh copy of the base rule on the remaining candidates, with the same
/// converted profile. The candidates eliminated last come first in the order.
///
/// ```
/// use voting_rules::{Elimination, Profile, Rule, RuleIteratedElimination, RuleScoreNum};
/// # use voting_rules::RuleError;
///
/// let profile =
///     Profile::parse_weighted(&["a > b > c", "b > a > c", "c > a > b"], &[2.0, 3.0, 4.0])?;
/// let irv = RuleIteratedElimination::new(Box::new(RuleScoreNum::plurality()), Elimination::last(1))
///     .with_profile(profile)?;
/// assert_eq!(irv.eliminations()?.len(), 3);
/// assert_eq!(irv.winner()?, "b");
/// # Ok::<(), RuleError>(())
/// ```
#[derive(Debug)]
pub struct RuleIteratedElimination {
    base: RuleBase,
    base_rule: Box<dyn Rule>,
    elimination: Elimination,
    propagate_tie_break: bool,
    eliminations: Memo<Vec<Elimination>>,
}

impl RuleIteratedElimination {
    pub fn new(base_rule: Box<dyn Rule>, elimination: Elimination) -> RuleIteratedElimination {
        RuleIteratedElimination {
            base: RuleBase::default(),
            base_rule,
            elimination,
            propagate_tie_break: true,
            eliminations: Memo::new(),
        }
    }

    /// If set (the default), the tie-break of this rule replaces the one of the base rule in
    /// every round.
    pub fn with_propagate_tie_break(mut self, propagate: bool) -> RuleIteratedElimination {
        self.propagate_tie_break = propagate;
        self.eliminations.clear();
        self
    }

    /// The elimination rounds, in chronological order. Each of them holds its own evaluated rule.
    pub fn eliminations(&self) -> RuleResult<&[Elimination]> {
        let res = self.eliminations.get_or_try_init(|| {
            let profile = self.converted_profile()?;
            let mut candidates = self.candidates()?.clone();
            let mut res: Vec<Elimination> = Vec::new();
            while !candidates.is_empty() {
                info!(
                    "RuleIteratedElimination: round {} with {} candidates",
                    res.len() + 1,
                    candidates.len()
                );
                let mut rule = self.base_rule.fresh();
                if self.propagate_tie_break {
                    rule.set_tie_break(self.tie_break().clone());
                }
                rule.load_unchecked(profile.clone(), candidates);
                let elimination = self.elimination.fresh().with_rule(rule);
                candidates = elimination.qualified()?.clone();
                res.push(elimination);
            }
            Ok(res)
        })?;
        Ok(res.as_slice())
    }
}

impl Rule for RuleIteratedElimination {
    fn name(&self) -> &str {
        "iterated_elimination"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RuleBase {
        &mut self.base
    }

    fn fresh(&self) -> Box<dyn Rule> {
        Box::new(RuleIteratedElimination {
            base: self.base.fresh(),
            base_rule: self.base_rule.fresh(),
            elimination: self.elimination.fresh(),
            propagate_tie_break: self.propagate_tie_break,
            eliminations: Memo::new(),
        })
    }

    fn clear_cache(&mut self) {
        self.eliminations.clear();
    }

    fn compute_order(&self) -> RuleResult<WeakOrder> {
        let mut res: WeakOrder = Vec::new();
        for elimination in self.eliminations()?.iter().rev() {
            res.extend(elimination.eliminated_order()?.iter().cloned());
        }
        Ok(res)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;
    use crate::priority::Priority;
    use crate::profile::Profile;
    use crate::rule::RuleScoreNum;

    fn set(names: &[&str]) -> CandidateSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn scores(items: &[(&str, f64)]) -> Scores {
        items.iter().map(|(c, v)| (c.to_string(), *v)).collect()
    }

    fn irv() -> RuleIteratedElimination {
        RuleIteratedElimination::new(Box::new(RuleScoreNum::plurality()), Elimination::last(1))
    }

    fn round_scores(rule: &RuleIteratedElimination) -> Vec<Scores> {
        rule.eliminations()
            .unwrap()
            .iter()
            .map(|e| e.rule().unwrap().scores().unwrap().clone())
            .collect()
    }

    #[test]
    fn instant_runoff() {
        let profile =
            Profile::parse_weighted(&["a > b > c", "b > a > c", "c > a > b"], &[2.0, 3.0, 4.0])
                .unwrap();
        let rule = irv().with_profile(profile).unwrap();
        assert_eq!(
            round_scores(&rule),
            vec![
                scores(&[("a", 2.0), ("b", 3.0), ("c", 4.0)]),
                scores(&[("b", 5.0), ("c", 4.0)]),
                scores(&[("b", 9.0)]),
            ]
        );
        assert_eq!(rule.order().unwrap(), &vec![set(&["b"]), set(&["c"]), set(&["a"])]);
        assert_eq!(rule.winner().unwrap(), "b");
    }

    #[test]
    fn tied_candidates_are_eliminated_together() {
        let profile =
            Profile::parse_weighted(&["a > c > b", "b > a > c", "c > a > b"], &[1.0, 2.0, 1.0])
                .unwrap();
        let rule = irv()
            .with_tie_break(Priority::Ascending)
            .with_profile(profile.clone())
            .unwrap();
        assert_eq!(
            round_scores(&rule),
            vec![
                scores(&[("a", 1.0), ("b", 2.0), ("c", 1.0)]),
                scores(&[("b", 4.0)]),
            ]
        );
        assert_eq!(rule.order().unwrap(), &vec![set(&["b"]), set(&["a", "c"])]);
        assert_eq!(rule.strict_order().unwrap(), &["b", "a", "c"]);
        let first_round = rule.eliminations().unwrap()[0].rule().unwrap();
        assert_eq!(first_round.strict_order().unwrap(), &["b", "a", "c"]);

        // Without propagation, the rounds keep their own unambiguous tie-break.
        let rule = irv()
            .with_propagate_tie_break(false)
            .with_tie_break(Priority::Ascending)
            .with_profile(profile)
            .unwrap();
        assert_eq!(rule.strict_order().unwrap(), &["b", "a", "c"]);
        let first_round = rule.eliminations().unwrap()[0].rule().unwrap();
        assert!(matches!(
            first_round.strict_order(),
            Err(RuleError::AmbiguousTie { .. })
        ));
    }

    #[test]
    fn one_round_per_candidate_with_distinct_scores() {
        let profile = Profile::parse_weighted(&["a > b > c", "b > c > a", "c > b > a"], &[5.0, 3.0, 1.0])
            .unwrap();
        let rule = irv().with_profile(profile).unwrap();
        assert_eq!(rule.eliminations().unwrap().len(), 3);
        let order = rule.order().unwrap();
        assert_eq!(order.len(), 3);
        assert!(order.iter().all(|tc| tc.len() == 1));
        assert!(is_partition(order, &set(&["a", "b", "c"])));
    }

    #[test]
    fn borda_below_average_runs_to_the_last_candidate() {
        let profile =
            Profile::parse_weighted(&["a > b > c > d > e", "b > c > d > e > a"], &[2.0, 1.0])
                .unwrap();
        let rule = RuleIteratedElimination::new(
            Box::new(RuleScoreNum::borda()),
            Elimination::below_average(),
        )
        .with_tie_break(Priority::Ascending)
        .with_profile(profile)
        .unwrap();
        assert_eq!(
            round_scores(&rule),
            vec![
                scores(&[("a", 8.0), ("b", 10.0), ("c", 7.0), ("d", 4.0), ("e", 1.0)]),
                scores(&[("a", 4.0), ("b", 4.0), ("c", 1.0)]),
                scores(&[("a", 2.0), ("b", 1.0)]),
                scores(&[("a", 0.0)]),
            ]
        );
        assert_eq!(
            rule.order().unwrap(),
            &vec![set(&["a"]), set(&["b"]), set(&["c"]), set(&["d"]), set(&["e"])]
        );
        assert_eq!(rule.winner().unwrap(), "a");
    }

    #[test]
    fn rounds_are_recomputed_for_new_inputs() {
        let mut rule = irv();
        rule.load(
            std::sync::Arc::new(Profile::parse(&["a > b", "a > b"]).unwrap()),
            None,
        )
        .unwrap();
        assert_eq!(rule.winner().unwrap(), "a");
        rule.load(std::sync::Arc::new(Profile::parse(&["b > a"]).unwrap()), None)
            .unwrap();
        assert_eq!(rule.winner().unwrap(), "b");
        assert_eq!(rule.eliminations().unwrap().len(), 2);
    }

    #[test]
    fn invalid_elimination_is_reported() {
        let rule = RuleIteratedElimination::new(Box::new(RuleScoreNum::plurality()), Elimination::last(0))
            .with_profile(Profile::parse(&["a > b"]).unwrap())
            .unwrap();
        assert!(matches!(
            rule.order(),
            Err(RuleError::InvalidElimination { .. })
        ));
    }
}
