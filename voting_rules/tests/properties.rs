//! Properties that hold for any profile.

use std::sync::Arc;

use proptest::prelude::*;
use voting_rules::*;

const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Profiles of complete rankings without ties, so that every rule can convert them.
fn arb_profile() -> impl Strategy<Value = Profile> {
    prop::collection::vec((Just(NAMES.to_vec()).prop_shuffle(), 1u32..5), 1..8).prop_map(
        |items| {
            let ballots: Vec<String> = items.iter().map(|(names, _)| names.join(" > ")).collect();
            let refs: Vec<&str> = ballots.iter().map(|s| s.as_str()).collect();
            let weights: Vec<f64> = items.iter().map(|(_, w)| *w as f64).collect();
            Profile::parse_weighted(&refs, &weights).unwrap()
        },
    )
}

fn arb_priority() -> impl Strategy<Value = Priority> {
    prop_oneof![
        Just(Priority::Ascending),
        Just(Priority::Descending),
        any::<u32>().prop_map(Priority::Random),
    ]
}

fn all_candidates() -> CandidateSet {
    NAMES.iter().map(|s| s.to_string()).collect()
}

fn simple_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(RuleScoreNum::plurality()),
        Box::new(RuleScoreNum::veto()),
        Box::new(RuleScoreNum::borda()),
        Box::new(RuleScoreNum::approval()),
        Box::new(RuleMaximin::new()),
    ]
}

fn composite_rules() -> Vec<Box<dyn Rule>> {
    vec![
        Box::new(RuleIteratedElimination::new(
            Box::new(RuleScoreNum::plurality()),
            Elimination::last(1),
        )),
        Box::new(RuleIteratedElimination::new(
            Box::new(RuleScoreNum::borda()),
            Elimination::below_average(),
        )),
        Box::new(RuleTwoRound::new()),
        Box::new(RuleSequentialTieBreak::new(vec![
            Box::new(RuleScoreNum::plurality()),
            Box::new(RuleScoreNum::borda()),
        ])),
    ]
}

fn check_strict_order(rule: &dyn Rule) {
    let order = rule.order().unwrap();
    let strict = rule.strict_order().unwrap();
    let ranks = ranks(order);
    assert_eq!(strict.len(), rule.candidates().unwrap().len());
    for pair in strict.windows(2) {
        assert!(ranks[&pair[0]] <= ranks[&pair[1]]);
    }
    assert_eq!(rule.winner().unwrap(), &strict[0]);
    assert!(rule.cowinners().unwrap().contains(&strict[0]));
}

proptest! {
    #[test]
    fn orders_are_partitions(profile in arb_profile(), priority in arb_priority()) {
        init_logger();
        let profile = Arc::new(profile);
        for mut rule in simple_rules() {
            rule.set_tie_break(priority.clone());
            rule.load(profile.clone(), Some(all_candidates())).unwrap();
            prop_assert!(is_partition(rule.order().unwrap(), &all_candidates()));
            check_strict_order(rule.as_ref());
        }
    }

    #[test]
    fn composite_orders_are_partitions(profile in arb_profile(), priority in arb_priority()) {
        init_logger();
        let profile = Arc::new(profile);
        for mut rule in composite_rules() {
            rule.set_tie_break(priority.clone());
            rule.load(profile.clone(), Some(all_candidates())).unwrap();
            match rule.order() {
                Ok(order) => {
                    prop_assert!(is_partition(order, &all_candidates()));
                    check_strict_order(rule.as_ref());
                }
                Err(e) => prop_assert!(false, "rule {} failed: {}", rule.name(), e),
            }
        }
    }

    #[test]
    fn reading_twice_gives_the_same_values(profile in arb_profile(), seed in any::<u32>()) {
        let rule = RuleIteratedElimination::new(Box::new(RuleScoreNum::borda()), Elimination::last(1))
            .with_tie_break(Priority::Random(seed))
            .with_profile(profile)
            .unwrap();
        let order = rule.order().unwrap().clone();
        let strict = rule.strict_order().unwrap().to_vec();
        prop_assert_eq!(rule.order().unwrap(), &order);
        prop_assert_eq!(rule.strict_order().unwrap(), strict.as_slice());
        prop_assert_eq!(rule.winner().unwrap(), &strict[0]);
        prop_assert!(rule.eliminations().unwrap().len() <= rule.candidates().unwrap().len());
    }

    #[test]
    fn loading_new_ballots_drops_the_old_scores(first in arb_profile(), second in arb_profile()) {
        let mut rule = RuleScoreNum::borda();
        rule.load(Arc::new(first), Some(all_candidates())).unwrap();
        rule.scores().unwrap();
        rule.load(Arc::new(second.clone()), Some(all_candidates())).unwrap();
        let mut fresh = RuleScoreNum::borda();
        fresh.load(Arc::new(second), Some(all_candidates())).unwrap();
        prop_assert_eq!(rule.scores().unwrap(), fresh.scores().unwrap());
    }

    #[test]
    fn a_strict_first_rule_decides_alone(profile in arb_profile()) {
        let profile = Arc::new(profile);
        let mut borda = RuleScoreNum::borda();
        borda.load(profile.clone(), Some(all_candidates())).unwrap();
        prop_assume!(borda.order().unwrap().iter().all(|tc| tc.len() == 1));
        let mut rule = RuleSequentialTieBreak::new(vec![
            Box::new(RuleScoreNum::borda()),
            Box::new(RuleScoreNum::plurality()),
        ]);
        rule.load(profile, Some(all_candidates())).unwrap();
        prop_assert_eq!(rule.order().unwrap(), borda.order().unwrap());
    }

    #[test]
    fn irv_with_distinct_scores_has_one_round_per_candidate(profile in arb_profile()) {
        let rule = RuleIteratedElimination::new(Box::new(RuleScoreNum::borda()), Elimination::last(1))
            .with_tie_break(Priority::Ascending)
            .with_profile(profile)
            .unwrap();
        let order = rule.order().unwrap();
        prop_assume!(order.iter().all(|tc| tc.len() == 1));
        prop_assert_eq!(rule.eliminations().unwrap().len(), NAMES.len());
    }
}
