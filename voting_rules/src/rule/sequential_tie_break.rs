use std::collections::BTreeMap;

use crate::error::{ConfigurationSnafu, RuleResult};
use crate::memo::Memo;
use crate::order::*;
use crate::rule::{Rule, RuleBase};

/// The first rule decides; its ties are broken by the second rule, and so on.
///
/// Each rule is evaluated on the same profile and candidates. A candidate is ranked by the tuple
/// of its positions in the orders of the rules, compared lexicographically. The ties left at the
/// end are broken by the tie-break of this rule only.
#[derive(Debug)]
pub struct RuleSequentialTieBreak {
    base: RuleBase,
    rules: Vec<Box<dyn Rule>>,
    evaluated: Memo<Vec<Box<dyn Rule>>>,
}

impl RuleSequentialTieBreak {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> RuleSequentialTieBreak {
        RuleSequentialTieBreak {
            base: RuleBase::default(),
            rules,
            evaluated: Memo::new(),
        }
    }

    /// The rules, evaluated on the current inputs.
    pub fn rules(&self) -> RuleResult<&[Box<dyn Rule>]> {
        let res = self.evaluated.get_or_try_init(|| {
            if self.rules.is_empty() {
                return ConfigurationSnafu {
                    reason: "a sequential tie-break needs at least one rule",
                }
                .fail();
            }
            let profile = self.converted_profile()?;
            let candidates = self.candidates()?;
            let mut res: Vec<Box<dyn Rule>> = Vec::with_capacity(self.rules.len());
            for template in self.rules.iter() {
                let mut rule = template.fresh();
                rule.load_unchecked(profile.clone(), candidates.clone());
                res.push(rule);
            }
            Ok(res)
        })?;
        Ok(res.as_slice())
    }
}

impl Rule for RuleSequentialTieBreak {
    fn name(&self) -> &str {
        "sequential_tie_break"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RuleBase {
        &mut self.base
    }

    fn fresh(&self) -> Box<dyn Rule> {
        Box::new(RuleSequentialTieBreak {
            base: self.base.fresh(),
            rules: self.rules.iter().map(|r| r.fresh()).collect(),
            evaluated: Memo::new(),
        })
    }

    fn clear_cache(&mut self) {
        self.evaluated.clear();
    }

    fn compute_order(&self) -> RuleResult<WeakOrder> {
        let mut rank_tuples: BTreeMap<Candidate, Vec<usize>> = self
            .candidates()?
            .iter()
            .map(|c| (c.clone(), Vec::new()))
            .collect();
        for rule in self.rules()?.iter() {
            for (i, tie_class) in rule.order()?.iter().enumerate() {
                for c in tie_class.iter() {
                    if let Some(t) = rank_tuples.get_mut(c) {
                        t.push(i);
                    }
                }
            }
        }
        let mut classes: BTreeMap<Vec<usize>, CandidateSet> = BTreeMap::new();
        for (c, t) in rank_tuples.into_iter() {
            classes.entry(t).or_default().insert(c);
        }
        Ok(classes.into_values().collect())
    }
}
