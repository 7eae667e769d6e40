use std::sync::Arc;

use log::info;

use crate::elimination::Elimination;
use crate::error::{ConfigurationSnafu, RuleResult};
use crate::memo::Memo;
use crate::order::*;
use crate::profile::Profile;
use crate::rule::{Rule, RuleBase};

/// One round of a sequential rule.
#[derive(Debug)]
pub enum Round {
    /// A rule evaluated on the remaining candidates, followed by an elimination.
    Elimination(Elimination),
    /// The last round, which decides the top of the order.
    Final(Box<dyn Rule>),
}

impl Round {
    /// The rule evaluated in this round.
    pub fn rule(&self) -> RuleResult<&dyn Rule> {
        match self {
            Round::Elimination(e) => e.rule(),
            Round::Final(r) => Ok(r.as_ref()),
        }
    }

    pub fn as_elimination(&self) -> Option<&Elimination> {
        match self {
            Round::Elimination(e) => Some(e),
            Round::Final(_) => None,
        }
    }
}

/// A fixed sequence of rounds, such as the two-round system.
///
/// Each round but the last evaluates its rule on the remaining candidates and eliminates some of
/// them. If an elimination leaves no candidate, the rule of that round becomes the final round and
/// the declared rounds after it are not run.
///
/// The order is the order of the final round, followed by the candidates eliminated in each
/// round, latest round first.
#[derive(Debug)]
pub struct RuleSequentialElimination {
    base: RuleBase,
    // One rule per round, one elimination per round but the last.
    rules: Vec<Box<dyn Rule>>,
    eliminations: Vec<Elimination>,
    propagate_tie_break: bool,
    rounds: Memo<Vec<Round>>,
}

impl RuleSequentialElimination {
    /// A rule per round and an elimination per round but the last.
    ///
    /// The counts are checked when the rounds are first computed.
    pub fn new(rules: Vec<Box<dyn Rule>>, eliminations: Vec<Elimination>) -> RuleSequentialElimination {
        RuleSequentialElimination {
            base: RuleBase::default(),
            rules,
            eliminations,
            propagate_tie_break: true,
            rounds: Memo::new(),
        }
    }

    /// The same rule in every round. There is one round more than eliminations.
    pub fn with_repeated_rule(
        rule: Box<dyn Rule>,
        eliminations: Vec<Elimination>,
    ) -> RuleSequentialElimination {
        let rules = (0..=eliminations.len()).map(|_| rule.fresh()).collect();
        RuleSequentialElimination::new(rules, eliminations)
    }

    /// The same elimination after every round but the last.
    pub fn with_repeated_elimination(
        rules: Vec<Box<dyn Rule>>,
        elimination: Elimination,
    ) -> RuleSequentialElimination {
        let eliminations = (1..rules.len()).map(|_| elimination.fresh()).collect();
        RuleSequentialElimination::new(rules, eliminations)
    }

    /// If set (the default), the tie-break of this rule replaces the one of the rule of every
    /// round.
    pub fn with_propagate_tie_break(mut self, propagate: bool) -> RuleSequentialElimination {
        self.propagate_tie_break = propagate;
        self.rounds.clear();
        self
    }

    pub(crate) fn fresh_copy(&self) -> RuleSequentialElimination {
        RuleSequentialElimination {
            base: self.base.fresh(),
            rules: self.rules.iter().map(|r| r.fresh()).collect(),
            eliminations: self.eliminations.iter().map(|e| e.fresh()).collect(),
            propagate_tie_break: self.propagate_tie_break,
            rounds: Memo::new(),
        }
    }

    fn round_rule(
        &self,
        index: usize,
        profile: &Arc<Profile>,
        candidates: CandidateSet,
    ) -> Box<dyn Rule> {
        let mut rule = self.rules[index].fresh();
        if self.propagate_tie_break {
            rule.set_tie_break(self.tie_break().clone());
        }
        rule.load_unchecked(profile.clone(), candidates);
        rule
    }

    /// The rounds actually run: elimination rounds, then exactly one final round.
    pub fn rounds(&self) -> RuleResult<&[Round]> {
        let res = self.rounds.get_or_try_init(|| {
            if self.rules.len() != self.eliminations.len() + 1 {
                return ConfigurationSnafu {
                    reason: format!(
                        "{} rules for {} eliminations, expected one rule more than eliminations",
                        self.rules.len(),
                        self.eliminations.len()
                    ),
                }
                .fail();
            }
            let profile = self.converted_profile()?;
            let mut candidates = self.candidates()?.clone();
            let mut rounds: Vec<Round> = Vec::new();
            for (i, template) in self.eliminations.iter().enumerate() {
                let rule = self.round_rule(i, profile, candidates);
                let elimination = template.fresh().with_rule(rule);
                candidates = elimination.qualified()?.clone();
                if candidates.is_empty() {
                    info!(
                        "RuleSequentialElimination: round {} eliminated every candidate, it is the final round",
                        i + 1
                    );
                    rounds.push(Round::Final(elimination.into_rule()?));
                    return Ok(rounds);
                }
                rounds.push(Round::Elimination(elimination));
            }
            let rule = self.round_rule(self.eliminations.len(), profile, candidates);
            rounds.push(Round::Final(rule));
            Ok(rounds)
        })?;
        Ok(res.as_slice())
    }

    /// All the rounds but the final one.
    pub fn elimination_rounds(&self) -> RuleResult<Vec<&Elimination>> {
        Ok(self
            .rounds()?
            .iter()
            .filter_map(Round::as_elimination)
            .collect())
    }

    pub fn final_round(&self) -> RuleResult<&dyn Rule> {
        match self.rounds()?.last() {
            Some(Round::Final(rule)) => Ok(rule.as_ref()),
            _ => ConfigurationSnafu {
                reason: "the last round is not a final round",
            }
            .fail(),
        }
    }
}

impl Rule for RuleSequentialElimination {
    fn name(&self) -> &str {
        "sequential_elimination"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RuleBase {
        &mut self.base
    }

    fn fresh(&self) -> Box<dyn Rule> {
        Box::new(self.fresh_copy())
    }

    fn clear_cache(&mut self) {
        self.rounds.clear();
    }

    fn compute_order(&self) -> RuleResult<WeakOrder> {
        let mut res: WeakOrder = self.final_round()?.order()?.clone();
        for elimination in self.elimination_rounds()?.iter().rev() {
            res.extend(elimination.eliminated_order()?.iter().cloned());
        }
        Ok(res)
    }
}
