use crate::elimination::Elimination;
use crate::error::RuleResult;
use crate::order::*;
use crate::rule::{Rule, RuleBase, RuleScoreNum, RuleSequentialElimination};

/// The two-round system.
///
/// By default, both rounds use plurality and only the best two candidates of the first round
/// go to the second round.
#[derive(Debug)]
pub struct RuleTwoRound {
    inner: RuleSequentialElimination,
}

impl RuleTwoRound {
    pub fn new() -> RuleTwoRound {
        RuleTwoRound::with_rounds(
            Box::new(RuleScoreNum::plurality()),
            Box::new(RuleScoreNum::plurality()),
            Elimination::last(-2),
        )
    }

    pub fn with_rounds(
        first: Box<dyn Rule>,
        second: Box<dyn Rule>,
        elimination: Elimination,
    ) -> RuleTwoRound {
        RuleTwoRound {
            inner: RuleSequentialElimination::new(vec![first, second], vec![elimination]),
        }
    }

    pub fn with_propagate_tie_break(self, propagate: bool) -> RuleTwoRound {
        RuleTwoRound {
            inner: self.inner.with_propagate_tie_break(propagate),
        }
    }

    /// The first round, or `None` if it eliminated every candidate. The rule of the first round
    /// is then the final round.
    pub fn first_round(&self) -> RuleResult<Option<&Elimination>> {
        Ok(self.inner.elimination_rounds()?.first().copied())
    }

    /// The rule of the last round that was run.
    pub fn second_round(&self) -> RuleResult<&dyn Rule> {
        self.inner.final_round()
    }
}

impl Default for RuleTwoRound {
    fn default() -> RuleTwoRound {
        RuleTwoRound::new()
    }
}

impl Rule for RuleTwoRound {
    fn name(&self) -> &str {
        "two_round"
    }

    fn base(&self) -> &RuleBase {
        self.inner.base()
    }

    fn base_mut(&mut self) -> &mut RuleBase {
        self.inner.base_mut()
    }

    fn fresh(&self) -> Box<dyn Rule> {
        Box::new(RuleTwoRound {
            inner: self.inner.fresh_copy(),
        })
    }

    fn clear_cache(&mut self) {
        self.inner.clear_cache();
    }

    fn compute_order(&self) -> RuleResult<WeakOrder> {
        self.inner.compute_order()
    }
}
