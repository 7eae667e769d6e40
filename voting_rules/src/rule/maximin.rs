use std::sync::Arc;

use crate::converter::ConverterToOrder;
use crate::error::RuleResult;
use crate::matrix::{Matrix, MatrixWeightedMajority, PairwiseMatrix};
use crate::memo::Memo;
use crate::order::*;
use crate::priority::Priority;
use crate::rule::{Rule, RuleBase};

/// The score of a candidate is its worst result in the duels against the other candidates.
///
/// ```
/// use voting_rules::{Priority, Profile, Rule, RuleMaximin};
/// # use voting_rules::RuleError;
///
/// let profile =
///     Profile::parse_weighted(&["a > b > c", "b > c > a", "c > a > b"], &[4.0, 3.0, 3.0])?;
/// let rule = RuleMaximin::new()
///     .with_tie_break(Priority::Ascending)
///     .with_profile(profile)?;
/// assert_eq!(rule.scores()?["a"], 0.4);
/// assert_eq!(rule.winner()?, "a");
/// # Ok::<(), RuleError>(())
/// ```
#[derive(Debug)]
pub struct RuleMaximin {
    base: RuleBase,
    matrix: Arc<dyn Matrix>,
    computed_matrix: Memo<PairwiseMatrix>,
    scores: Memo<Scores>,
}

impl RuleMaximin {
    pub fn new() -> RuleMaximin {
        RuleMaximin::with_matrix(Arc::new(MatrixWeightedMajority))
    }

    pub fn with_matrix(matrix: Arc<dyn Matrix>) -> RuleMaximin {
        RuleMaximin {
            base: RuleBase::new(Arc::new(ConverterToOrder), Priority::default()),
            matrix,
            computed_matrix: Memo::new(),
            scores: Memo::new(),
        }
    }

    pub fn matrix(&self) -> RuleResult<&PairwiseMatrix> {
        self.computed_matrix.get_or_try_init(|| {
            self.matrix
                .compute(self.converted_profile()?, self.candidates()?)
        })
    }
}

impl Default for RuleMaximin {
    fn default() -> RuleMaximin {
        RuleMaximin::new()
    }
}

impl Rule for RuleMaximin {
    fn name(&self) -> &str {
        "maximin"
    }

    fn base(&self) -> &RuleBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut RuleBase {
        &mut self.base
    }

    fn fresh(&self) -> Box<dyn Rule> {
        Box::new(RuleMaximin {
            base: self.base.fresh(),
            matrix: self.matrix.clone(),
            computed_matrix: Memo::new(),
            scores: Memo::new(),
        })
    }

    fn clear_cache(&mut self) {
        self.computed_matrix.clear();
        self.scores.clear();
    }

    /// A lone candidate has no duel and scores 0.
    fn scores(&self) -> RuleResult<&Scores> {
        self.scores.get_or_try_init(|| {
            let m = self.matrix()?;
            let candidates = self.candidates()?;
            let mut res = Scores::new();
            for c in candidates.iter() {
                let worst = m
                    .iter()
                    .filter(|((row, col), _)| row == c && col != c)
                    .map(|(_, v)| *v)
                    .reduce(f64::min);
                res.insert(c.clone(), worst.unwrap_or(0.0));
            }
            Ok(res)
        })
    }
}
