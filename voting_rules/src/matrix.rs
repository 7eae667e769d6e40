// ********* Pairwise matrices ***********

use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::ballot::Ballot;
use crate::error::{ConversionSnafu, RuleResult};
use crate::order::*;
use crate::profile::Profile;

/// A candidate x candidate matrix, indexed by `(row, column)`.
pub type PairwiseMatrix = BTreeMap<(Candidate, Candidate), f64>;

/// Computes a pairwise comparison matrix from a converted profile.
///
/// The result has an entry for every ordered pair of `candidates`, the diagonal included.
pub trait Matrix: Debug + Send + Sync {
    fn compute(&self, profile: &Profile, candidates: &CandidateSet) -> RuleResult<PairwiseMatrix>;
}

/// The weighted majority matrix.
///
/// `M[(a, b)]` is the weight of the voters who prefer `a` to `b`, plus half the weight of the voters
/// who tie them, divided by the total weight. Unranked candidates are tied at the bottom of each
/// ballot. The diagonal is 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct MatrixWeightedMajority;

impl Matrix for MatrixWeightedMajority {
    fn compute(&self, profile: &Profile, candidates: &CandidateSet) -> RuleResult<PairwiseMatrix> {
        let mut res: PairwiseMatrix = BTreeMap::new();
        for a in candidates.iter() {
            for b in candidates.iter() {
                res.insert((a.clone(), b.clone()), 0.0);
            }
        }
        for item in profile.items() {
            let b = match &item.ballot {
                Ballot::Order(b) => b,
                x => {
                    return ConversionSnafu {
                        ballot: format!("{} ({})", x, x.kind()),
                        target: "an order ballot for the weighted majority matrix",
                    }
                    .fail();
                }
            };
            let order = restrict_order(b.order(), candidates);
            // Missing candidates are at the bottom, after the last tie-class.
            let ranks = ranks(&order);
            let bottom = order.len();
            for ((x, y), v) in res.iter_mut() {
                if x == y {
                    continue;
                }
                let rx = ranks.get(x).cloned().unwrap_or(bottom);
                let ry = ranks.get(y).cloned().unwrap_or(bottom);
                if rx < ry {
                    *v += item.weight;
                } else if rx == ry {
                    *v += item.weight / 2.0;
                }
            }
        }
        let total = profile.total_weight();
        if total > 0.0 {
            for v in res.values_mut() {
                *v /= total;
            }
        }
        Ok(res)
    }
}
