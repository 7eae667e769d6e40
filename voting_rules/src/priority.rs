// ********* Tie-breaking ***********

use log::debug;

use crate::error::{AmbiguousTieSnafu, RuleResult};
use crate::order::{Candidate, CandidateSet};

/// The policy that breaks the ties of a weak order.
///
/// A priority is a pure function of the tie-class it is given: the same tie-class always gets
/// the same resolution.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Default)]
pub enum Priority {
    /// Any real tie is an error.
    #[default]
    Unambiguous,
    /// Alphabetical order of the names: `a` is preferred to `b`.
    Ascending,
    /// Reverse alphabetical order of the names: `b` is preferred to `a`.
    Descending,
    /// A reproducible pseudo-random order derived from the seed.
    ///
    /// Each candidate is ranked by a cryptographic hash of the seed and its name, so it is hard
    /// to guess in advance and consistent across subsets of candidates.
    Random(u32),
    /// An externally supplied preference, best first. Candidates that are not listed come after,
    /// in alphabetical order.
    Given(Vec<Candidate>),
}

impl Priority {
    /// Sorts a tie-class, best candidate first.
    pub fn sort(&self, tie_class: &CandidateSet) -> RuleResult<Vec<Candidate>> {
        let mut res: Vec<Candidate> = tie_class.iter().cloned().collect();
        match self {
            Priority::Unambiguous if res.len() > 1 => {
                return AmbiguousTieSnafu { candidates: res }.fail();
            }
            Priority::Unambiguous | Priority::Ascending => {}
            Priority::Descending => res.reverse(),
            Priority::Random(seed) => {
                res = candidate_permutation_crypto(&res, *seed);
            }
            Priority::Given(preference) => {
                res.sort_by_key(|c| {
                    preference
                        .iter()
                        .position(|p| p == c)
                        .unwrap_or(preference.len())
                });
            }
        }
        if res.len() > 1 {
            debug!("Priority::sort: {:?} resolved {:?}", self, res);
        }
        Ok(res)
    }

    /// Resolves every tie-class of a weak order, keeping the order between tie-classes.
    pub fn sort_order(&self, order: &[CandidateSet]) -> RuleResult<Vec<Candidate>> {
        let mut res: Vec<Candidate> = Vec::new();
        for tie_class in order.iter() {
            res.extend(self.sort(tie_class)?);
        }
        Ok(res)
    }

    /// The preferred candidate of a tie-class, or the least preferred one if `reverse` is set.
    ///
    /// Returns `None` for an empty tie-class.
    pub fn choice(&self, tie_class: &CandidateSet, reverse: bool) -> RuleResult<Option<Candidate>> {
        let sorted = self.sort(tie_class)?;
        Ok(if reverse {
            sorted.last().cloned()
        } else {
            sorted.first().cloned()
        })
    }
}

/// Generates a "random" permutation of the candidates. Random in this context means hard to guess
/// in advance. This uses a cryptographic algorithm that is resilient to collisions.
fn candidate_permutation_crypto(candidates: &[Candidate], seed: u32) -> Vec<Candidate> {
    let mut data: Vec<(String, Candidate)> = candidates
        .iter()
        .map(|name| (sha256::digest(format!("{:08}{}", seed, name)), name.clone()))
        .collect();
    data.sort();
    data.into_iter().map(|p| p.1).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;

    fn set(names: &[&str]) -> CandidateSet {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn unambiguous_accepts_singletons_only() {
        assert_eq!(
            Priority::Unambiguous.sort(&set(&["a"])).unwrap(),
            vec!["a".to_string()]
        );
        match Priority::Unambiguous.sort(&set(&["a", "b"])) {
            Err(RuleError::AmbiguousTie { candidates }) => assert_eq!(candidates.len(), 2),
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn ascending_and_descending() {
        let tc = set(&["b", "c", "a"]);
        assert_eq!(Priority::Ascending.sort(&tc).unwrap(), vec!["a", "b", "c"]);
        assert_eq!(Priority::Descending.sort(&tc).unwrap(), vec!["c", "b", "a"]);
        assert_eq!(
            Priority::Ascending.choice(&tc, true).unwrap(),
            Some("c".to_string())
        );
        assert_eq!(Priority::Ascending.choice(&set(&[]), false).unwrap(), None);
    }

    #[test]
    fn given_preference_puts_unlisted_last() {
        let p = Priority::Given(vec!["c".to_string(), "a".to_string()]);
        assert_eq!(
            p.sort(&set(&["a", "b", "c", "d"])).unwrap(),
            vec!["c", "a", "b", "d"]
        );
    }

    #[test]
    fn random_is_reproducible_and_consistent_on_subsets() {
        let all = set(&["a", "b", "c", "d", "e"]);
        let p = Priority::Random(42);
        let first = p.sort(&all).unwrap();
        assert_eq!(first, p.sort(&all).unwrap());
        let sub = set(&["b", "d", "e"]);
        let expected: Vec<Candidate> = first.iter().filter(|c| sub.contains(*c)).cloned().collect();
        assert_eq!(p.sort(&sub).unwrap(), expected);
    }

    #[test]
    fn sort_order_keeps_tie_classes_in_place() {
        let order = vec![set(&["b", "a"]), set(&["c"])];
        assert_eq!(
            Priority::Descending.sort_order(&order).unwrap(),
            vec!["b", "a", "c"]
        );
    }
}
