// ********* Profiles ***********

use std::collections::BTreeSet;

use crate::ballot::Ballot;
use crate::error::{ConfigurationSnafu, RuleResult, ValidationSnafu};
use crate::order::CandidateSet;

/// One ballot of a profile, with its weight and optional voter identity.
#[derive(PartialEq, Debug, Clone)]
pub struct ProfileItem {
    pub ballot: Ballot,
    pub weight: f64,
    pub voter: Option<String>,
}

/// An ordered, weighted collection of ballots.
///
/// Invariant: all the weights are finite and non-negative.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Profile {
    items: Vec<ProfileItem>,
}

impl Profile {
    /// Creates a profile. Missing weights default to 1 and missing voters to `None`.
    pub fn new(
        ballots: Vec<Ballot>,
        weights: Option<Vec<f64>>,
        voters: Option<Vec<Option<String>>>,
    ) -> RuleResult<Profile> {
        let n = ballots.len();
        let weights = weights.unwrap_or_else(|| vec![1.0; n]);
        let voters = voters.unwrap_or_else(|| vec![None; n]);
        if weights.len() != n || voters.len() != n {
            return ConfigurationSnafu {
                reason: format!(
                    "{} ballots but {} weights and {} voters",
                    n,
                    weights.len(),
                    voters.len()
                ),
            }
            .fail();
        }
        let items = ballots
            .into_iter()
            .zip(weights)
            .zip(voters)
            .map(|((ballot, weight), voter)| ProfileItem {
                ballot,
                weight,
                voter,
            })
            .collect();
        Profile::from_items(items)
    }

    pub fn from_items(items: Vec<ProfileItem>) -> RuleResult<Profile> {
        if let Some(item) = items
            .iter()
            .find(|item| !item.weight.is_finite() || item.weight < 0.0)
        {
            return ValidationSnafu {
                reason: format!("invalid weight {} for ballot {}", item.weight, item.ballot),
            }
            .fail();
        }
        Ok(Profile { items })
    }

    /// Parses order ballots, each with a weight of 1.
    pub fn parse(ballots: &[&str]) -> RuleResult<Profile> {
        Profile::parse_weighted(ballots, &vec![1.0; ballots.len()])
    }

    /// Parses order ballots with the given weights.
    pub fn parse_weighted(ballots: &[&str], weights: &[f64]) -> RuleResult<Profile> {
        let parsed: Vec<Ballot> = ballots
            .iter()
            .map(|s| Ballot::parse(s))
            .collect::<RuleResult<Vec<Ballot>>>()?;
        Profile::new(parsed, Some(weights.to_vec()), None)
    }

    pub fn items(&self) -> &[ProfileItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The union of the candidates of all the ballots.
    pub fn candidates(&self) -> CandidateSet {
        let mut res: CandidateSet = BTreeSet::new();
        for item in self.items.iter() {
            res.extend(item.ballot.candidates());
        }
        res
    }

    pub fn total_weight(&self) -> f64 {
        self.items.iter().map(|item| item.weight).sum()
    }

    /// Applies `f` to every ballot, keeping the weights and voters.
    pub fn map_ballots<F>(&self, mut f: F) -> RuleResult<Profile>
    where
        F: FnMut(&Ballot) -> RuleResult<Ballot>,
    {
        let mut items: Vec<ProfileItem> = Vec::with_capacity(self.items.len());
        for item in self.items.iter() {
            items.push(ProfileItem {
                ballot: f(&item.ballot)?,
                weight: item.weight,
                voter: item.voter.clone(),
            });
        }
        Ok(Profile { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuleError;

    #[test]
    fn weights_and_voters_are_aligned() {
        let ballots = vec![Ballot::parse("a > b").unwrap(), Ballot::parse("b > c").unwrap()];
        let p = Profile::new(
            ballots,
            Some(vec![2.0, 3.0]),
            Some(vec![Some("v1".to_string()), None]),
        )
        .unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.total_weight(), 5.0);
        assert_eq!(p.items()[0].voter.as_deref(), Some("v1"));
        assert_eq!(p.candidates().len(), 3);
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let res = Profile::new(vec![Ballot::parse("a").unwrap()], Some(vec![]), None);
        assert!(matches!(res, Err(RuleError::Configuration { .. })));
    }

    #[test]
    fn negative_weights_are_rejected() {
        let res = Profile::parse_weighted(&["a > b"], &[-1.0]);
        assert!(matches!(res, Err(RuleError::Validation { .. })));
    }
}
