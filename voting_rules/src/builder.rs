use crate::ballot::{Ballot, BallotOrder};
use crate::error::{RuleResult, ValidationSnafu};
use crate::order::{parse_weak_order, CandidateSet};
use crate::profile::{Profile, ProfileItem};

/// A builder for adding ballots to a profile.
///
/// When the candidates are declared, every order ballot is presented the full set of
/// candidates, and naming an undeclared candidate is an error.
///
/// ```
/// use voting_rules::builder::Builder;
/// # use voting_rules::RuleError;
///
/// let mut builder = Builder::new()
///     .candidates(&["Anna".to_string(), "Bob".to_string(), "Clara".to_string()])?;
///
/// builder.add_ballot_simple("Anna > Clara")?;
/// builder.add_ballot("Bob > Anna ~ Clara", 2.0)?;
///
/// let profile = builder.build()?;
/// assert_eq!(profile.len(), 2);
/// assert_eq!(profile.total_weight(), 3.0);
/// # Ok::<(), RuleError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) _candidates: Option<CandidateSet>,
    pub(crate) _items: Vec<ProfileItem>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder::default()
    }

    pub fn candidates(self, cands: &[String]) -> RuleResult<Builder> {
        Ok(Builder {
            _candidates: Some(cands.iter().cloned().collect()),
            _items: Vec::new(),
        })
    }

    /// Adds an order ballot with a weight of 1.
    ///
    /// It is the simplest use case for most cases.
    pub fn add_ballot_simple(&mut self, ballot: &str) -> RuleResult<()> {
        self.add_ballot(ballot, 1.0)
    }

    /// Adds an order ballot written as a weak order, with a weight attached to it.
    pub fn add_ballot(&mut self, ballot: &str, weight: f64) -> RuleResult<()> {
        let order = parse_weak_order(ballot)?;
        let ballot = Ballot::Order(BallotOrder::new(order, self._candidates.clone())?);
        self.add_item(ProfileItem {
            ballot,
            weight,
            voter: None,
        })
    }

    /// Adds any kind of ballot, checking it against the declared candidates.
    pub fn add_item(&mut self, item: ProfileItem) -> RuleResult<()> {
        if let Some(cands) = self._candidates.as_ref() {
            let named = item.ballot.candidates();
            if !named.is_subset(cands) {
                return ValidationSnafu {
                    reason: format!(
                        "ballot {} names undeclared candidates {:?}",
                        item.ballot,
                        named.difference(cands).collect::<Vec<_>>()
                    ),
                }
                .fail();
            }
        }
        self._items.push(item);
        Ok(())
    }

    pub fn declared_candidates(&self) -> Option<&CandidateSet> {
        self._candidates.as_ref()
    }

    pub fn build(self) -> RuleResult<Profile> {
        Profile::from_items(self._items)
    }
}
