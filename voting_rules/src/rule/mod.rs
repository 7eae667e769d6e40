// ********* Rules ***********

use std::fmt::Debug;
use std::sync::Arc;

use log::debug;
use snafu::OptionExt;

use crate::converter::{Converter, ConverterGeneral};
use crate::error::{ConfigurationSnafu, MissingInputSnafu, RuleResult, ValidationSnafu};
use crate::memo::Memo;
use crate::order::*;
use crate::priority::Priority;
use crate::profile::Profile;

mod iterated_elimination;
mod maximin;
mod score_num;
mod sequential_elimination;
mod sequential_tie_break;
mod two_round;

pub use iterated_elimination::RuleIteratedElimination;
pub use maximin::RuleMaximin;
pub use score_num::{Aggregation, RuleScoreNum};
pub use sequential_elimination::{Round, RuleSequentialElimination};
pub use sequential_tie_break::RuleSequentialTieBreak;
pub use two_round::RuleTwoRound;

/// The inputs and the cached values shared by all the rules.
///
/// The configuration (`tie_break`, `converter`) survives a new assignment of inputs. Every
/// derived value is dropped when the inputs change.
#[derive(Debug)]
pub struct RuleBase {
    tie_break: Priority,
    converter: Arc<dyn Converter>,
    profile: Option<Arc<Profile>>,
    candidates: Option<CandidateSet>,
    converted: Memo<Arc<Profile>>,
    order: Memo<WeakOrder>,
    strict_order: Memo<Vec<Candidate>>,
    cowinners: Memo<CandidateSet>,
}

impl RuleBase {
    pub fn new(converter: Arc<dyn Converter>, tie_break: Priority) -> RuleBase {
        RuleBase {
            tie_break,
            converter,
            profile: None,
            candidates: None,
            converted: Memo::new(),
            order: Memo::new(),
            strict_order: Memo::new(),
            cowinners: Memo::new(),
        }
    }

    /// The same configuration, without inputs.
    pub fn fresh(&self) -> RuleBase {
        RuleBase::new(self.converter.clone(), self.tie_break.clone())
    }

    fn clear(&mut self) {
        self.converted.clear();
        self.order.clear();
        self.strict_order.clear();
        self.cowinners.clear();
    }
}

impl Default for RuleBase {
    fn default() -> RuleBase {
        RuleBase::new(Arc::new(ConverterGeneral), Priority::default())
    }
}

/// Checks that every ballot only mentions candidates of the candidate set.
pub fn check_candidates(profile: &Profile, candidates: &CandidateSet) -> RuleResult<()> {
    if candidates.is_empty() {
        return ValidationSnafu {
            reason: "the candidate set is empty",
        }
        .fail();
    }
    for item in profile.items() {
        let extra: Vec<Candidate> = item
            .ballot
            .candidates()
            .difference(candidates)
            .cloned()
            .collect();
        if !extra.is_empty() {
            return ValidationSnafu {
                reason: format!(
                    "ballot {} mentions {:?}, which are not in the candidates {:?}",
                    item.ballot, extra, candidates
                ),
            }
            .fail();
        }
    }
    Ok(())
}

/// A voting rule.
///
/// A rule holds a profile and a candidate set, loaded with [`Rule::load`]. All the derived values
/// (`scores`, `order`, `strict_order`, `winner`, `cowinners`) are computed on first read and cached
/// until the next `load`. Reading a value twice returns the same value.
///
/// Implementors provide the storage ([`Rule::base`]), a way to make a new instance with the same
/// configuration ([`Rule::fresh`]) and either [`Rule::scores`] or [`Rule::compute_order`].
///
/// ```
/// use std::sync::Arc;
/// use voting_rules::{Priority, Profile, Rule, RuleScoreNum};
/// # use voting_rules::RuleError;
///
/// let profile = Profile::parse_weighted(&["a > b > c", "b > a > c", "c > a > b"], &[2.0, 3.0, 4.0])?;
/// let mut rule = RuleScoreNum::borda().with_tie_break(Priority::Ascending);
/// rule.load(Arc::new(profile), None)?;
/// assert_eq!(rule.scores()?["a"], 11.0);
/// assert_eq!(rule.winner()?, "a");
/// # Ok::<(), RuleError>(())
/// ```
pub trait Rule: Debug + Send {
    fn name(&self) -> &str;

    fn base(&self) -> &RuleBase;

    fn base_mut(&mut self) -> &mut RuleBase;

    /// A new rule with the same configuration, no inputs and nothing cached.
    ///
    /// Composite rules use it to get an independent rule for each round.
    fn fresh(&self) -> Box<dyn Rule>;

    /// Drops the values cached by the implementor, besides the ones of [`RuleBase`].
    fn clear_cache(&mut self) {}

    /// Validates the inputs when they are loaded.
    fn check_profile(&self, profile: &Profile, candidates: &CandidateSet) -> RuleResult<()> {
        check_candidates(profile, candidates)
    }

    /// The score of each candidate. Not every rule has scores.
    fn scores(&self) -> RuleResult<&Scores> {
        ConfigurationSnafu {
            reason: format!("rule {} does not compute scores", self.name()),
        }
        .fail()
    }

    /// Computes the weak order. By default, candidates are sorted by decreasing score.
    fn compute_order(&self) -> RuleResult<WeakOrder> {
        Ok(order_from_scores(self.scores()?))
    }

    /// Assigns new inputs and drops every cached value.
    ///
    /// The candidates default to all the candidates mentioned by the ballots.
    fn load(&mut self, profile: Arc<Profile>, candidates: Option<CandidateSet>) -> RuleResult<()> {
        let candidates = candidates.unwrap_or_else(|| profile.candidates());
        self.check_profile(&profile, &candidates)?;
        self.load_unchecked(profile, candidates);
        Ok(())
    }

    /// Assigns new inputs without validating them.
    ///
    /// Ballot candidates outside `candidates` are ignored by the conversion.
    fn load_unchecked(&mut self, profile: Arc<Profile>, candidates: CandidateSet) {
        debug!(
            "load: rule {} with {} ballots and {} candidates",
            self.name(),
            profile.len(),
            candidates.len()
        );
        let base = self.base_mut();
        base.profile = Some(profile);
        base.candidates = Some(candidates);
        base.clear();
        self.clear_cache();
    }

    /// Loads the profile and returns the rule, for chained construction.
    fn with_profile(mut self, profile: Profile) -> RuleResult<Self>
    where
        Self: Sized,
    {
        self.load(Arc::new(profile), None)?;
        Ok(self)
    }

    fn with_tie_break(mut self, tie_break: Priority) -> Self
    where
        Self: Sized,
    {
        self.set_tie_break(tie_break);
        self
    }

    fn tie_break(&self) -> &Priority {
        &self.base().tie_break
    }

    /// Changes the tie-break. The weak order does not depend on it and is kept.
    fn set_tie_break(&mut self, tie_break: Priority) {
        let base = self.base_mut();
        base.tie_break = tie_break;
        base.strict_order.clear();
        // Composite rules may pass the tie-break to their rounds.
        self.clear_cache();
    }

    fn converter(&self) -> &Arc<dyn Converter> {
        &self.base().converter
    }

    fn profile(&self) -> RuleResult<&Arc<Profile>> {
        self.base().profile.as_ref().context(MissingInputSnafu {
            what: format!("profile of rule {}", self.name()),
        })
    }

    fn candidates(&self) -> RuleResult<&CandidateSet> {
        self.base().candidates.as_ref().context(MissingInputSnafu {
            what: format!("candidates of rule {}", self.name()),
        })
    }

    /// The profile, with every ballot converted to the format of the rule.
    fn converted_profile(&self) -> RuleResult<&Arc<Profile>> {
        self.base().converted.get_or_try_init(|| {
            let profile = self.profile()?;
            let candidates = self.candidates()?;
            let converted = self.converter().convert_profile(profile, candidates)?;
            Ok(Arc::new(converted))
        })
    }

    /// The weak order over the candidates, best tie-class first.
    fn order(&self) -> RuleResult<&WeakOrder> {
        self.base().order.get_or_try_init(|| {
            let order = self.compute_order()?;
            debug_assert!(is_partition(&order, self.candidates()?));
            debug!("order: rule {}: {}", self.name(), format_weak_order(&order));
            Ok(order)
        })
    }

    /// The order with every tie broken by the tie-break.
    fn strict_order(&self) -> RuleResult<&[Candidate]> {
        let res = self
            .base()
            .strict_order
            .get_or_try_init(|| self.tie_break().sort_order(self.order()?))?;
        Ok(res.as_slice())
    }

    /// The first candidate of the strict order.
    fn winner(&self) -> RuleResult<&Candidate> {
        self.strict_order()?.first().context(ValidationSnafu {
            reason: format!("rule {} has no candidate", self.name()),
        })
    }

    /// The candidates tied for the best place, before any tie-break.
    fn cowinners(&self) -> RuleResult<&CandidateSet> {
        self.base().cowinners.get_or_try_init(|| {
            let order = self.order()?;
            Ok(order.first().cloned().unwrap_or_default())
        })
    }
}
