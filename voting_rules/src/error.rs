use snafu::Snafu;

use crate::order::Candidate;

/// Errors raised while evaluating a rule.
///
/// All of them are raised when the offending derived value is first read; a failed read leaves
/// the cache untouched, so the same value can be read again after fixing the inputs.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RuleError {
    /// The candidate set is not consistent with the ballots or the weights are invalid.
    #[snafu(display("Validation error: {reason}"))]
    Validation { reason: String },

    /// A ballot cannot be expressed in the format required by a rule.
    #[snafu(display("Cannot convert ballot {ballot} to {target}"))]
    Conversion { ballot: String, target: String },

    /// The priority is `Unambiguous` and a real tie was met.
    #[snafu(display("Ambiguous tie between {candidates:?}"))]
    AmbiguousTie { candidates: Vec<Candidate> },

    /// An elimination round would not eliminate anybody.
    #[snafu(display("Elimination {method} eliminates no candidate among {candidates:?}"))]
    InvalidElimination {
        method: String,
        candidates: Vec<Candidate>,
    },

    /// A rule or a composite rule is malformed.
    #[snafu(display("Configuration error: {reason}"))]
    Configuration { reason: String },

    /// A weak order or a ballot string is malformed.
    #[snafu(display("Cannot parse {input:?}: unexpected {found:?} at position {position}"))]
    Parse {
        input: String,
        found: String,
        position: usize,
    },

    /// A derived value was read before any profile was loaded.
    #[snafu(display("{what} read before a profile was loaded"))]
    MissingInput { what: String },
}

pub type RuleResult<T> = Result<T, RuleError>;
