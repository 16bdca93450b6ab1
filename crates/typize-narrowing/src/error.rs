//! Hard errors raised by the engine.
//!
//! Ineligible methods and stale fixes are not errors; they are ordinary
//! outcomes (`EligibilityResult::Ineligible`, `Ok(None)`).

use thiserror::Error;
use typize_common::TextEditError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NarrowingError {
    /// A type named by the framework vocabulary does not exist in the snapshot.
    #[error("framework type `{name}` could not be resolved")]
    FrameworkTypeMissing { name: String },

    /// The handler base has no factory member with the configured name and arity.
    #[error("`{base}` has no member `{member}` taking {arity} parameter(s)")]
    FactoryMemberMissing {
        base: String,
        member: String,
        arity: usize,
    },

    /// A method returns the future of the marker type without being `async`.
    #[error("method `{method}` returns a wrapped result but is not async")]
    InconsistentAsyncShape { method: String },

    /// Rewrites of one document overlapped or fell outside it.
    #[error(transparent)]
    InvalidEdit(#[from] TextEditError),

    #[error("operation was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, NarrowingError>;
