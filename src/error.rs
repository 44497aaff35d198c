use thiserror::Error;

/// Errors returned by the estimators and scores in this crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// The point set has no rows (or no columns).
    #[error("empty input: need at least one sample and one feature")]
    EmptyInput,

    /// A numeric parameter is outside its documented domain.
    #[error("invalid parameter {name}: {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Human-readable explanation.
        message: String,
    },

    /// Two inputs disagree on a length or a feature count.
    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch {
        /// Expected length.
        expected: usize,
        /// Found length.
        found: usize,
    },

    /// A fitted-model query was made before `fit`.
    #[error("{0} not fitted, call fit() first")]
    NotFitted(&'static str),
}

impl Error {
    pub(crate) fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Error::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
