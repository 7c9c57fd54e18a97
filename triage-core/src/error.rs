//! Error types for the scoring engine.

use thiserror::Error;

/// Failures that abort a whole scoring call. There is no partial-batch
/// recovery: one malformed task rejects the batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// A required attribute is absent. `index` is the 1-based task position.
    #[error("task {index}: missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    /// A value could not be coerced to the expected type.
    #[error("task {index}: field '{field}' {message}")]
    TypeConversion {
        index: usize,
        field: &'static str,
        message: String,
    },

    #[error("unknown strategy '{0}'")]
    InvalidStrategy(String),
}

impl ScoringError {
    pub(crate) fn conversion(
        index: usize,
        field: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::TypeConversion {
            index,
            field,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ScoringError>;
