use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid run identifier {value:?}: {reason}")]
    InvalidRunId { value: String, reason: String },

    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TypeError {
    pub(crate) fn invalid_run_id(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidRunId {
            value: value.into(),
            reason: reason.into(),
        }
    }
}
