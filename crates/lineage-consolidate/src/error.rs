use lineage_store::StoreError;
use lineage_types::TypeError;

/// Errors that can occur while consolidating a run.
#[derive(Debug, thiserror::Error)]
pub enum ConsolidationError {
    /// The run identifier or event cannot be grouped. Nothing was stored.
    #[error("validation error: {0}")]
    Validation(String),

    /// A store call failed. Retrying the whole event is safe.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A dataset could not be serialized for capture.
    #[error("serialization error: {0}")]
    Serialization(#[from] TypeError),

    /// An accumulated entry could not be decoded and the active policy
    /// forbids dropping it.
    #[error("corrupt accumulated entry {key}: {reason}")]
    CorruptEntry { key: String, reason: String },

    /// Configuration is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ConsolidationError {
    /// Whether retrying the same event may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_transient())
    }
}

/// Convenience alias used throughout the engine crate.
pub type Result<T> = std::result::Result<T, ConsolidationError>;
