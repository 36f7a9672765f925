/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No object is stored at the key.
    #[error("object not found: {container}/{key}")]
    NotFound { container: String, key: String },

    /// The container or key cannot be mapped onto the backend.
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// The backend could not be reached or refused the call. Retryable.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored payload is not valid UTF-8.
    #[error("payload at {key} is not UTF-8")]
    InvalidPayload { key: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal backend failure (poisoned lock, failed blocking task).
    #[error("internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn not_found(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self::NotFound {
            container: container.into(),
            key: key.into(),
        }
    }

    pub fn invalid_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Io(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
