//! Store errors
//!
//! Failures surfaced by backend and delegate collaborators.

/// Errors reported by a backend or delegate implementation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached; retrying later may succeed
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A value could not be serialized or deserialized by the store
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Implementation-specific failure
    #[error("{0}")]
    Other(String),
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Check if retrying the operation may help
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}
