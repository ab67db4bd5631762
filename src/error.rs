//! Error handling module
//!
//! Centralized error types for the analytics engine.

use crate::store::StoreError;

/// Crate-wide Result type
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Analyzer error types
#[derive(Debug, thiserror::Error)]
pub enum AnalyzerError {
    /// The event backend failed while loading or persisting events.
    /// Analyzer state is left unchanged; progress already persisted
    /// remains durable.
    #[error("backend error: {0}")]
    Backend(#[source] StoreError),

    /// The delegate failed while loading or persisting a derived artifact.
    #[error("delegate error: {0}")]
    Delegate(#[source] StoreError),

    /// A persisted artifact could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A user column tried to claim the reserved `"id"` name.
    #[error("column name \"{0}\" is reserved")]
    ReservedColumnName(String),

    /// The builder was finalized without an event backend.
    #[error("no event backend configured")]
    MissingBackend,

    /// The builder was finalized without a delegate.
    #[error("no delegate configured")]
    MissingDelegate,
}

impl AnalyzerError {
    /// Check if this error came from a collaborator and may be transient
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::Delegate(_))
    }

    /// Check if this error is a configuration mistake that must be fixed
    /// in code rather than retried
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ReservedColumnName(_) | Self::MissingBackend | Self::MissingDelegate
        )
    }
}

/// Errors raised while encoding or decoding persisted artifacts
/// (interval states, event buckets, aggregator payloads, search indices)
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// JSON serialization or deserialization failure
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The artifact decoded but described a different interval than the
    /// key it was stored under
    #[error("artifact interval mismatch under key {key}")]
    IntervalMismatch { key: String },
}
