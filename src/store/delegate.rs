//! Delegate interface
//!
//! Key-value persistence for derived artifacts (interval states, event
//! buckets, search indices) plus the status notification sink. Keys are
//! namespaced by the analyzer; writes are assumed committed when `persist`
//! returns.

use async_trait::async_trait;

use crate::analyzer::AnalyzerStatus;
use crate::store::StoreError;

/// Host-provided persistence and status sink
#[async_trait]
pub trait AnalyzerDelegate: Send + Sync {
    /// Store `value` under `key`; `None` clears the entry
    async fn persist(&self, key: &str, value: Option<Vec<u8>>) -> Result<(), StoreError>;

    /// The value stored under `key`, if any
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Observe an analyzer status transition; transitions are throttled by
    /// the significance filter before reaching this sink
    async fn status_changed(&self, status: AnalyzerStatus);
}
