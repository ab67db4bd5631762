//! Event backend interface
//!
//! The remote store of raw events. The analyzer treats it as the source of
//! truth: anything missing from the local event cache is fetched from here
//! and re-cached through the delegate.

use async_trait::async_trait;

use crate::calendar::{self, DateInterval};
use crate::domain::Event;
use crate::store::StoreError;

/// Progress notes emitted while a backend load runs
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackendLoadStatus {
    Ready,
    FetchedRecords(u64),
    ProcessingRecords(f64),
}

/// Durable store of raw events
#[async_trait]
pub trait EventBackend: Send + Sync {
    /// Best-effort durable write of a single event
    async fn persist_event(&self, event: &Event) -> Result<(), StoreError>;

    /// Batch write; the default loops over [`EventBackend::persist_event`]
    async fn persist_events(&self, events: &[Event]) -> Result<(), StoreError> {
        for event in events {
            self.persist_event(event).await?;
        }
        Ok(())
    }

    /// Events whose timestamps lie within `interval`, both ends inclusive,
    /// sorted by timestamp
    async fn load_events(
        &self,
        interval: DateInterval,
        update_status: &mut (dyn FnMut(BackendLoadStatus) + Send),
    ) -> Result<Vec<Event>, StoreError>;

    /// Every event the backend holds; defaults to loading the all-time
    /// sentinel interval
    async fn load_all_events(
        &self,
        update_status: &mut (dyn FnMut(BackendLoadStatus) + Send),
    ) -> Result<Vec<Event>, StoreError> {
        self.load_events(calendar::all_time(), update_status).await
    }
}
