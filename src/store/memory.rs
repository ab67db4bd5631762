//! In-memory backend and delegate
//!
//! Stand-ins for real collaborators, used by the test suites and by hosts
//! that want an analyzer without durable storage.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::analyzer::AnalyzerStatus;
use crate::calendar::DateInterval;
use crate::domain::Event;
use crate::store::{AnalyzerDelegate, BackendLoadStatus, EventBackend, StoreError};

/// Event backend holding everything in a shared vector
#[derive(Debug, Default, Clone)]
pub struct MemoryBackend {
    events: Arc<RwLock<Vec<Event>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert events directly, bypassing `persist_event`
    pub fn seed(&self, events: impl IntoIterator<Item = Event>) {
        self.events
            .write()
            .expect("backend lock poisoned")
            .extend(events);
    }

    pub fn event_count(&self) -> usize {
        self.events.read().expect("backend lock poisoned").len()
    }
}

#[async_trait]
impl EventBackend for MemoryBackend {
    async fn persist_event(&self, event: &Event) -> Result<(), StoreError> {
        self.events
            .write()
            .expect("backend lock poisoned")
            .push(event.clone());
        Ok(())
    }

    async fn load_events(
        &self,
        interval: DateInterval,
        update_status: &mut (dyn FnMut(BackendLoadStatus) + Send),
    ) -> Result<Vec<Event>, StoreError> {
        let mut matching: Vec<Event> = self
            .events
            .read()
            .expect("backend lock poisoned")
            .iter()
            .filter(|event| interval.contains(event.timestamp))
            .cloned()
            .collect();
        matching.sort_by_key(|event| event.timestamp);

        update_status(BackendLoadStatus::FetchedRecords(matching.len() as u64));
        update_status(BackendLoadStatus::Ready);
        Ok(matching)
    }
}

/// Delegate recording persisted entries and observed statuses
#[derive(Debug, Default, Clone)]
pub struct MemoryDelegate {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    statuses: Arc<RwLock<Vec<AnalyzerStatus>>>,
}

impl MemoryDelegate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persisted keys, sorted for stable assertions
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .expect("delegate lock poisoned")
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .expect("delegate lock poisoned")
            .contains_key(key)
    }

    /// Every status transition observed so far, in order
    pub fn statuses(&self) -> Vec<AnalyzerStatus> {
        self.statuses
            .read()
            .expect("delegate lock poisoned")
            .clone()
    }
}

#[async_trait]
impl AnalyzerDelegate for MemoryDelegate {
    async fn persist(&self, key: &str, value: Option<Vec<u8>>) -> Result<(), StoreError> {
        let mut entries = self.entries.write().expect("delegate lock poisoned");
        match value {
            Some(value) => {
                entries.insert(key.to_string(), value);
            }
            None => {
                entries.remove(key);
            }
        }
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .entries
            .read()
            .expect("delegate lock poisoned")
            .get(key)
            .cloned())
    }

    async fn status_changed(&self, status: AnalyzerStatus) {
        self.statuses
            .write()
            .expect("delegate lock poisoned")
            .push(status);
    }
}
