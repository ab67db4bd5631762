//! Submission client
//!
//! Thin event-creation and submission API over the backend. Created events
//! carry the configured user identifier, the clock's current time and a
//! fresh v4 UUID; the analyzer discovers them on its next reload.

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::clock::Clock;
use crate::domain::{Event, EventValue};
use crate::store::{EventBackend, StoreError};

/// Client creating and dispatching events
#[derive(Clone)]
pub struct EventClient {
    backend: Arc<dyn EventBackend>,
    user_identifier: String,
    clock: Arc<dyn Clock>,
}

impl EventClient {
    pub fn new(
        backend: Arc<dyn EventBackend>,
        user_identifier: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            backend,
            user_identifier: user_identifier.into(),
            clock,
        }
    }

    /// Stamp a new event with the configured user, the current time and a
    /// fresh id
    pub fn create_event(&self, category: &str, data: BTreeMap<String, EventValue>) -> Event {
        Event::new(
            Uuid::new_v4(),
            self.user_identifier.clone(),
            category,
            self.clock.now(),
            data,
        )
    }

    pub async fn submit_event(&self, event: &Event) -> Result<(), StoreError> {
        self.backend.persist_event(event).await
    }

    pub async fn submit_events(&self, events: &[Event]) -> Result<(), StoreError> {
        self.backend.persist_events(events).await
    }
}
