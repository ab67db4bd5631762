//! Event records
//!
//! Events are immutable facts: once constructed they are never modified,
//! only applied to aggregators. Identity is by `id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::calendar::unix_seconds;
use crate::domain::EventValue;

/// An immutable analytics event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: Uuid,

    /// Identifier of the originating user
    pub user_id: String,

    /// Name of the category this event belongs to
    pub category: String,

    /// Absolute creation time
    #[serde(with = "unix_seconds")]
    pub timestamp: DateTime<Utc>,

    /// Column-name to value payload
    pub data: BTreeMap<String, EventValue>,
}

impl Event {
    pub fn new(
        id: Uuid,
        user_id: impl Into<String>,
        category: impl Into<String>,
        timestamp: DateTime<Utc>,
        data: BTreeMap<String, EventValue>,
    ) -> Self {
        Self {
            id,
            user_id: user_id.into(),
            category: category.into(),
            timestamp,
            data,
        }
    }

    /// The payload value under `column`, if present
    pub fn value(&self, column: &str) -> Option<&EventValue> {
        self.data.get(column)
    }

    /// Copy of this event with `column` rebound to `value`; the rewritten
    /// record is what a mapping aggregator hands down its chain
    pub fn with_value(&self, column: &str, value: EventValue) -> Self {
        let mut rewritten = self.clone();
        rewritten.data.insert(column.to_string(), value);
        rewritten
    }
}
