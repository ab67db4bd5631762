//! Categories, columns and aggregator registrations
//!
//! A category groups events sharing a logical schema. Columns are the
//! registration points for aggregators; the column named `"id"` is reserved
//! as the synthetic carrier for category-level aggregators and is injected
//! by the builder.

use std::fmt;
use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::calendar::DateInterval;

/// The reserved column name carrying category-level aggregators
pub const RESERVED_COLUMN: &str = "id";

/// Factory producing a fresh aggregator instance for a new state bucket
pub type AggregatorFactory = Arc<dyn Fn() -> Box<dyn Aggregator> + Send + Sync>;

/// Registration of one aggregator under one column
#[derive(Clone)]
pub struct AggregatorSpec {
    /// Unique aggregator id within a state bucket
    pub id: String,

    /// When set, the aggregator is only instantiated for state buckets
    /// whose interval equals this pin
    pub interval: Option<DateInterval>,

    pub factory: AggregatorFactory,
}

impl AggregatorSpec {
    pub fn new(
        id: impl Into<String>,
        factory: impl Fn() -> Box<dyn Aggregator> + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            interval: None,
            factory: Arc::new(factory),
        }
    }

    /// Pin this aggregator to state buckets covering exactly `interval`
    pub fn pinned_to(mut self, interval: DateInterval) -> Self {
        self.interval = Some(interval);
        self
    }
}

impl fmt::Debug for AggregatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregatorSpec")
            .field("id", &self.id)
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

/// Named slot in an event payload and its registered aggregators
#[derive(Debug, Clone)]
pub struct EventColumn {
    pub name: String,

    /// Owning category; `None` for registrations that apply to all events
    pub category: Option<String>,

    pub aggregators: Vec<AggregatorSpec>,
}

impl EventColumn {
    pub fn new(name: impl Into<String>, category: Option<String>) -> Self {
        Self {
            name: name.into(),
            category,
            aggregators: Vec::new(),
        }
    }
}

/// Group of events sharing a schema
#[derive(Debug, Clone)]
pub struct EventCategory {
    pub name: String,
    pub columns: Vec<EventColumn>,
}

impl EventCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&EventColumn> {
        self.columns.iter().find(|column| column.name == name)
    }
}
