//! Filtering aggregators
//!
//! Filters forward or discard events for the rest of their chain. The plain
//! variant inspects the registered column's value; the meta variant sees the
//! whole event. Predicates are host closures, so neither variant persists
//! state.

use std::any::Any;
use std::sync::Arc;

use crate::aggregator::{Aggregator, AggregatorChain, CountingAggregator, Disposition};
use crate::domain::{Event, EventValue};
use crate::error::CodecError;

/// Forwards an event iff the predicate accepts the column value; a missing
/// column is presented as [`EventValue::Absent`]
pub struct FilteringAggregator {
    predicate: Arc<dyn Fn(&EventValue) -> bool + Send + Sync>,
}

impl FilteringAggregator {
    pub fn new(predicate: impl Fn(&EventValue) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl Aggregator for FilteringAggregator {
    fn add_event(&mut self, event: &Event, column: Option<&str>) -> Disposition {
        let value = column
            .and_then(|name| event.value(name))
            .unwrap_or(&EventValue::Absent);
        if (self.predicate)(value) {
            Disposition::Keep
        } else {
            Disposition::Discard
        }
    }

    fn encode(&self) -> Result<Option<Vec<u8>>, CodecError> {
        Ok(None)
    }

    fn decode(&mut self, _data: &[u8]) -> Result<(), CodecError> {
        Ok(())
    }

    fn reset(&mut self) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Forwards an event iff the predicate accepts the whole event
pub struct MetaFilteringAggregator {
    predicate: Arc<dyn Fn(&Event) -> bool + Send + Sync>,
}

impl MetaFilteringAggregator {
    pub fn new(predicate: impl Fn(&Event) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Arc::new(predicate),
        }
    }
}

impl Aggregator for MetaFilteringAggregator {
    fn add_event(&mut self, event: &Event, _column: Option<&str>) -> Disposition {
        if (self.predicate)(event) {
            Disposition::Keep
        } else {
            Disposition::Discard
        }
    }

    fn encode(&self) -> Result<Option<Vec<u8>>, CodecError> {
        Ok(None)
    }

    fn decode(&mut self, _data: &[u8]) -> Result<(), CodecError> {
        Ok(())
    }

    fn reset(&mut self) {}

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Count of events whose column value satisfies `predicate`
pub fn predicate_aggregator(
    predicate: impl Fn(&EventValue) -> bool + Send + Sync + 'static,
) -> AggregatorChain {
    FilteringAggregator::new(predicate).then(CountingAggregator::new())
}
