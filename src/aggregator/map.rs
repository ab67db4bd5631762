//! Mapping aggregator

use std::any::Any;
use std::sync::Arc;

use crate::aggregator::{Aggregator, Disposition};
use crate::domain::{Event, EventValue};
use crate::error::CodecError;

/// Rewrites the registered column's value for downstream aggregators; a
/// `None` from the map function discards the event
pub struct MappingAggregator {
    map: Arc<dyn Fn(&EventValue) -> Option<EventValue> + Send + Sync>,
}

impl MappingAggregator {
    pub fn new(map: impl Fn(&EventValue) -> Option<EventValue> + Send + Sync + 'static) -> Self {
        Self { map: Arc::new(map) }
    }
}

impl Aggregator for MappingAggregator {
    fn add_event(&mut self, event: &Event, column: Option<&str>) -> Disposition {
        let Some(column) = column else {
            return Disposition::Discard;
        };
        let value = event.value(column).unwrap_or(&EventValue::Absent);
        match (self.map)(value) {
            Some(mapped) => Disposition::Replace(event.with_value(column, mapped)),
            None => Disposition::Discard,
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
