//! Grouping aggregators
//!
//! Bucket events by the value under the registered column. A missing value
//! buckets under `Absent`, which is a distinct key. Group keys are not
//! valid JSON object keys, so the encoded form is an ordered sequence of
//! `(key, payload)` pairs.

use std::any::Any;
use std::collections::BTreeMap;

use crate::aggregator::{Aggregator, Disposition};
use crate::domain::{Event, EventValue};
use crate::error::CodecError;

fn group_key(event: &Event, column: Option<&str>) -> EventValue {
    column
        .and_then(|name| event.value(name))
        .cloned()
        .unwrap_or(EventValue::Absent)
}

/// Collects the events of each group
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GroupingAggregator {
    groups: BTreeMap<EventValue, Vec<Event>>,
}

impl GroupingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn groups(&self) -> &BTreeMap<EventValue, Vec<Event>> {
        &self.groups
    }
}

impl Aggregator for GroupingAggregator {
    fn add_event(&mut self, event: &Event, column: Option<&str>) -> Disposition {
        self.groups
            .entry(group_key(event, column))
            .or_default()
            .push(event.clone());
        Disposition::Keep
    }

    fn encode(&self) -> Result<Option<Vec<u8>>, CodecError> {
        let entries: Vec<(&EventValue, &Vec<Event>)> = self.groups.iter().collect();
        Ok(Some(serde_json::to_vec(&entries)?))
    }

    fn decode(&mut self, data: &[u8]) -> Result<(), CodecError> {
        let entries: Vec<(EventValue, Vec<Event>)> = serde_json::from_slice(data)?;
        self.groups = entries.into_iter().collect();
        Ok(())
    }

    fn reset(&mut self) {
        self.groups.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Counts the events of each group
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CountingByGroupAggregator {
    counts: BTreeMap<EventValue, u64>,
}

impl CountingByGroupAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counts(&self) -> &BTreeMap<EventValue, u64> {
        &self.counts
    }

    pub fn count_for(&self, key: &EventValue) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }
}

impl Aggregator for CountingByGroupAggregator {
    fn add_event(&mut self, event: &Event, column: Option<&str>) -> Disposition {
        *self.counts.entry(group_key(event, column)).or_insert(0) += 1;
        Disposition::Keep
    }

    fn encode(&self) -> Result<Option<Vec<u8>>, CodecError> {
        let entries: Vec<(&EventValue, &u64)> = self.counts.iter().collect();
        Ok(Some(serde_json::to_vec(&entries)?))
    }

    fn decode(&mut self, data: &[u8]) -> Result<(), CodecError> {
        let entries: Vec<(EventValue, u64)> = serde_json::from_slice(data)?;
        self.counts = entries.into_iter().collect();
        Ok(())
    }

    fn reset(&mut self) {
        self.counts.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
