//! Date-bucketing aggregators

use std::any::Any;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregator::{Aggregator, Disposition};
use crate::calendar::{self, WeekAnchor};
use crate::domain::Event;
use crate::error::CodecError;

/// Calendar scope a timestamp is truncated to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateScope {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl DateScope {
    /// Start of the scope containing `instant`; the bucket key
    pub fn start_of(self, instant: DateTime<Utc>, anchor: WeekAnchor) -> DateTime<Utc> {
        match self {
            DateScope::Hour => calendar::start_of_hour(instant),
            DateScope::Day => calendar::start_of_day(instant),
            DateScope::Week => calendar::start_of_week(instant, anchor),
            DateScope::Month => calendar::start_of_month(instant),
            DateScope::Year => calendar::start_of_year(instant),
        }
    }
}

/// Collects events per calendar bucket of `event.timestamp`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateAggregator {
    scope: DateScope,
    anchor: WeekAnchor,
    buckets: BTreeMap<DateTime<Utc>, Vec<Event>>,
}

impl DateAggregator {
    pub fn new(scope: DateScope) -> Self {
        Self {
            scope,
            anchor: WeekAnchor::default(),
            buckets: BTreeMap::new(),
        }
    }

    pub fn with_anchor(mut self, anchor: WeekAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn buckets(&self) -> &BTreeMap<DateTime<Utc>, Vec<Event>> {
        &self.buckets
    }
}

impl Aggregator for DateAggregator {
    fn add_event(&mut self, event: &Event, _column: Option<&str>) -> Disposition {
        let key = self.scope.start_of(event.timestamp, self.anchor);
        self.buckets.entry(key).or_default().push(event.clone());
        Disposition::Keep
    }

    fn encode(&self) -> Result<Option<Vec<u8>>, CodecError> {
        Ok(Some(serde_json::to_vec(self)?))
    }

    fn decode(&mut self, data: &[u8]) -> Result<(), CodecError> {
        *self = serde_json::from_slice(data)?;
        Ok(())
    }

    fn reset(&mut self) {
        self.buckets.clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Counts events per calendar bucket of `event.timestamp`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountingByDateAggregator {
    scope: DateScope,
    anchor: WeekAnchor,
    counts: BTreeMap<DateTime<Utc>, u64>,
}

impl CountingByDateAggregator {
    pub fn new(scope: DateScope) -> Self {
        Self {
            scope,
            anchor: WeekAnchor::default(),
            counts: BTreeMap::new(),
        }
    }

    pub fn with_anchor(mut self, anchor: WeekAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn counts(&self) -> &BTreeMap<DateTime<Utc>, u64> {
        &self.counts
    }
}

impl Aggregator for CountingByDateAggregator {
    fn add_event(&mut self, event: &Event, _column: Option<&str>) -> Disposition {
        let key = self.scope.start_of(event.timestamp, self.anchor);
        *self.counts.entry(key).or_insert(0) += 1;
        Disposition::Keep
    }

    fn encode(&self) -> Result<Option<Vec<u8>>, CodecError> {
        Ok(Some(serde_json::to_vec(self)?))
    }

    fn decode(&mut self, data: &[u8]) -> Result<(), CodecError> {
        *self = serde_json::from_slice(data)?;
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
