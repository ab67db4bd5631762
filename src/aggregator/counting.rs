//! Counting aggregator

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::aggregator::{Aggregator, Disposition};
use crate::domain::Event;
use crate::error::CodecError;

/// Counts every event it sees
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountingAggregator {
    pub value_count: u64,
}

impl CountingAggregator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregator for CountingAggregator {
    fn add_event(&mut self, _event: &Event, _column: Option<&str>) -> Disposition {
        self.value_count += 1;
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
        *self = Self::default();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn event() -> Event {
        Event::new(
            Uuid::new_v4(),
            "user-1",
            "textEvent",
            Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap(),
            BTreeMap::new(),
        )
    }

    #[test]
    fn counts_every_event_regardless_of_payload() {
        let mut counter = CountingAggregator::new();
        for _ in 0..5 {
            assert_eq!(counter.add_event(&event(), None), Disposition::Keep);
        }
        assert_eq!(counter.value_count, 5);
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut counter = CountingAggregator::new();
        counter.add_event(&event(), None);
        counter.add_event(&event(), None);

        let encoded = counter.encode().unwrap().unwrap();
        let mut restored = CountingAggregator::new();
        restored.decode(&encoded).unwrap();
        assert_eq!(restored, counter);
    }

    #[test]
    fn reset_returns_to_zero() {
        let mut counter = CountingAggregator::new();
        counter.add_event(&event(), None);
        counter.reset();
        assert_eq!(counter.value_count, 0);
    }
}
