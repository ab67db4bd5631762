//! Latest-event aggregator

use std::any::Any;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::aggregator::{Aggregator, Disposition};
use crate::domain::Event;
use crate::error::CodecError;

/// Keeps, per originating user, the most recent event by arrival order
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestEventAggregator {
    latest: BTreeMap<String, Event>,
}

impl LatestEventAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn latest_for(&self, user_id: &str) -> Option<&Event> {
        self.latest.get(user_id)
    }

    pub fn user_count(&self) -> usize {
        self.latest.len()
    }
}

impl Aggregator for LatestEventAggregator {
    fn add_event(&mut self, event: &Event, _column: Option<&str>) -> Disposition {
        self.latest.insert(event.user_id.clone(), event.clone());
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
    use uuid::Uuid;

    fn event_for(user: &str, id: u128) -> Event {
        Event::new(
            Uuid::from_u128(id),
            user,
            "textEvent",
            Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap(),
            BTreeMap::new(),
        )
    }

    #[test]
    fn later_arrivals_replace_earlier_ones_per_user() {
        let mut latest = LatestEventAggregator::new();
        latest.add_event(&event_for("alice", 1), None);
        latest.add_event(&event_for("bob", 2), None);
        latest.add_event(&event_for("alice", 3), None);

        assert_eq!(latest.user_count(), 2);
        assert_eq!(latest.latest_for("alice").unwrap().id, Uuid::from_u128(3));
        assert_eq!(latest.latest_for("bob").unwrap().id, Uuid::from_u128(2));
        assert!(latest.latest_for("carol").is_none());
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut latest = LatestEventAggregator::new();
        latest.add_event(&event_for("alice", 1), None);

        let encoded = latest.encode().unwrap().unwrap();
        let mut restored = LatestEventAggregator::new();
        restored.decode(&encoded).unwrap();
        assert_eq!(restored, latest);
    }
}
