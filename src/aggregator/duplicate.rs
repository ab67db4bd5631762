//! Duplicate-event checker

use std::any::Any;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregator::{Aggregator, Disposition};
use crate::domain::Event;
use crate::error::CodecError;

/// Tracks seen event ids and counts repeats. Always forwards, so a chain
/// can count duplicates without losing events.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateEventChecker {
    seen: BTreeSet<Uuid>,
    pub duplicate_count: u64,
}

impl DuplicateEventChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

impl Aggregator for DuplicateEventChecker {
    fn add_event(&mut self, event: &Event, _column: Option<&str>) -> Disposition {
        if !self.seen.insert(event.id) {
            self.duplicate_count += 1;
        }
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

    fn event_with_id(id: u128) -> Event {
        Event::new(
            Uuid::from_u128(id),
            "user-1",
            "textEvent",
            Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap(),
            BTreeMap::new(),
        )
    }

    #[test]
    fn repeats_are_counted_and_still_forwarded() {
        let mut checker = DuplicateEventChecker::new();
        assert_eq!(checker.add_event(&event_with_id(1), None), Disposition::Keep);
        assert_eq!(checker.add_event(&event_with_id(2), None), Disposition::Keep);
        assert_eq!(checker.add_event(&event_with_id(1), None), Disposition::Keep);

        assert_eq!(checker.seen_count(), 2);
        assert_eq!(checker.duplicate_count, 1);
    }

    #[test]
    fn encode_decode_round_trip() {
        let mut checker = DuplicateEventChecker::new();
        checker.add_event(&event_with_id(1), None);
        checker.add_event(&event_with_id(1), None);

        let encoded = checker.encode().unwrap().unwrap();
        let mut restored = DuplicateEventChecker::new();
        restored.decode(&encoded).unwrap();
        assert_eq!(restored, checker);
    }
}
