//! Aggregator chains
//!
//! A chain runs its head on every event, then feeds the kept or rewritten
//! event to its tail. Chains own their members; persistence goes through
//! the terminal aggregator, so chain nodes themselves carry no encoded
//! state.

use std::any::Any;

use crate::aggregator::{Aggregator, Disposition};
use crate::domain::Event;
use crate::error::CodecError;

/// Composition of two aggregators; the head's output feeds the tail
pub struct AggregatorChain {
    head: Box<dyn Aggregator>,
    tail: Box<dyn Aggregator>,
}

impl AggregatorChain {
    pub fn new(head: Box<dyn Aggregator>, tail: Box<dyn Aggregator>) -> Self {
        Self { head, tail }
    }

    pub fn head(&self) -> &dyn Aggregator {
        self.head.as_ref()
    }
}

impl Aggregator for AggregatorChain {
    fn add_event(&mut self, event: &Event, column: Option<&str>) -> Disposition {
        match self.head.add_event(event, column) {
            Disposition::Discard => Disposition::Discard,
            Disposition::Keep => self.tail.add_event(event, column),
            Disposition::Replace(rewritten) => match self.tail.add_event(&rewritten, column) {
                Disposition::Keep => Disposition::Replace(rewritten),
                downstream => downstream,
            },
        }
    }

    fn encode(&self) -> Result<Option<Vec<u8>>, CodecError> {
        self.tail.final_aggregator().encode()
    }

    fn decode(&mut self, data: &[u8]) -> Result<(), CodecError> {
        self.tail.final_aggregator_mut().decode(data)
    }

    fn reset(&mut self) {
        self.tail.final_aggregator_mut().reset();
    }

    fn next(&self) -> Option<&dyn Aggregator> {
        Some(self.tail.as_ref())
    }

    fn next_mut(&mut self) -> Option<&mut dyn Aggregator> {
        Some(self.tail.as_mut())
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
    use crate::aggregator::{
        CountingAggregator, FilteringAggregator, MappingAggregator, NumericStatsAggregator,
    };
    use crate::domain::EventValue;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn numeric_event(value: f64) -> Event {
        let mut data = BTreeMap::new();
        data.insert("amount".to_string(), EventValue::Number(value));
        Event::new(
            Uuid::new_v4(),
            "user-1",
            "numericEvent",
            Utc.with_ymd_and_hms(2023, 1, 5, 12, 0, 0).unwrap(),
            data,
        )
    }

    #[test]
    fn filter_gates_what_the_tail_counts() {
        let mut chain = FilteringAggregator::new(|value| {
            value.as_number().is_some_and(|number| number > 10.0)
        })
        .then(CountingAggregator::new());

        for value in [1.0, 11.0, 5.0, 20.0] {
            chain.add_event(&numeric_event(value), Some("amount"));
        }

        let counter = (&chain as &dyn Aggregator)
            .downcast_final::<CountingAggregator>()
            .unwrap();
        assert_eq!(counter.value_count, 2);
    }

    #[test]
    fn replace_rewrites_what_the_tail_sees() {
        let mut chain = MappingAggregator::new(|value| {
            value.as_number().map(|number| EventValue::Number(number * 2.0))
        })
        .then(NumericStatsAggregator::new());

        chain.add_event(&numeric_event(3.0), Some("amount"));
        chain.add_event(&numeric_event(4.0), Some("amount"));

        let stats = (&chain as &dyn Aggregator)
            .downcast_final::<NumericStatsAggregator>()
            .unwrap();
        assert_eq!(stats.value_count, 2);
        assert!((stats.sum - 14.0).abs() < 1e-9);
    }

    #[test]
    fn chain_persistence_goes_through_the_terminal() {
        let mut chain = FilteringAggregator::new(|value| !value.is_absent())
            .then(CountingAggregator::new());
        chain.add_event(&numeric_event(1.0), Some("amount"));
        chain.add_event(&numeric_event(2.0), Some("amount"));

        let encoded = chain.encode().unwrap().unwrap();

        let mut restored = FilteringAggregator::new(|value| !value.is_absent())
            .then(CountingAggregator::new());
        restored.decode(&encoded).unwrap();
        let counter = (&restored as &dyn Aggregator)
            .downcast_final::<CountingAggregator>()
            .unwrap();
        assert_eq!(counter.value_count, 2);
    }

    #[test]
    fn nested_chains_resolve_the_same_terminal() {
        let chain = FilteringAggregator::new(|_| true)
            .then(FilteringAggregator::new(|_| true).then(CountingAggregator::new()));
        assert!((&chain as &dyn Aggregator)
            .downcast_final::<CountingAggregator>()
            .is_some());
    }

    #[test]
    fn reset_clears_the_terminal() {
        let mut chain =
            FilteringAggregator::new(|_| true).then(CountingAggregator::new());
        chain.add_event(&numeric_event(1.0), Some("amount"));
        chain.reset();
        let counter = (&chain as &dyn Aggregator)
            .downcast_final::<CountingAggregator>()
            .unwrap();
        assert_eq!(counter.value_count, 0);
    }
}
