//! Interval state
//!
//! The aggregator instances and bookkeeping for one interval. States are
//! created lazily, mutated by event dispatch, and persisted through the
//! codec after each modifying batch.

pub mod codec;
pub mod keys;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::aggregator::Aggregator;
use crate::analyzer::registry::AggregatorRegistry;
use crate::calendar::DateInterval;
use crate::domain::Event;

/// Per-interval container of aggregator instances
pub struct IntervalState {
    /// The interval this bucket covers
    pub interval: DateInterval,

    /// Span of event timestamps already folded into this bucket; starts
    /// empty at the interval start
    pub processed_event_interval: DateInterval,

    /// Number of events folded into this bucket
    pub event_count: u64,

    /// Aggregator instances by id
    pub aggregators: BTreeMap<String, Box<dyn Aggregator>>,

    /// Ids that have been fully populated within this interval; ids present
    /// in `aggregators` but missing here still need a back-fill
    pub known_aggregators: BTreeSet<String>,
}

impl IntervalState {
    /// Fresh bucket for `interval`. Nothing is processed yet, so every
    /// instantiated aggregator is trivially up to date.
    pub fn new(interval: DateInterval, registry: &AggregatorRegistry) -> Self {
        let aggregators = registry.instantiate_for(&interval);
        let known_aggregators = aggregators.keys().cloned().collect();
        Self {
            interval,
            processed_event_interval: DateInterval::empty_at(interval.start),
            event_count: 0,
            aggregators,
            known_aggregators,
        }
    }

    pub fn aggregator(&self, id: &str) -> Option<&dyn Aggregator> {
        self.aggregators.get(id).map(|aggregator| aggregator.as_ref())
    }

    /// Dispatch a new event to every matching aggregator and update the
    /// bookkeeping. For each aggregator, every registered column is tried;
    /// bindings carrying a category only fire when the event's category
    /// matches. Chain semantics are handled inside the aggregators, so the
    /// disposition is not interpreted here.
    pub fn add_event(&mut self, event: &Event, registry: &AggregatorRegistry) {
        self.dispatch(event, registry, None);
        self.event_count += 1;
        self.processed_event_interval = self
            .processed_event_interval
            .expanded_to_cover(event.timestamp);
    }

    /// Dispatch a historical event to the listed aggregators only,
    /// bypassing the bookkeeping. This is the back-fill path: known
    /// aggregators have already seen the event.
    pub fn backfill_event(
        &mut self,
        event: &Event,
        registry: &AggregatorRegistry,
        only: &BTreeSet<String>,
    ) {
        self.dispatch(event, registry, Some(only));
    }

    fn dispatch(
        &mut self,
        event: &Event,
        registry: &AggregatorRegistry,
        only: Option<&BTreeSet<String>>,
    ) {
        for (id, aggregator) in self.aggregators.iter_mut() {
            if let Some(only) = only {
                if !only.contains(id) {
                    continue;
                }
            }
            let Some(registration) = registry.get(id) else {
                continue;
            };
            for binding in &registration.bindings {
                if let Some(category) = &binding.category {
                    if *category != event.category {
                        continue;
                    }
                }
                aggregator.add_event(event, Some(binding.column.as_str()));
            }
        }
    }

    /// Ids instantiated in this bucket that have not been populated yet
    pub fn uninitialized_aggregators(&self) -> BTreeSet<String> {
        self.aggregators
            .keys()
            .filter(|id| !self.known_aggregators.contains(*id))
            .cloned()
            .collect()
    }

    /// Record that the listed aggregators now cover this bucket's history
    pub fn mark_known(&mut self, ids: &BTreeSet<String>) {
        self.known_aggregators.extend(ids.iter().cloned());
    }
}

impl fmt::Debug for IntervalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntervalState")
            .field("interval", &self.interval)
            .field("processed_event_interval", &self.processed_event_interval)
            .field("event_count", &self.event_count)
            .field("aggregators", &self.aggregators.keys().collect::<Vec<_>>())
            .field("known_aggregators", &self.known_aggregators)
            .finish()
    }
}
