//! Aggregator registry
//!
//! Maps each aggregator id to its registration sites, interval pin and
//! factory. States look registrations up by id when dispatching events, so
//! aggregators never back-reference the category they were registered on.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::aggregator::Aggregator;
use crate::calendar::DateInterval;
use crate::domain::{AggregatorFactory, AggregatorSpec, EventCategory};

/// One registration site of an aggregator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    /// Column name the aggregator reads; the synthetic `"id"` column for
    /// category-level and all-event registrations
    pub column: String,

    /// Category the event must belong to; `None` matches every event
    pub category: Option<String>,
}

/// Everything the analyzer knows about one aggregator id
pub struct AggregatorRegistration {
    pub bindings: Vec<ColumnBinding>,
    pub interval: Option<DateInterval>,
    pub factory: AggregatorFactory,
}

/// Registry of aggregator ids to registrations
#[derive(Default)]
pub struct AggregatorRegistry {
    registrations: BTreeMap<String, AggregatorRegistration>,
}

impl AggregatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry from composed categories plus all-event specs.
    /// Category columns carry their specs; all-event specs bind to the
    /// synthetic `"id"` column with no category filter.
    pub fn from_categories(
        categories: &[EventCategory],
        all_event_specs: &[AggregatorSpec],
    ) -> Self {
        let mut registry = Self::new();
        for category in categories {
            for column in &category.columns {
                for spec in &column.aggregators {
                    registry.register(
                        spec,
                        ColumnBinding {
                            column: column.name.clone(),
                            category: column.category.clone(),
                        },
                    );
                }
            }
        }
        for spec in all_event_specs {
            registry.register(
                spec,
                ColumnBinding {
                    column: crate::domain::RESERVED_COLUMN.to_string(),
                    category: None,
                },
            );
        }
        registry
    }

    /// Record a registration site. Re-registering an existing id keeps the
    /// first factory and interval pin; only the binding is added.
    pub fn register(&mut self, spec: &AggregatorSpec, binding: ColumnBinding) {
        match self.registrations.entry(spec.id.clone()) {
            Entry::Occupied(mut existing) => {
                tracing::debug!(
                    "aggregator {} already registered; keeping first factory",
                    spec.id
                );
                let registration = existing.get_mut();
                if !registration.bindings.contains(&binding) {
                    registration.bindings.push(binding);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(AggregatorRegistration {
                    bindings: vec![binding],
                    interval: spec.interval,
                    factory: spec.factory.clone(),
                });
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&AggregatorRegistration> {
        self.registrations.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.registrations.keys().map(String::as_str)
    }

    /// True iff `id` has a registration site under `category`
    pub fn is_registered_for_category(&self, id: &str, category: &str) -> bool {
        self.get(id).is_some_and(|registration| {
            registration
                .bindings
                .iter()
                .any(|binding| binding.category.as_deref() == Some(category))
        })
    }

    /// Fresh aggregator instances for a state bucket covering `interval`,
    /// honoring interval pins
    pub fn instantiate_for(&self, interval: &DateInterval) -> BTreeMap<String, Box<dyn Aggregator>> {
        self.registrations
            .iter()
            .filter(|(_, registration)| {
                registration
                    .interval
                    .map_or(true, |pin| pin == *interval)
            })
            .map(|(id, registration)| (id.clone(), (registration.factory)()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::CountingAggregator;
    use crate::calendar::month_containing;
    use chrono::{TimeZone, Utc};

    fn spec(id: &str) -> AggregatorSpec {
        AggregatorSpec::new(id, || Box::new(CountingAggregator::new()))
    }

    fn binding(column: &str, category: Option<&str>) -> ColumnBinding {
        ColumnBinding {
            column: column.to_string(),
            category: category.map(String::from),
        }
    }

    #[test]
    fn first_registration_wins_but_bindings_accumulate() {
        let mut registry = AggregatorRegistry::new();
        registry.register(&spec("Count"), binding("a", Some("numericEvent")));
        registry.register(&spec("Count"), binding("b", Some("textEvent")));

        let registration = registry.get("Count").unwrap();
        assert_eq!(registration.bindings.len(), 2);
        assert!(registry.is_registered_for_category("Count", "numericEvent"));
        assert!(registry.is_registered_for_category("Count", "textEvent"));
        assert!(!registry.is_registered_for_category("Count", "other"));
    }

    #[test]
    fn interval_pins_gate_instantiation() {
        let january = month_containing(Utc.with_ymd_and_hms(2023, 1, 5, 0, 0, 0).unwrap());
        let february = month_containing(Utc.with_ymd_and_hms(2023, 2, 5, 0, 0, 0).unwrap());

        let mut registry = AggregatorRegistry::new();
        registry.register(&spec("Everywhere"), binding("id", None));
        registry.register(
            &spec("January Only").pinned_to(january),
            binding("id", None),
        );

        let january_state = registry.instantiate_for(&january);
        assert!(january_state.contains_key("Everywhere"));
        assert!(january_state.contains_key("January Only"));

        let february_state = registry.instantiate_for(&february);
        assert!(february_state.contains_key("Everywhere"));
        assert!(!february_state.contains_key("January Only"));
    }
}
