//! Aggregator module
//!
//! The aggregator capability and the built-in library. An aggregator is a
//! stateful fold over events; chains compose two aggregators so the first
//! can filter or rewrite what the second sees.

pub mod chain;
pub mod counting;
pub mod date;
pub mod duplicate;
pub mod filter;
pub mod group;
pub mod latest;
pub mod map;
pub mod numeric_stats;

pub use chain::AggregatorChain;
pub use counting::CountingAggregator;
pub use date::{CountingByDateAggregator, DateAggregator, DateScope};
pub use duplicate::DuplicateEventChecker;
pub use filter::{predicate_aggregator, FilteringAggregator, MetaFilteringAggregator};
pub use group::{CountingByGroupAggregator, GroupingAggregator};
pub use latest::LatestEventAggregator;
pub use map::MappingAggregator;
pub use numeric_stats::NumericStatsAggregator;

use std::any::Any;

use crate::domain::Event;
use crate::error::CodecError;

/// What an aggregator decided about an event, as seen by the rest of its
/// chain
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Forward the event unchanged
    Keep,
    /// Stop the chain here
    Discard,
    /// Forward a rewritten event downstream
    Replace(Event),
}

/// A stateful processor folding events into a summary
pub trait Aggregator: Send + 'static {
    /// Called once per matching (event, column) pair. `column` names the
    /// payload slot the aggregator was registered on; registrations that
    /// apply to all events pass the synthetic `"id"` column.
    fn add_event(&mut self, event: &Event, column: Option<&str>) -> Disposition;

    /// Serialize state; `Ok(None)` marks a stateless or non-persistable
    /// aggregator
    fn encode(&self) -> Result<Option<Vec<u8>>, CodecError>;

    /// Restore state; the inverse of [`Aggregator::encode`]
    fn decode(&mut self, data: &[u8]) -> Result<(), CodecError>;

    /// Restore to empty
    fn reset(&mut self);

    /// Chain successor; `None` for leaves
    fn next(&self) -> Option<&dyn Aggregator> {
        None
    }

    fn next_mut(&mut self) -> Option<&mut dyn Aggregator> {
        None
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Compose with `next`: events this aggregator keeps (or rewrites) are
    /// forwarded to it
    fn then(self, next: impl Aggregator) -> AggregatorChain
    where
        Self: Sized,
    {
        AggregatorChain::new(Box::new(self), Box::new(next))
    }
}

impl dyn Aggregator {
    /// The terminal aggregator of this chain; `self` for leaves
    pub fn final_aggregator(&self) -> &dyn Aggregator {
        let mut current = self;
        while let Some(next) = current.next() {
            current = next;
        }
        current
    }

    pub fn final_aggregator_mut(&mut self) -> &mut dyn Aggregator {
        let mut current = self;
        while current.next().is_some() {
            current = current.next_mut().expect("next_mut mirrors next");
        }
        current
    }

    /// Downcast the terminal aggregator to a concrete type
    pub fn downcast_final<T: Aggregator>(&self) -> Option<&T> {
        self.final_aggregator().as_any().downcast_ref::<T>()
    }
}
