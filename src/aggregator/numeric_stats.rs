//! Numeric statistics aggregator

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::aggregator::{Aggregator, Disposition};
use crate::domain::Event;
use crate::error::CodecError;

/// Count, sum, running mean and variance over a numeric column.
///
/// The mean and variance follow Welford's recurrence, so a single pass over
/// the stream is numerically stable regardless of magnitude.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericStatsAggregator {
    pub value_count: u64,
    pub sum: f64,
    pub running_average: f64,
    squared_distance: f64,
}

impl NumericStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Population variance of the values seen so far
    pub fn variance(&self) -> f64 {
        if self.value_count == 0 {
            0.0
        } else {
            self.squared_distance / self.value_count as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }
}

impl Aggregator for NumericStatsAggregator {
    fn add_event(&mut self, event: &Event, column: Option<&str>) -> Disposition {
        let value = column
            .and_then(|name| event.value(name))
            .and_then(|value| value.as_number());
        let Some(value) = value else {
            return Disposition::Discard;
        };

        self.value_count += 1;
        self.sum += value;
        let delta = value - self.running_average;
        self.running_average += delta / self.value_count as f64;
        self.squared_distance += delta * (value - self.running_average);
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
