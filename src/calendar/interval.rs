//! Date intervals
//!
//! Closed intervals of absolute time. Normalized intervals (calendar months
//! and the all-time sentinel) bucket aggregator state; ad-hoc intervals
//! drive one-off queries.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::unix_seconds;

/// A closed interval `[start, end]` of absolute time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DateInterval {
    #[serde(with = "unix_seconds")]
    pub start: DateTime<Utc>,
    #[serde(with = "unix_seconds")]
    pub end: DateTime<Utc>,
}

impl DateInterval {
    /// Create an interval; `start` must not lie after `end`
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        debug_assert!(start <= end, "interval start lies after its end");
        Self { start, end }
    }

    /// The empty interval anchored at `instant`
    pub fn empty_at(instant: DateTime<Utc>) -> Self {
        Self {
            start: instant,
            end: instant,
        }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// True for intervals of zero duration, which carry no processed events
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive containment on both ends
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant <= self.end
    }

    pub fn intersects(&self, other: &DateInterval) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// Smallest interval covering both `self` and `instant`
    pub fn expanded_to_cover(&self, instant: DateTime<Utc>) -> Self {
        Self {
            start: self.start.min(instant),
            end: self.end.max(instant),
        }
    }

    /// The `YYYYMMDD-YYYYMMDD` fragment used in persisted keys, UTC calendar
    pub fn key_fragment(&self) -> String {
        format!(
            "{}-{}",
            self.start.format("%Y%m%d"),
            self.end.format("%Y%m%d")
        )
    }
}

impl fmt::Display for DateInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} .. {}]", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn containment_is_inclusive_on_both_ends() {
        let interval = DateInterval::new(at(2023, 1, 1, 0, 0, 0), at(2023, 1, 31, 23, 59, 59));
        assert!(interval.contains(interval.start));
        assert!(interval.contains(interval.end));
        assert!(!interval.contains(at(2023, 2, 1, 0, 0, 0)));
    }

    #[test]
    fn empty_interval_has_zero_duration() {
        let interval = DateInterval::empty_at(at(2023, 1, 1, 0, 0, 0));
        assert!(interval.is_empty());
        assert_eq!(interval.duration(), Duration::zero());
    }

    #[test]
    fn expansion_covers_new_instants_in_either_direction() {
        let interval = DateInterval::empty_at(at(2023, 1, 10, 0, 0, 0));
        let wider = interval
            .expanded_to_cover(at(2023, 1, 5, 0, 0, 0))
            .expanded_to_cover(at(2023, 1, 20, 0, 0, 0));
        assert_eq!(wider.start, at(2023, 1, 5, 0, 0, 0));
        assert_eq!(wider.end, at(2023, 1, 20, 0, 0, 0));
    }

    #[test]
    fn key_fragment_is_zero_padded_utc() {
        let interval = DateInterval::new(at(2023, 1, 1, 0, 0, 0), at(2023, 1, 31, 23, 59, 59));
        assert_eq!(interval.key_fragment(), "20230101-20230131");
    }

    #[test]
    fn json_round_trip_preserves_bounds() {
        let interval = DateInterval::new(at(2023, 1, 1, 0, 0, 0), at(2023, 1, 31, 23, 59, 59));
        let encoded = serde_json::to_string(&interval).unwrap();
        let decoded: DateInterval = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, interval);
    }
}
