//! Clock abstraction
//!
//! The analyzer never reads wall time directly; it asks an injected clock.
//! Tests pin the clock to a fixed instant to make interval math reproducible.

use std::sync::RwLock;

use chrono::{DateTime, Utc};

/// Source of the analyzer's notion of "now"
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests and replays
#[derive(Debug)]
pub struct FixedClock {
    instant: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: RwLock::new(instant),
        }
    }

    /// Move the clock to a new instant
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.instant.write().expect("clock lock poisoned") = instant;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.read().expect("clock lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_reports_the_pinned_instant() {
        let instant = Utc.with_ymd_and_hms(2023, 1, 14, 12, 0, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now(), instant);

        let later = Utc.with_ymd_and_hms(2023, 2, 7, 23, 59, 59).unwrap();
        clock.set(later);
        assert_eq!(clock.now(), later);
    }
}
