//! Analyzer status
//!
//! The externally observable state machine. Transitions are driven
//! internally and pass through the significance filter before reaching the
//! delegate, so hosts are not flooded with sub-percent progress updates.

use std::mem;

/// Where a batch of events is being read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSource {
    Backend,
    Cache,
}

/// Observable analyzer state
#[derive(Debug, Clone, PartialEq)]
pub enum AnalyzerStatus {
    Initializing,
    PersistingEvents { progress: f64 },
    PersistingState { progress: f64 },
    FetchingEvents { count: u64, source: EventSource },
    DecodingEvents { progress: f64, source: EventSource },
    ProcessingEvents { progress: f64, detail: Option<String> },
    Ready,
}

/// Minimum progress delta worth reporting
const SIGNIFICANT_PROGRESS: f64 = 0.01;
/// Minimum relative change of an event count worth reporting
const SIGNIFICANT_COUNT_RATIO: f64 = 0.01;

impl AnalyzerStatus {
    fn progress(&self) -> Option<f64> {
        match self {
            AnalyzerStatus::PersistingEvents { progress }
            | AnalyzerStatus::PersistingState { progress }
            | AnalyzerStatus::DecodingEvents { progress, .. }
            | AnalyzerStatus::ProcessingEvents { progress, .. } => Some(*progress),
            _ => None,
        }
    }

    fn event_count(&self) -> Option<u64> {
        match self {
            AnalyzerStatus::FetchingEvents { count, .. } => Some(*count),
            _ => None,
        }
    }

    fn source(&self) -> Option<EventSource> {
        match self {
            AnalyzerStatus::FetchingEvents { source, .. }
            | AnalyzerStatus::DecodingEvents { source, .. } => Some(*source),
            _ => None,
        }
    }

    /// Decide whether this transition is worth notifying, given the last
    /// reported status. Progress-bearing variants report on a ≥ 1 %
    /// progress or relative-count change; other variants compare by tag.
    pub fn is_significant_change(&self, last_reported: &AnalyzerStatus) -> bool {
        if mem::discriminant(self) != mem::discriminant(last_reported) {
            return true;
        }
        if self.source() != last_reported.source() {
            return true;
        }
        if let (Some(current), Some(last)) = (self.progress(), last_reported.progress()) {
            if (current - last).abs() >= SIGNIFICANT_PROGRESS {
                return true;
            }
        }
        if let (Some(current), Some(last)) = (self.event_count(), last_reported.event_count()) {
            let reference = last.max(1) as f64;
            if ((current as f64 - last as f64) / reference).abs() >= SIGNIFICANT_COUNT_RATIO {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_changes_are_always_significant() {
        assert!(AnalyzerStatus::Ready.is_significant_change(&AnalyzerStatus::Initializing));
        assert!(!AnalyzerStatus::Ready.is_significant_change(&AnalyzerStatus::Ready));
    }

    #[test]
    fn sub_percent_progress_is_throttled() {
        let last = AnalyzerStatus::ProcessingEvents {
            progress: 0.50,
            detail: None,
        };
        let minor = AnalyzerStatus::ProcessingEvents {
            progress: 0.505,
            detail: None,
        };
        let major = AnalyzerStatus::ProcessingEvents {
            progress: 0.52,
            detail: None,
        };
        assert!(!minor.is_significant_change(&last));
        assert!(major.is_significant_change(&last));
    }

    #[test]
    fn fetch_counts_compare_ratio_wise() {
        let last = AnalyzerStatus::FetchingEvents {
            count: 1000,
            source: EventSource::Backend,
        };
        let minor = AnalyzerStatus::FetchingEvents {
            count: 1005,
            source: EventSource::Backend,
        };
        let major = AnalyzerStatus::FetchingEvents {
            count: 1100,
            source: EventSource::Backend,
        };
        assert!(!minor.is_significant_change(&last));
        assert!(major.is_significant_change(&last));
    }

    #[test]
    fn source_changes_are_significant() {
        let last = AnalyzerStatus::FetchingEvents {
            count: 100,
            source: EventSource::Backend,
        };
        let cache = AnalyzerStatus::FetchingEvents {
            count: 100,
            source: EventSource::Cache,
        };
        assert!(cache.is_significant_change(&last));
    }
}
