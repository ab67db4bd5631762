//! Persisted key layout
//!
//! All delegate keys are namespaced and carry the covered interval as a
//! zero-padded `YYYYMMDD-YYYYMMDD` fragment in the UTC calendar.

use crate::calendar::DateInterval;

/// Key of the bare all-time search index
pub const SEARCH_INDEX_KEY: &str = "keystone-search-index";

/// Key of an encoded interval state
pub fn state_key(interval: &DateInterval) -> String {
    format!("state-{}", interval.key_fragment())
}

/// Key of a monthly event bucket
pub fn events_key(interval: &DateInterval) -> String {
    format!("events-{}", interval.key_fragment())
}

/// Key of the per-bucket search index stored alongside an event bucket
pub fn search_index_key(interval: &DateInterval) -> String {
    format!("{SEARCH_INDEX_KEY}-{}", interval.key_fragment())
}
