//! Keyword search index
//!
//! Token to event-id posting map over an interval. Raw keywords come from
//! the configured extractor (default: every text payload value), are
//! lowercased and segmented on non-alphanumeric boundaries; queries match
//! token prefixes.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::DateInterval;
use crate::domain::Event;

/// Host-provided keyword extractor filling the raw keyword set for an event
pub type KeywordExtractor = Arc<dyn Fn(&Event, &mut BTreeSet<String>) + Send + Sync>;

/// Lowercase a text and segment it into alphanumeric tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(String::from)
        .collect()
}

/// Raw keywords of an event: the extractor's output, or every text payload
/// value when no extractor is configured
pub fn extract_keywords(event: &Event, extractor: Option<&KeywordExtractor>) -> BTreeSet<String> {
    let mut raw = BTreeSet::new();
    match extractor {
        Some(extract) => extract(event, &mut raw),
        None => {
            for value in event.data.values() {
                if let Some(text) = value.as_text() {
                    raw.insert(text.to_string());
                }
            }
        }
    }
    raw
}

/// Keyword to event-id posting map covering one interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchIndex {
    pub interval: DateInterval,
    keyword_map: BTreeMap<String, BTreeSet<Uuid>>,
}

impl SearchIndex {
    pub fn new(interval: DateInterval) -> Self {
        Self {
            interval,
            keyword_map: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.keyword_map.is_empty()
    }

    /// Tokenize the event's keywords into the posting map
    pub fn add_event(&mut self, event: &Event, extractor: Option<&KeywordExtractor>) {
        for raw in extract_keywords(event, extractor) {
            for token in tokenize(&raw) {
                self.keyword_map.entry(token).or_default().insert(event.id);
            }
        }
    }

    /// Extend this index with events lying outside its current interval;
    /// events already covered are not re-keyworded
    pub fn extend_with(&mut self, events: &[Event], extractor: Option<&KeywordExtractor>) {
        for event in events {
            if self.interval.contains(event.timestamp) {
                continue;
            }
            self.add_event(event, extractor);
            self.interval = self.interval.expanded_to_cover(event.timestamp);
        }
    }

    /// Merge another index's postings, keeping only ids in `allowed`. Used
    /// to reconstruct an interval-restricted index from per-bucket maps.
    pub fn merge_filtered(&mut self, other: &SearchIndex, allowed: &BTreeSet<Uuid>) {
        for (token, ids) in &other.keyword_map {
            let kept: BTreeSet<Uuid> = ids.intersection(allowed).copied().collect();
            if !kept.is_empty() {
                self.keyword_map.entry(token.clone()).or_default().extend(kept);
            }
        }
    }

    fn any_posting_with_prefix_contains(&self, prefix: &str, event_id: Uuid) -> bool {
        self.keyword_map
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(|(token, _)| token.starts_with(prefix))
            .any(|(_, ids)| ids.contains(&event_id))
    }

    /// True iff every query word prefix-matches a token whose posting set
    /// contains `event_id`; an empty query matches everything
    pub fn matches(&self, query: &str, event_id: Uuid) -> bool {
        tokenize(query)
            .iter()
            .all(|word| self.any_posting_with_prefix_contains(word, event_id))
    }
}
