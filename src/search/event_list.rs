//! Event lists
//!
//! A filtered view of events over an interval, optionally carrying the
//! search index reconstructed for that interval.

use std::collections::BTreeSet;

use crate::calendar::DateInterval;
use crate::domain::Event;
use crate::search::index::{extract_keywords, tokenize, SearchIndex};

/// Events of one interval with optional keyword search
#[derive(Debug, Clone)]
pub struct EventList {
    pub interval: DateInterval,
    pub events: Vec<Event>,
    pub index: Option<SearchIndex>,
}

impl EventList {
    pub fn new(interval: DateInterval, events: Vec<Event>, index: Option<SearchIndex>) -> Self {
        Self {
            interval,
            events,
            index,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events matching the keyword query. With an index the posting map is
    /// consulted; without one, each event's default keywords are checked
    /// directly.
    pub fn matching(&self, query: &str) -> Vec<&Event> {
        match &self.index {
            Some(index) => self
                .events
                .iter()
                .filter(|event| index.matches(query, event.id))
                .collect(),
            None => {
                let words = tokenize(query);
                self.events
                    .iter()
                    .filter(|event| {
                        let tokens: BTreeSet<String> = extract_keywords(event, None)
                            .iter()
                            .flat_map(|raw| tokenize(raw))
                            .collect();
                        words
                            .iter()
                            .all(|word| tokens.iter().any(|token| token.starts_with(word)))
                    })
                    .collect()
            }
        }
    }
}
