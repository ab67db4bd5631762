//! Event values
//!
//! The heterogeneous payload type carried under each event column. Values
//! are totally ordered and hashable so they can key group buckets; `Number`
//! compares through its IEEE-754 bit pattern for that purpose.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::calendar::unix_seconds;

/// A single value in an event payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventValue {
    Number(f64),
    Text(String),
    Date(#[serde(with = "unix_seconds")] DateTime<Utc>),
    Bool(bool),
    Opaque(Vec<u8>),
    Absent,
}

impl EventValue {
    /// Variant rank for cross-variant ordering
    fn rank(&self) -> u8 {
        match self {
            EventValue::Number(_) => 0,
            EventValue::Text(_) => 1,
            EventValue::Date(_) => 2,
            EventValue::Bool(_) => 3,
            EventValue::Opaque(_) => 4,
            EventValue::Absent => 5,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            EventValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            EventValue::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            EventValue::Date(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            EventValue::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&[u8]> {
        match self {
            EventValue::Opaque(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, EventValue::Absent)
    }
}

impl PartialEq for EventValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (EventValue::Number(a), EventValue::Number(b)) => a.to_bits() == b.to_bits(),
            (EventValue::Text(a), EventValue::Text(b)) => a == b,
            (EventValue::Date(a), EventValue::Date(b)) => a == b,
            (EventValue::Bool(a), EventValue::Bool(b)) => a == b,
            (EventValue::Opaque(a), EventValue::Opaque(b)) => a == b,
            (EventValue::Absent, EventValue::Absent) => true,
            _ => false,
        }
    }
}

impl Eq for EventValue {}

impl PartialOrd for EventValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (EventValue::Number(a), EventValue::Number(b)) => a.total_cmp(b),
            (EventValue::Text(a), EventValue::Text(b)) => a.cmp(b),
            (EventValue::Date(a), EventValue::Date(b)) => a.cmp(b),
            (EventValue::Bool(a), EventValue::Bool(b)) => a.cmp(b),
            (EventValue::Opaque(a), EventValue::Opaque(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl Hash for EventValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u8(self.rank());
        match self {
            EventValue::Number(value) => value.to_bits().hash(state),
            EventValue::Text(value) => value.hash(state),
            EventValue::Date(value) => value.hash(state),
            EventValue::Bool(value) => value.hash(state),
            EventValue::Opaque(value) => value.hash(state),
            EventValue::Absent => {}
        }
    }
}
