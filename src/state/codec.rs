//! Persistence codec
//!
//! JSON encoding of interval states, monthly event buckets and search
//! indices. Aggregator payloads are embedded as JSON values; decoding
//! instantiates fresh instances from the registry, so ids with no live
//! registration are ignored and schema shrinkage is tolerated.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::analyzer::registry::AggregatorRegistry;
use crate::calendar::DateInterval;
use crate::domain::Event;
use crate::error::CodecError;
use crate::search::SearchIndex;
use crate::state::IntervalState;

#[derive(Debug, Serialize, Deserialize)]
struct EncodedIntervalState {
    interval: DateInterval,
    processed_event_interval: DateInterval,
    event_count: u64,
    known_aggregators: BTreeSet<String>,
    aggregators: Vec<EncodedAggregator>,
}

#[derive(Debug, Serialize, Deserialize)]
struct EncodedAggregator {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

/// Encode a state bucket for the delegate
pub fn encode_state(state: &IntervalState) -> Result<Vec<u8>, CodecError> {
    let mut aggregators = Vec::with_capacity(state.aggregators.len());
    for (id, aggregator) in &state.aggregators {
        let data = match aggregator.encode()? {
            Some(bytes) => Some(serde_json::from_slice(&bytes)?),
            None => None,
        };
        aggregators.push(EncodedAggregator {
            id: id.clone(),
            data,
        });
    }
    let envelope = EncodedIntervalState {
        interval: state.interval,
        processed_event_interval: state.processed_event_interval,
        event_count: state.event_count,
        known_aggregators: state.known_aggregators.clone(),
        aggregators,
    };
    Ok(serde_json::to_vec(&envelope)?)
}

/// Decode a state bucket, instantiating aggregators from `registry`
pub fn decode_state(
    data: &[u8],
    registry: &AggregatorRegistry,
) -> Result<IntervalState, CodecError> {
    let envelope: EncodedIntervalState = serde_json::from_slice(data)?;

    let mut state = IntervalState::new(envelope.interval, registry);
    state.processed_event_interval = envelope.processed_event_interval;
    state.event_count = envelope.event_count;
    state.known_aggregators = envelope.known_aggregators;

    for encoded in envelope.aggregators {
        let Some(aggregator) = state.aggregators.get_mut(&encoded.id) else {
            tracing::debug!("dropping persisted state of unknown aggregator {}", encoded.id);
            continue;
        };
        if let Some(payload) = encoded.data {
            let bytes = serde_json::to_vec(&payload)?;
            aggregator.decode(&bytes)?;
        }
    }
    Ok(state)
}

/// Encode a monthly event bucket
pub fn encode_events(events: &[Event]) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(events)?)
}

/// Decode a monthly event bucket
pub fn decode_events(data: &[u8]) -> Result<Vec<Event>, CodecError> {
    Ok(serde_json::from_slice(data)?)
}

/// Encode a search index
pub fn encode_index(index: &SearchIndex) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(index)?)
}

/// Decode a search index
pub fn decode_index(data: &[u8]) -> Result<SearchIndex, CodecError> {
    Ok(serde_json::from_slice(data)?)
}
