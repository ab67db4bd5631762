//! Common test utilities

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use uuid::Uuid;

use keystone::aggregator::{
    CountingAggregator, CountingByDateAggregator, CountingByGroupAggregator, DateScope,
    NumericStatsAggregator,
};
use keystone::calendar::DateInterval;
use keystone::store::{MemoryBackend, MemoryDelegate};
use keystone::{
    Analyzer, AnalyzerBuilder, AnalyzerConfig, CategorySpec, ColumnSpec, Event, EventValue,
    FixedClock,
};

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .unwrap()
}

/// `count` events spread uniformly over `[start, end)`, alternating between
/// the `numericEvent` and `textEvent` categories. Ids are deterministic so
/// reloads and cache merges deduplicate the same way on every run.
pub fn uniform_events(count: usize, start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Event> {
    let span = (end - start).num_seconds();
    (0..count)
        .map(|i| {
            let timestamp = start + Duration::seconds(i as i64 * span / count as i64);
            let mut data = BTreeMap::new();
            let category = if i % 2 == 0 {
                data.insert("numericValueA".to_string(), EventValue::Number(i as f64));
                data.insert(
                    "numericValueB".to_string(),
                    EventValue::Number((i % 10) as f64),
                );
                "numericEvent"
            } else {
                data.insert(
                    "textValueA".to_string(),
                    EventValue::Text(format!("group-{}", i % 3)),
                );
                data.insert(
                    "textValueB".to_string(),
                    EventValue::Text(format!("entry {i}")),
                );
                "textEvent"
            };
            Event::new(
                Uuid::from_u128(i as u128 + 1),
                format!("user-{}", i % 5),
                category,
                timestamp,
                data,
            )
        })
        .collect()
}

/// The standard registration set used across the integration suites
pub fn standard_builder(
    backend: Arc<MemoryBackend>,
    delegate: Arc<MemoryDelegate>,
    clock: Arc<FixedClock>,
) -> AnalyzerBuilder {
    AnalyzerBuilder::new(AnalyzerConfig::new("test-user"))
        .with_backend(backend)
        .with_delegate(delegate)
        .with_clock(clock)
        .register_all_events_aggregator("All Event Count", || Box::new(CountingAggregator::new()))
        .register_category(
            CategorySpec::new("numericEvent")
                .with_aggregator("numericEvent Count", || Box::new(CountingAggregator::new()))
                .with_column(ColumnSpec::new("numericValueA").with_aggregator(
                    "numericValueA Stats",
                    || Box::new(NumericStatsAggregator::new()),
                ))
                .with_column(ColumnSpec::new("numericValueB").with_aggregator(
                    "numericValueB Stats",
                    || Box::new(NumericStatsAggregator::new()),
                )),
        )
        .register_category(
            CategorySpec::new("textEvent")
                .with_aggregator("textEvent Count", || Box::new(CountingAggregator::new()))
                .with_column(ColumnSpec::new("textValueA").with_aggregator(
                    "textValueA Count By Group",
                    || Box::new(CountingByGroupAggregator::new()),
                ))
                .with_column(ColumnSpec::new("textValueB").with_aggregator(
                    "textValueB Count By Date",
                    || Box::new(CountingByDateAggregator::new(DateScope::Day)),
                )),
        )
}

pub async fn build_analyzer(
    backend: Arc<MemoryBackend>,
    delegate: Arc<MemoryDelegate>,
    clock: Arc<FixedClock>,
) -> Analyzer {
    standard_builder(backend, delegate, clock)
        .build()
        .await
        .expect("analyzer build failed")
}

/// Terminal counter value of the aggregator `id` over `interval`; zero when
/// the aggregator is absent
pub async fn counting_value(analyzer: &mut Analyzer, id: &str, interval: DateInterval) -> u64 {
    analyzer
        .find_aggregator(id, interval)
        .await
        .expect("aggregator query failed")
        .and_then(|aggregator| aggregator.downcast_final::<CountingAggregator>())
        .map(|counter| counter.value_count)
        .unwrap_or(0)
}
