//! Integration tests for the keyword search index.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use keystone::aggregator::CountingAggregator;
use keystone::calendar::{month_containing, DateInterval};
use keystone::store::{MemoryBackend, MemoryDelegate};
use keystone::{
    Analyzer, AnalyzerBuilder, AnalyzerConfig, CategorySpec, ColumnSpec, Event, EventValue,
    FixedClock,
};
use uuid::Uuid;

fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .unwrap()
}

const FIXTURE_TEXTS: [&str; 8] = [
    "A quick brown dog",
    "the lazy fox",
    "jumps over the fence",
    "hello world",
    "salt and pepper",
    "something else",
    "numbers 2.5 here",
    "bread and butter costs 1.10",
];

fn fixture_events() -> Vec<Event> {
    FIXTURE_TEXTS
        .iter()
        .enumerate()
        .map(|(index, text)| {
            let mut data = BTreeMap::new();
            data.insert("text".to_string(), EventValue::Text(text.to_string()));
            Event::new(
                Uuid::from_u128(index as u128 + 1),
                "user-1",
                "textEvent",
                at(2023, 1, index as u32 + 2, 12, 0, 0),
                data,
            )
        })
        .collect()
}

async fn searchable_analyzer(backend: Arc<MemoryBackend>, delegate: Arc<MemoryDelegate>) -> Analyzer {
    AnalyzerBuilder::new(AnalyzerConfig::new("test-user").with_search_index(true))
        .with_backend(backend)
        .with_delegate(delegate)
        .with_clock(Arc::new(FixedClock::new(at(2023, 1, 14, 23, 59, 59))))
        .register_category(
            CategorySpec::new("textEvent")
                .with_aggregator("textEvent Count", || Box::new(CountingAggregator::new()))
                .with_column(ColumnSpec::new("text")),
        )
        .build()
        .await
        .expect("analyzer build failed")
}

fn matched_ids(list: &keystone::EventList, query: &str) -> BTreeSet<u128> {
    list.matching(query)
        .iter()
        .map(|event| event.id.as_u128())
        .collect()
}

#[tokio::test]
async fn fixture_queries_match_the_expected_ids() {
    let backend = Arc::new(MemoryBackend::new());
    let delegate = Arc::new(MemoryDelegate::new());
    backend.seed(fixture_events());
    let mut analyzer = searchable_analyzer(backend, delegate).await;

    let january = month_containing(at(2023, 1, 5, 0, 0, 0));
    let list = analyzer.load_events(january).await.unwrap().unwrap();
    assert_eq!(list.len(), 8);
    assert!(list.index.is_some());

    assert_eq!(matched_ids(&list, "fox"), BTreeSet::from([2]));
    assert_eq!(matched_ids(&list, "jumps the"), BTreeSet::from([3]));
    assert_eq!(matched_ids(&list, "and"), BTreeSet::from([5, 8]));
    assert_eq!(matched_ids(&list, "1.10"), BTreeSet::from([8]));
    assert_eq!(
        matched_ids(&list, ""),
        BTreeSet::from([1, 2, 3, 4, 5, 6, 7, 8])
    );
    assert!(matched_ids(&list, "xxx").is_empty());
}

#[tokio::test]
async fn matches_survive_in_superset_lists() {
    let backend = Arc::new(MemoryBackend::new());
    let delegate = Arc::new(MemoryDelegate::new());
    backend.seed(fixture_events());
    let mut analyzer = searchable_analyzer(backend, delegate).await;

    // The narrow list contains only the "fox" event; the wide list all 8.
    let narrow = DateInterval::new(at(2023, 1, 3, 0, 0, 0), at(2023, 1, 3, 23, 59, 59));
    let narrow_list = analyzer.load_events(narrow).await.unwrap().unwrap();
    assert_eq!(matched_ids(&narrow_list, "fox"), BTreeSet::from([2]));

    let january = month_containing(at(2023, 1, 5, 0, 0, 0));
    let wide_list = analyzer.load_events(january).await.unwrap().unwrap();
    assert_eq!(matched_ids(&wide_list, "fox"), BTreeSet::from([2]));
}

#[tokio::test]
async fn bucket_indices_are_persisted_alongside_event_buckets() {
    let backend = Arc::new(MemoryBackend::new());
    let delegate = Arc::new(MemoryDelegate::new());
    backend.seed(fixture_events());
    let _analyzer = searchable_analyzer(backend, delegate.clone()).await;

    assert!(delegate.contains_key("events-20230101-20230131"));
    assert!(delegate.contains_key("keystone-search-index-20230101-20230131"));
    assert!(delegate.contains_key("keystone-search-index"));
}

#[tokio::test]
async fn index_survives_a_rebuild() {
    let backend = Arc::new(MemoryBackend::new());
    let delegate = Arc::new(MemoryDelegate::new());
    backend.seed(fixture_events());

    let first = searchable_analyzer(backend.clone(), delegate.clone()).await;
    drop(first);

    let mut second = searchable_analyzer(backend, delegate).await;
    let january = month_containing(at(2023, 1, 5, 0, 0, 0));
    let list = second.load_events(january).await.unwrap().unwrap();
    assert_eq!(matched_ids(&list, "and"), BTreeSet::from([5, 8]));
}

#[tokio::test]
async fn custom_extractors_drive_the_index() {
    let backend = Arc::new(MemoryBackend::new());
    let delegate = Arc::new(MemoryDelegate::new());
    backend.seed(fixture_events());

    let config = AnalyzerConfig::new("test-user")
        .with_search_index(true)
        .with_keyword_extractor(|event, keywords| {
            keywords.insert(format!("cat-{}", event.category));
        });
    let mut analyzer = AnalyzerBuilder::new(config)
        .with_backend(backend)
        .with_delegate(delegate)
        .with_clock(Arc::new(FixedClock::new(at(2023, 1, 14, 23, 59, 59))))
        .register_category(CategorySpec::new("textEvent").with_column(ColumnSpec::new("text")))
        .build()
        .await
        .expect("analyzer build failed");

    let january = month_containing(at(2023, 1, 5, 0, 0, 0));
    let list = analyzer.load_events(january).await.unwrap().unwrap();

    // Payload words are no longer indexed; the extractor's keywords are.
    assert!(matched_ids(&list, "fox").is_empty());
    assert_eq!(matched_ids(&list, "cat textevent").len(), 8);
}
