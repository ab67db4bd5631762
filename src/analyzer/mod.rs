//! Analyzer module
//!
//! The stateful orchestrator. It partitions time into normalized and ad-hoc
//! intervals, materializes aggregator snapshots for queried intervals,
//! persists interval states through the delegate so restarts avoid full
//! reprocessing, back-fills newly registered aggregators from event
//! history, maintains the keyword search index and reconciles the local
//! event cache with the backend on every reload.

pub mod builder;
pub mod registry;
pub mod status;

pub use builder::{AnalyzerBuilder, CategorySpec, ColumnSpec};
pub use status::{AnalyzerStatus, EventSource};

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use chrono::Duration;
use uuid::Uuid;

use crate::aggregator::Aggregator;
use crate::calendar::{self, DateInterval};
use crate::client::EventClient;
use crate::clock::Clock;
use crate::config::{AnalyzerConfig, LogLevel};
use crate::domain::{Event, EventCategory};
use crate::error::{AnalyzerError, AnalyzerResult, CodecError};
use crate::search::{EventList, SearchIndex};
use crate::state::{codec, keys, IntervalState};
use crate::store::{AnalyzerDelegate, BackendLoadStatus, EventBackend};

use registry::AggregatorRegistry;

/// The event-analytics orchestrator.
///
/// All operations are suspendable but run on one logical task; internal
/// state is never mutated concurrently, so no locks guard it.
pub struct Analyzer {
    config: AnalyzerConfig,
    clock: Arc<dyn Clock>,
    backend: Arc<dyn EventBackend>,
    delegate: Arc<dyn AnalyzerDelegate>,
    categories: Vec<EventCategory>,
    registry: AggregatorRegistry,

    /// State bucket of the current calendar month
    current: IntervalState,
    /// The all-time bucket
    accumulated: IntervalState,
    /// Loaded monthly buckets other than the current month
    historical: HashMap<DateInterval, IntervalState>,
    /// Memoized ad-hoc interval states; in-memory only
    non_normal_states: HashMap<DateInterval, IntervalState>,

    /// Span of event timestamps already folded into aggregators
    processed_event_interval: DateInterval,

    /// In-memory mirror of delegate-cached monthly event buckets
    event_buckets: HashMap<DateInterval, Vec<Event>>,
    /// In-memory mirror of per-bucket search indices
    bucket_indices: HashMap<DateInterval, SearchIndex>,
    all_time_index: Option<SearchIndex>,

    last_reported: AnalyzerStatus,
}

impl Analyzer {
    pub(crate) fn new(
        config: AnalyzerConfig,
        clock: Arc<dyn Clock>,
        backend: Arc<dyn EventBackend>,
        delegate: Arc<dyn AnalyzerDelegate>,
        categories: Vec<EventCategory>,
        registry: AggregatorRegistry,
    ) -> Self {
        let accumulated = IntervalState::new(calendar::all_time(), &registry);
        let current = IntervalState::new(calendar::month_containing(clock.now()), &registry);
        Self {
            config,
            clock,
            backend,
            delegate,
            categories,
            registry,
            current,
            accumulated,
            historical: HashMap::new(),
            non_normal_states: HashMap::new(),
            processed_event_interval: DateInterval::empty_at(calendar::all_time().start),
            event_buckets: HashMap::new(),
            bucket_indices: HashMap::new(),
            all_time_index: None,
            last_reported: AnalyzerStatus::Ready,
        }
    }

    /// The initialization sequence run by the builder: load the current and
    /// all-time buckets, reconcile cache and backend, back-fill new
    /// aggregators, then report `Ready`.
    pub(crate) async fn init(&mut self) -> AnalyzerResult<()> {
        self.report(AnalyzerStatus::Initializing).await;

        self.accumulated = self.load_or_create_state(calendar::all_time()).await?;
        let this_month = calendar::month_containing(self.clock.now());
        self.current = self.load_or_create_state(this_month).await?;
        self.ensure_current_state_validity();

        self.processed_event_interval = self.accumulated.processed_event_interval;
        if self.processed_event_interval.is_empty() {
            let now = self.clock.now();
            self.load_and_process_events(DateInterval::new(calendar::all_time().start, now))
                .await?;
        } else {
            self.check_for_new_aggregators().await?;
            self.load_new_events_internal().await?;
        }

        self.report(AnalyzerStatus::Ready).await;
        Ok(())
    }

    /// A submission client sharing this analyzer's backend, user identity
    /// and clock
    pub fn client(&self) -> EventClient {
        EventClient::new(
            self.backend.clone(),
            self.config.user_identifier.clone(),
            self.clock.clone(),
        )
    }

    pub fn categories(&self) -> &[EventCategory] {
        &self.categories
    }

    pub fn processed_event_interval(&self) -> DateInterval {
        self.processed_event_interval
    }

    /// The aggregator registered under `id`, materialized for `interval`.
    ///
    /// Normalized intervals resolve to their monthly or all-time state
    /// bucket, loading it through the delegate when necessary. Ad-hoc
    /// intervals materialize an ephemeral state from the event cache and
    /// are memoized for this analyzer's lifetime.
    pub async fn find_aggregator(
        &mut self,
        id: &str,
        interval: DateInterval,
    ) -> AnalyzerResult<Option<&dyn Aggregator>> {
        let state = self.resolve_state(interval).await?;
        Ok(state.aggregator(id))
    }

    /// All aggregators of `interval` registered under `category`
    pub async fn find_aggregators_for_category(
        &mut self,
        category: &str,
        interval: DateInterval,
    ) -> AnalyzerResult<Vec<(&str, &dyn Aggregator)>> {
        let ids: Vec<String> = self
            .registry
            .ids()
            .filter(|id| self.registry.is_registered_for_category(id, category))
            .map(String::from)
            .collect();
        let state = self.resolve_state(interval).await?;
        Ok(state
            .aggregators
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .map(|(id, aggregator)| (id.as_str(), aggregator.as_ref()))
            .collect())
    }

    /// Fetch and apply events newer than everything processed so far
    pub async fn load_new_events(&mut self) -> AnalyzerResult<()> {
        self.load_new_events_internal().await?;
        self.report(AnalyzerStatus::Ready).await;
        Ok(())
    }

    /// Events of `interval` from the processed history, with the search
    /// index reconstructed for the interval when enabled. `None` iff no
    /// monthly bucket produced any events.
    pub async fn load_events(
        &mut self,
        interval: DateInterval,
    ) -> AnalyzerResult<Option<EventList>> {
        let Some(events) = self.get_processed_events(interval).await? else {
            return Ok(None);
        };
        let index = if self.config.create_search_index {
            let ids: BTreeSet<Uuid> = events.iter().map(|event| event.id).collect();
            let mut combined = SearchIndex::new(interval);
            for month in calendar::months_covering(&interval) {
                let bucket_index = self.load_bucket_index(month).await?;
                combined.merge_filtered(&bucket_index, &ids);
            }
            Some(combined)
        } else {
            None
        };
        Ok(Some(EventList::new(interval, events, index)))
    }

    /// Delete every persisted interval state, clear in-memory state and
    /// rebuild from history. The event cache is kept; the reload is
    /// cache-first.
    pub async fn reset(&mut self) -> AnalyzerResult<()> {
        let mut stale_keys: BTreeSet<String> = BTreeSet::new();
        stale_keys.insert(keys::state_key(&calendar::all_time()));
        stale_keys.insert(keys::state_key(&self.current.interval));
        for interval in self.historical.keys() {
            stale_keys.insert(keys::state_key(interval));
        }
        if !self.processed_event_interval.is_empty() {
            for month in calendar::months_covering(&self.processed_event_interval) {
                stale_keys.insert(keys::state_key(&month));
            }
        }
        for key in stale_keys {
            self.delegate
                .persist(&key, None)
                .await
                .map_err(AnalyzerError::Delegate)?;
        }

        self.historical.clear();
        self.non_normal_states.clear();
        self.event_buckets.clear();
        self.bucket_indices.clear();
        self.all_time_index = None;
        self.accumulated = IntervalState::new(calendar::all_time(), &self.registry);
        let this_month = calendar::month_containing(self.clock.now());
        self.current = IntervalState::new(this_month, &self.registry);
        self.processed_event_interval = DateInterval::empty_at(calendar::all_time().start);

        let now = self.clock.now();
        self.load_and_process_events(DateInterval::new(calendar::all_time().start, now))
            .await?;
        self.report(AnalyzerStatus::Ready).await;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Interval-state resolution
    // ------------------------------------------------------------------

    async fn resolve_state(&mut self, interval: DateInterval) -> AnalyzerResult<&IntervalState> {
        if calendar::is_normalized(&interval) {
            if interval == calendar::all_time() {
                return Ok(&self.accumulated);
            }
            if interval == self.current.interval {
                return Ok(&self.current);
            }
            let state = match self.historical.remove(&interval) {
                Some(state) => state,
                None => self.load_or_create_state(interval).await?,
            };
            return Ok(self.historical.entry(interval).or_insert(state));
        }

        let state = match self.non_normal_states.remove(&interval) {
            Some(state) => state,
            None => self.materialize_ad_hoc_state(interval).await?,
        };
        Ok(self.non_normal_states.entry(interval).or_insert(state))
    }

    /// Feed an ephemeral state every cached event of the interval
    async fn materialize_ad_hoc_state(
        &mut self,
        interval: DateInterval,
    ) -> AnalyzerResult<IntervalState> {
        let events = self
            .get_processed_events(interval)
            .await?
            .unwrap_or_default();
        let mut state = IntervalState::new(interval, &self.registry);
        for event in &events {
            state.add_event(event, &self.registry);
        }
        Ok(state)
    }

    /// Load a persisted state bucket or create a fresh one. Undecodable or
    /// mismatching artifacts are treated as absent; the bucket is then
    /// re-derived from the event history.
    async fn load_or_create_state(&self, interval: DateInterval) -> AnalyzerResult<IntervalState> {
        let key = keys::state_key(&interval);
        match self
            .delegate
            .load(&key)
            .await
            .map_err(AnalyzerError::Delegate)?
        {
            Some(bytes) => {
                let decoded = codec::decode_state(&bytes, &self.registry).and_then(|state| {
                    if state.interval == interval {
                        Ok(state)
                    } else {
                        Err(CodecError::IntervalMismatch { key: key.clone() })
                    }
                });
                match decoded {
                    Ok(state) => Ok(state),
                    Err(err) => {
                        self.config.log(
                            LogLevel::Debug,
                            &format!("discarding undecodable state {key}: {err}"),
                        );
                        Ok(IntervalState::new(interval, &self.registry))
                    }
                }
            }
            None => Ok(IntervalState::new(interval, &self.registry)),
        }
    }

    /// Demote a stale current-month bucket to `historical` and start a
    /// fresh one for this month
    fn ensure_current_state_validity(&mut self) {
        let this_month = calendar::month_containing(self.clock.now());
        if self.current.interval != this_month {
            let fresh = IntervalState::new(this_month, &self.registry);
            let stale = std::mem::replace(&mut self.current, fresh);
            self.historical.insert(stale.interval, stale);
        }
    }

    // ------------------------------------------------------------------
    // Event processing pipeline
    // ------------------------------------------------------------------

    async fn load_new_events_internal(&mut self) -> AnalyzerResult<()> {
        let now = self.clock.now();
        if self.processed_event_interval.is_empty() {
            return self
                .load_and_process_events(DateInterval::new(calendar::all_time().start, now))
                .await;
        }
        if self.processed_event_interval.end >= now {
            return Ok(());
        }
        self.load_and_process_events(DateInterval::new(self.processed_event_interval.end, now))
            .await
    }

    /// Reconcile the event cache with the backend over `interval` and apply
    /// the merged batch. Ranges the cache already covers are not refetched;
    /// everything fetched is written back into the cache.
    async fn load_and_process_events(&mut self, interval: DateInterval) -> AnalyzerResult<()> {
        let mut events = self.load_cached_events(interval).await?;
        let first_cached = events.first().map(|event| event.timestamp);
        let last_cached = events.last().map(|event| event.timestamp);

        match (first_cached, last_cached) {
            (Some(first), Some(last)) => {
                let before_end = first - Duration::seconds(1);
                if interval.start <= before_end {
                    let before = self
                        .fetch_from_backend(DateInterval::new(interval.start, before_end))
                        .await?;
                    self.cache_events(&before).await?;
                    events.extend(before);
                }
                let after_start = last + Duration::seconds(1);
                if after_start <= interval.end {
                    let after = self
                        .fetch_from_backend(DateInterval::new(after_start, interval.end))
                        .await?;
                    self.cache_events(&after).await?;
                    events.extend(after);
                }
                events.sort_by_key(|event| event.timestamp);
            }
            _ => {
                let fetched = self.fetch_from_backend(interval).await?;
                self.cache_events(&fetched).await?;
                events = fetched;
            }
        }

        if events.is_empty() {
            return Ok(());
        }
        self.process_events(&events).await
    }

    /// Apply a batch, in input order, to the monthly, all-time and matching
    /// ad-hoc states. Events already inside the processed span are skipped;
    /// afterwards the span covers the batch and every modified bucket is
    /// persisted.
    async fn process_events(&mut self, batch: &[Event]) -> AnalyzerResult<()> {
        let now = self.clock.now();
        let total = batch.len();
        let mut modified_current = false;
        let mut modified_accumulated = false;
        let mut modified_months: BTreeSet<DateInterval> = BTreeSet::new();

        for (index, event) in batch.iter().enumerate() {
            assert!(
                event.timestamp <= now,
                "event {} is dated in the future",
                event.id
            );
            self.report(AnalyzerStatus::ProcessingEvents {
                progress: (index + 1) as f64 / total as f64,
                detail: None,
            })
            .await;

            if !self.processed_event_interval.is_empty()
                && self.processed_event_interval.contains(event.timestamp)
            {
                continue;
            }

            let month = calendar::month_containing(event.timestamp);
            if month == self.current.interval {
                self.current.add_event(event, &self.registry);
                modified_current = true;
            } else {
                if !self.historical.contains_key(&month) {
                    let state = self.load_or_create_state(month).await?;
                    self.historical.insert(month, state);
                }
                if let Some(state) = self.historical.get_mut(&month) {
                    state.add_event(event, &self.registry);
                }
                modified_months.insert(month);
            }

            self.accumulated.add_event(event, &self.registry);
            modified_accumulated = true;

            for state in self.non_normal_states.values_mut() {
                if state.interval.contains(event.timestamp) {
                    state.add_event(event, &self.registry);
                }
            }
        }

        if let (Some(first), Some(last)) = (batch.first(), batch.last()) {
            self.processed_event_interval = self
                .processed_event_interval
                .expanded_to_cover(first.timestamp)
                .expanded_to_cover(last.timestamp);
        }

        self.persist_modified_states(modified_current, modified_accumulated, &modified_months)
            .await
    }

    async fn persist_modified_states(
        &mut self,
        include_current: bool,
        include_accumulated: bool,
        months: &BTreeSet<DateInterval>,
    ) -> AnalyzerResult<()> {
        let mut artifacts: Vec<(String, Vec<u8>)> = Vec::new();
        if include_current {
            artifacts.push((
                keys::state_key(&self.current.interval),
                codec::encode_state(&self.current)?,
            ));
        }
        if include_accumulated {
            artifacts.push((
                keys::state_key(&self.accumulated.interval),
                codec::encode_state(&self.accumulated)?,
            ));
        }
        for month in months {
            if let Some(state) = self.historical.get(month) {
                artifacts.push((keys::state_key(month), codec::encode_state(state)?));
            }
        }

        let total = artifacts.len();
        for (index, (key, bytes)) in artifacts.into_iter().enumerate() {
            self.report(AnalyzerStatus::PersistingState {
                progress: (index + 1) as f64 / total as f64,
            })
            .await;
            self.delegate
                .persist(&key, Some(bytes))
                .await
                .map_err(AnalyzerError::Delegate)?;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Back-fill
    // ------------------------------------------------------------------

    /// Detect aggregators registered since the persisted states were
    /// written and feed them the cached history, bypassing the processed
    /// guard. Known aggregators never see an event twice.
    async fn check_for_new_aggregators(&mut self) -> AnalyzerResult<()> {
        let uninitialized = self.accumulated.uninitialized_aggregators();
        if uninitialized.is_empty() {
            return Ok(());
        }
        self.config.log(
            LogLevel::Debug,
            &format!("back-filling {} new aggregator(s)", uninitialized.len()),
        );

        let span = self.processed_event_interval;
        let events = self.get_processed_events(span).await?.unwrap_or_default();

        for event in &events {
            self.accumulated
                .backfill_event(event, &self.registry, &uninitialized);
        }
        self.accumulated.mark_known(&uninitialized);

        let mut by_month: BTreeMap<DateInterval, Vec<&Event>> = BTreeMap::new();
        for event in &events {
            by_month
                .entry(calendar::month_containing(event.timestamp))
                .or_default()
                .push(event);
        }

        let mut modified_current = false;
        let mut modified_months: BTreeSet<DateInterval> = BTreeSet::new();
        for (month, month_events) in by_month {
            if month == self.current.interval {
                let uninit = self.current.uninitialized_aggregators();
                if !uninit.is_empty() {
                    for event in month_events {
                        self.current.backfill_event(event, &self.registry, &uninit);
                    }
                    self.current.mark_known(&uninit);
                }
                modified_current = true;
            } else {
                if !self.historical.contains_key(&month) {
                    let state = self.load_or_create_state(month).await?;
                    self.historical.insert(month, state);
                }
                if let Some(state) = self.historical.get_mut(&month) {
                    let uninit = state.uninitialized_aggregators();
                    if !uninit.is_empty() {
                        for event in month_events {
                            state.backfill_event(event, &self.registry, &uninit);
                        }
                        state.mark_known(&uninit);
                    }
                }
                modified_months.insert(month);
            }
        }

        self.persist_modified_states(modified_current, true, &modified_months)
            .await
    }

    // ------------------------------------------------------------------
    // Event cache
    // ------------------------------------------------------------------

    /// Cached events of every monthly bucket touching `interval`, filtered
    /// and sorted
    async fn load_cached_events(&mut self, interval: DateInterval) -> AnalyzerResult<Vec<Event>> {
        let months = calendar::months_covering(&interval);
        let total = months.len();
        let mut events: Vec<Event> = Vec::new();
        for (index, month) in months.into_iter().enumerate() {
            self.report(AnalyzerStatus::DecodingEvents {
                progress: (index + 1) as f64 / total as f64,
                source: EventSource::Cache,
            })
            .await;
            events.extend(self.load_event_bucket(month).await?);
        }
        let mut events: Vec<Event> = events
            .into_iter()
            .filter(|event| interval.contains(event.timestamp))
            .collect();
        events.sort_by_key(|event| event.timestamp);
        Ok(events)
    }

    /// Walk monthly buckets backwards from the interval's end and union
    /// their cached events. `None` iff no bucket produced any events.
    async fn get_processed_events(
        &mut self,
        interval: DateInterval,
    ) -> AnalyzerResult<Option<Vec<Event>>> {
        let mut collected: Vec<Event> = Vec::new();
        let mut produced_any = false;
        let mut month = calendar::month_containing(interval.end);
        while month.end >= interval.start {
            let bucket = self.load_event_bucket(month).await?;
            if !bucket.is_empty() {
                produced_any = true;
            }
            collected.extend(bucket);
            if month.start <= calendar::all_time().start {
                break;
            }
            month = calendar::month_before(&month);
        }
        if !produced_any {
            return Ok(None);
        }
        let mut events: Vec<Event> = collected
            .into_iter()
            .filter(|event| interval.contains(event.timestamp))
            .collect();
        events.sort_by_key(|event| event.timestamp);
        Ok(Some(events))
    }

    async fn load_event_bucket(&mut self, month: DateInterval) -> AnalyzerResult<Vec<Event>> {
        if let Some(bucket) = self.event_buckets.get(&month) {
            return Ok(bucket.clone());
        }
        let key = keys::events_key(&month);
        let bucket = match self
            .delegate
            .load(&key)
            .await
            .map_err(AnalyzerError::Delegate)?
        {
            Some(bytes) => match codec::decode_events(&bytes) {
                Ok(events) => events,
                Err(err) => {
                    self.config.log(
                        LogLevel::Debug,
                        &format!("discarding undecodable event bucket {key}: {err}"),
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        self.event_buckets.insert(month, bucket.clone());
        Ok(bucket)
    }

    /// Persist fetched events into their monthly buckets, deduplicated by
    /// id, and keep the search indices in lockstep
    async fn cache_events(&mut self, events: &[Event]) -> AnalyzerResult<()> {
        if events.is_empty() {
            return Ok(());
        }
        let mut by_month: BTreeMap<DateInterval, Vec<Event>> = BTreeMap::new();
        for event in events {
            by_month
                .entry(calendar::month_containing(event.timestamp))
                .or_default()
                .push(event.clone());
        }

        let total = by_month.len();
        for (index, (month, new_events)) in by_month.into_iter().enumerate() {
            self.report(AnalyzerStatus::PersistingEvents {
                progress: (index + 1) as f64 / total as f64,
            })
            .await;

            let mut bucket = self.load_event_bucket(month).await?;
            let mut seen: BTreeSet<Uuid> = bucket.iter().map(|event| event.id).collect();
            let added: Vec<Event> = new_events
                .into_iter()
                .filter(|event| seen.insert(event.id))
                .collect();
            if added.is_empty() {
                continue;
            }
            bucket.extend(added.iter().cloned());
            bucket.sort_by_key(|event| event.timestamp);

            let bytes = codec::encode_events(&bucket)?;
            self.delegate
                .persist(&keys::events_key(&month), Some(bytes))
                .await
                .map_err(AnalyzerError::Delegate)?;
            self.event_buckets.insert(month, bucket);

            if self.config.create_search_index {
                self.index_events(month, &added).await?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Search index maintenance
    // ------------------------------------------------------------------

    async fn index_events(&mut self, month: DateInterval, added: &[Event]) -> AnalyzerResult<()> {
        let mut index = match self.bucket_indices.remove(&month) {
            Some(index) => index,
            None => self.load_bucket_index(month).await?,
        };
        for event in added {
            index.add_event(event, self.config.get_search_keywords.as_ref());
        }
        let bytes = codec::encode_index(&index)?;
        self.delegate
            .persist(&keys::search_index_key(&month), Some(bytes))
            .await
            .map_err(AnalyzerError::Delegate)?;
        self.bucket_indices.insert(month, index);

        let mut all_time = match self.all_time_index.take() {
            Some(index) => index,
            None => self.load_all_time_index().await?,
        };
        for event in added {
            all_time.add_event(event, self.config.get_search_keywords.as_ref());
        }
        let bytes = codec::encode_index(&all_time)?;
        self.delegate
            .persist(keys::SEARCH_INDEX_KEY, Some(bytes))
            .await
            .map_err(AnalyzerError::Delegate)?;
        self.all_time_index = Some(all_time);
        Ok(())
    }

    async fn load_bucket_index(&mut self, month: DateInterval) -> AnalyzerResult<SearchIndex> {
        if let Some(index) = self.bucket_indices.get(&month) {
            return Ok(index.clone());
        }
        let index = self
            .load_index_under(&keys::search_index_key(&month), month)
            .await?;
        self.bucket_indices.insert(month, index.clone());
        Ok(index)
    }

    async fn load_all_time_index(&mut self) -> AnalyzerResult<SearchIndex> {
        if let Some(index) = &self.all_time_index {
            return Ok(index.clone());
        }
        let index = self
            .load_index_under(keys::SEARCH_INDEX_KEY, calendar::all_time())
            .await?;
        self.all_time_index = Some(index.clone());
        Ok(index)
    }

    async fn load_index_under(
        &self,
        key: &str,
        interval: DateInterval,
    ) -> AnalyzerResult<SearchIndex> {
        match self
            .delegate
            .load(key)
            .await
            .map_err(AnalyzerError::Delegate)?
        {
            Some(bytes) => match codec::decode_index(&bytes) {
                Ok(index) => Ok(index),
                Err(err) => {
                    self.config.log(
                        LogLevel::Debug,
                        &format!("discarding undecodable search index {key}: {err}"),
                    );
                    Ok(SearchIndex::new(interval))
                }
            },
            None => Ok(SearchIndex::new(interval)),
        }
    }

    // ------------------------------------------------------------------
    // Backend access and status
    // ------------------------------------------------------------------

    async fn fetch_from_backend(&mut self, interval: DateInterval) -> AnalyzerResult<Vec<Event>> {
        let mut notes: Vec<BackendLoadStatus> = Vec::new();
        let events = self
            .backend
            .load_events(interval, &mut |note| notes.push(note))
            .await
            .map_err(AnalyzerError::Backend)?;

        for note in notes {
            let status = match note {
                BackendLoadStatus::FetchedRecords(count) => AnalyzerStatus::FetchingEvents {
                    count,
                    source: EventSource::Backend,
                },
                BackendLoadStatus::ProcessingRecords(progress) => AnalyzerStatus::DecodingEvents {
                    progress,
                    source: EventSource::Backend,
                },
                BackendLoadStatus::Ready => continue,
            };
            self.report(status).await;
        }
        Ok(events)
    }

    /// Notify the delegate iff the transition passes the significance
    /// filter
    async fn report(&mut self, status: AnalyzerStatus) {
        if !status.is_significant_change(&self.last_reported) {
            return;
        }
        self.last_reported = status.clone();
        self.delegate.status_changed(status).await;
    }
}
