//! Analyzer builder
//!
//! Collects categories, columns and aggregator factories, validates the
//! schema, composes the final category values and constructs an initialized
//! analyzer.

use std::sync::Arc;

use crate::aggregator::Aggregator;
use crate::analyzer::registry::AggregatorRegistry;
use crate::analyzer::Analyzer;
use crate::calendar::DateInterval;
use crate::clock::{Clock, SystemClock};
use crate::config::AnalyzerConfig;
use crate::domain::{AggregatorSpec, EventCategory, EventColumn, RESERVED_COLUMN};
use crate::error::{AnalyzerError, AnalyzerResult};
use crate::store::{AnalyzerDelegate, EventBackend};

/// Column under construction
#[derive(Debug)]
pub struct ColumnSpec {
    name: String,
    aggregators: Vec<AggregatorSpec>,
}

impl ColumnSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aggregators: Vec::new(),
        }
    }

    pub fn with_aggregator(
        self,
        id: impl Into<String>,
        factory: impl Fn() -> Box<dyn Aggregator> + Send + Sync + 'static,
    ) -> Self {
        self.with_spec(AggregatorSpec::new(id, factory))
    }

    /// Register an aggregator that only lives in state buckets covering
    /// exactly `interval`
    pub fn with_pinned_aggregator(
        self,
        id: impl Into<String>,
        interval: DateInterval,
        factory: impl Fn() -> Box<dyn Aggregator> + Send + Sync + 'static,
    ) -> Self {
        self.with_spec(AggregatorSpec::new(id, factory).pinned_to(interval))
    }

    pub fn with_spec(mut self, spec: AggregatorSpec) -> Self {
        self.aggregators.push(spec);
        self
    }
}

/// Category under construction
#[derive(Debug)]
pub struct CategorySpec {
    name: String,
    columns: Vec<ColumnSpec>,
    aggregators: Vec<AggregatorSpec>,
}

impl CategorySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            aggregators: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    /// Register a category-level aggregator; it rides on the synthetic
    /// `"id"` column and sees every event of the category
    pub fn with_aggregator(
        mut self,
        id: impl Into<String>,
        factory: impl Fn() -> Box<dyn Aggregator> + Send + Sync + 'static,
    ) -> Self {
        self.aggregators.push(AggregatorSpec::new(id, factory));
        self
    }
}

/// Configures and constructs an [`Analyzer`]
pub struct AnalyzerBuilder {
    config: AnalyzerConfig,
    clock: Arc<dyn Clock>,
    backend: Option<Arc<dyn EventBackend>>,
    delegate: Option<Arc<dyn AnalyzerDelegate>>,
    categories: Vec<CategorySpec>,
    all_event_aggregators: Vec<AggregatorSpec>,
}

impl AnalyzerBuilder {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            backend: None,
            delegate: None,
            categories: Vec::new(),
            all_event_aggregators: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_backend(mut self, backend: Arc<dyn EventBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn with_delegate(mut self, delegate: Arc<dyn AnalyzerDelegate>) -> Self {
        self.delegate = Some(delegate);
        self
    }

    pub fn register_category(mut self, category: CategorySpec) -> Self {
        self.categories.push(category);
        self
    }

    /// Register an aggregator that sees every event regardless of category
    pub fn register_all_events_aggregator(
        mut self,
        id: impl Into<String>,
        factory: impl Fn() -> Box<dyn Aggregator> + Send + Sync + 'static,
    ) -> Self {
        self.all_event_aggregators
            .push(AggregatorSpec::new(id, factory));
        self
    }

    pub fn register_all_events_spec(mut self, spec: AggregatorSpec) -> Self {
        self.all_event_aggregators.push(spec);
        self
    }

    /// Validate the schema, compose categories, construct the analyzer and
    /// run its initialization sequence
    pub async fn build(self) -> AnalyzerResult<Analyzer> {
        let backend = self.backend.ok_or(AnalyzerError::MissingBackend)?;
        let delegate = self.delegate.ok_or(AnalyzerError::MissingDelegate)?;

        let mut categories = Vec::with_capacity(self.categories.len());
        for spec in self.categories {
            let mut category = EventCategory::new(spec.name.clone());
            for column in spec.columns {
                if column.name == RESERVED_COLUMN {
                    return Err(AnalyzerError::ReservedColumnName(column.name));
                }
                let mut composed = EventColumn::new(column.name, Some(spec.name.clone()));
                composed.aggregators = column.aggregators;
                category.columns.push(composed);
            }
            // The synthetic "id" column carries the category-level specs.
            let mut id_column = EventColumn::new(RESERVED_COLUMN, Some(spec.name.clone()));
            id_column.aggregators = spec.aggregators;
            category.columns.push(id_column);
            categories.push(category);
        }

        let registry = AggregatorRegistry::from_categories(&categories, &self.all_event_aggregators);
        let mut analyzer = Analyzer::new(
            self.config,
            self.clock,
            backend,
            delegate,
            categories,
            registry,
        );
        analyzer.init().await?;
        Ok(analyzer)
    }
}
