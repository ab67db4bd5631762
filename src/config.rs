//! Configuration module
//!
//! Host-supplied options for the analyzer. The engine is embedded, so the
//! host constructs this directly rather than reading an environment.

use std::fmt;
use std::sync::Arc;

use crate::search::KeywordExtractor;

/// Severity passed to the optional log sink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Host log sink receiving engine diagnostics
pub type LogSink = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Analyzer configuration
#[derive(Clone, Default)]
pub struct AnalyzerConfig {
    /// Stamped on events created via the client
    pub user_identifier: String,

    /// Build and maintain the keyword search index
    pub create_search_index: bool,

    /// Custom keyword extractor; the default extracts all text payload
    /// values
    pub get_search_keywords: Option<KeywordExtractor>,

    /// Optional log sink; engine diagnostics also go to `tracing`
    pub log: Option<LogSink>,
}

impl AnalyzerConfig {
    pub fn new(user_identifier: impl Into<String>) -> Self {
        Self {
            user_identifier: user_identifier.into(),
            ..Self::default()
        }
    }

    pub fn with_search_index(mut self, create_search_index: bool) -> Self {
        self.create_search_index = create_search_index;
        self
    }

    pub fn with_keyword_extractor(
        mut self,
        extractor: impl Fn(&crate::domain::Event, &mut std::collections::BTreeSet<String>)
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.get_search_keywords = Some(Arc::new(extractor));
        self
    }

    pub fn with_log(mut self, sink: impl Fn(LogLevel, &str) + Send + Sync + 'static) -> Self {
        self.log = Some(Arc::new(sink));
        self
    }

    /// Emit a diagnostic through `tracing` and the configured sink
    pub(crate) fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warning => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
        if let Some(sink) = &self.log {
            sink(level, message);
        }
    }
}

impl fmt::Debug for AnalyzerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnalyzerConfig")
            .field("user_identifier", &self.user_identifier)
            .field("create_search_index", &self.create_search_index)
            .field(
                "get_search_keywords",
                &self.get_search_keywords.as_ref().map(|_| "<extractor>"),
            )
            .field("log", &self.log.as_ref().map(|_| "<sink>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn builder_methods_compose() {
        let config = AnalyzerConfig::new("user-1").with_search_index(true);
        assert_eq!(config.user_identifier, "user-1");
        assert!(config.create_search_index);
        assert!(config.get_search_keywords.is_none());
    }

    #[test]
    fn log_sink_receives_diagnostics() {
        let seen: Arc<Mutex<Vec<(LogLevel, String)>>> = Arc::default();
        let sink_seen = seen.clone();
        let config = AnalyzerConfig::new("user-1").with_log(move |level, message| {
            sink_seen
                .lock()
                .unwrap()
                .push((level, message.to_string()));
        });

        config.log(LogLevel::Debug, "probing cache");
        let entries = seen.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], (LogLevel::Debug, "probing cache".to_string()));
    }
}
