//! Evidence collection: the seam to web-search backends and the adapter
//! that turns their heterogeneous results into [`EvidenceRecord`]s.
//!
//! The adapter never fails. Fixture triggers are answered from the
//! [`FixtureTable`] without I/O; live backend errors and timeouts are logged
//! and surface as an empty [`EvidenceSet`].

use crate::config::SearchConfig;
use crate::error::ProviderError;
use crate::fixtures::FixtureTable;
use crate::types::{EvidenceRecord, EvidenceSet};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Placeholder used when a result item has no title.
pub const MISSING_TITLE: &str = "No Title";
/// Placeholder used when a result item has no snippet.
pub const MISSING_SNIPPET: &str = "No Description";
/// Placeholder used when a result item has no link.
pub const MISSING_LINK: &str = "#";

/// Hard upper bound on the result count requested from any backend.
pub const MAX_RESULTS_CAP: usize = 25;

const TITLE_KEYS: &[&str] = &["title", "Title", "heading"];
const SNIPPET_KEYS: &[&str] = &["snippet", "body", "description", "Text"];
const LINK_KEYS: &[&str] = &["link", "href", "url", "FirstURL"];

/// A live web-search backend.
///
/// Backends return raw result items as JSON objects in relevance order. Item
/// shapes differ between backends; normalization happens in
/// [`EvidenceProvider`].
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Short identifier used in logs and errors.
    fn name(&self) -> &str;

    /// Run `query`, returning at most `max_results` raw items.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<Value>, ProviderError>;
}

/// Map one raw result item to an [`EvidenceRecord`], substituting the fixed
/// placeholders for any missing or blank field.
pub fn normalize_hit(item: &Value) -> EvidenceRecord {
    EvidenceRecord::new(
        first_text(item, TITLE_KEYS).unwrap_or(MISSING_TITLE),
        first_text(item, SNIPPET_KEYS).unwrap_or(MISSING_SNIPPET),
        first_text(item, LINK_KEYS).unwrap_or(MISSING_LINK),
    )
}

fn first_text<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| item.get(*k).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// The evidence provider adapter.
pub struct EvidenceProvider {
    backend: Arc<dyn SearchBackend>,
    fixtures: FixtureTable,
    timeout: Duration,
}

impl EvidenceProvider {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self {
            backend,
            fixtures: FixtureTable::seeded(),
            timeout: Duration::from_secs(15),
        }
    }

    pub fn from_config(backend: Arc<dyn SearchBackend>, config: &SearchConfig) -> Self {
        let fixtures = if config.fixtures {
            FixtureTable::seeded()
        } else {
            FixtureTable::empty()
        };
        Self::new(backend)
            .with_fixtures(fixtures)
            .with_timeout(config.timeout())
    }

    pub fn with_fixtures(mut self, fixtures: FixtureTable) -> Self {
        self.fixtures = fixtures;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Collect evidence for `query`. Never fails: backend errors yield an
    /// empty set.
    pub async fn search(&self, query: &str, max_results: usize) -> EvidenceSet {
        if let Some(records) = self.fixtures.lookup(query) {
            info!(
                records = records.len(),
                "Fixture trigger matched, skipping live search"
            );
            return records;
        }

        match self.search_live(query, max_results).await {
            Ok(records) => records,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "Search failed, treating as no results");
                Vec::new()
            }
        }
    }

    /// The live path with its error intact.
    pub async fn search_live(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<EvidenceSet, ProviderError> {
        let bound = max_results.clamp(1, MAX_RESULTS_CAP);
        debug!(backend = self.backend.name(), max_results = bound, "Running live search");

        let items = tokio::time::timeout(self.timeout, self.backend.search(query, bound))
            .await
            .map_err(|_| ProviderError::Timeout {
                backend: self.backend.name().to_string(),
                timeout_secs: self.timeout.as_secs(),
            })??;

        let records: EvidenceSet = items.iter().take(bound).map(normalize_hit).collect();
        info!(
            backend = self.backend.name(),
            records = records.len(),
            "Live search complete"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Backend returning a fixed payload and counting calls.
    struct StaticBackend {
        result: fn() -> Result<Vec<Value>, ProviderError>,
        calls: AtomicUsize,
        last_bound: AtomicUsize,
    }

    impl StaticBackend {
        fn new(result: fn() -> Result<Vec<Value>, ProviderError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                calls: AtomicUsize::new(0),
                last_bound: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl SearchBackend for StaticBackend {
        fn name(&self) -> &str {
            "static"
        }

        async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<Value>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.last_bound.store(max_results, Ordering::SeqCst);
            (self.result)()
        }
    }

    struct SlowBackend;

    #[async_trait]
    impl SearchBackend for SlowBackend {
        fn name(&self) -> &str {
            "slow"
        }

        async fn search(&self, _query: &str, _max: usize) -> Result<Vec<Value>, ProviderError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(vec![json!({"title": "late"})])
        }
    }

    #[test]
    fn test_normalize_full_item() {
        let record = normalize_hit(&json!({
            "title": "Jane Doe - Profile",
            "snippet": "Engineer in Pune",
            "link": "https://example.org/jane"
        }));
        assert_eq!(record.title(), "Jane Doe - Profile");
        assert_eq!(record.snippet(), "Engineer in Pune");
        assert_eq!(record.source_link(), "https://example.org/jane");
    }

    #[test]
    fn test_normalize_alternate_shape() {
        let record = normalize_hit(&json!({
            "title": "Result",
            "body": "Body text",
            "href": "https://example.org"
        }));
        assert_eq!(record.snippet(), "Body text");
        assert_eq!(record.source_link(), "https://example.org");
    }

    #[test]
    fn test_normalize_substitutes_placeholders() {
        let record = normalize_hit(&json!({}));
        assert_eq!(record.title(), MISSING_TITLE);
        assert_eq!(record.snippet(), MISSING_SNIPPET);
        assert_eq!(record.source_link(), MISSING_LINK);

        let record = normalize_hit(&json!({"title": "   ", "body": null, "href": 42}));
        assert_eq!(record.title(), "No Title");
        assert_eq!(record.snippet(), "No Description");
        assert_eq!(record.source_link(), "#");
    }

    #[tokio::test]
    async fn test_fixture_trigger_skips_backend() {
        let backend = StaticBackend::new(|| Ok(vec![json!({"title": "live"})]));
        let provider = EvidenceProvider::new(backend.clone());

        let records = provider.search("demo test", 10).await;
        assert_eq!(records.len(), 4);
        let again = provider.search("DEMO test", 10).await;
        assert_eq!(records, again);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_disabled_fixtures_go_live() {
        let backend = StaticBackend::new(|| Ok(vec![json!({"title": "live"})]));
        let config = SearchConfig {
            fixtures: false,
            ..Default::default()
        };
        let provider = EvidenceProvider::from_config(backend.clone(), &config);

        let records = provider.search("demo test", 10).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title(), "live");
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_live_results_keep_order_and_bound() {
        let backend = StaticBackend::new(|| {
            Ok((0..8)
                .map(|i| json!({"title": format!("r{}", i), "snippet": "s", "link": "l"}))
                .collect())
        });
        let provider = EvidenceProvider::new(backend.clone());

        let records = provider.search("zzz_no_such_person_qxy", 3).await;
        let titles: Vec<&str> = records.iter().map(|r| r.title()).collect();
        assert_eq!(titles, vec!["r0", "r1", "r2"]);
        assert_eq!(backend.last_bound.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_result_bound_is_clamped() {
        let backend = StaticBackend::new(|| Ok(Vec::new()));
        let provider = EvidenceProvider::new(backend.clone());

        provider.search("someone", 0).await;
        assert_eq!(backend.last_bound.load(Ordering::SeqCst), 1);
        provider.search("someone", 500).await;
        assert_eq!(backend.last_bound.load(Ordering::SeqCst), MAX_RESULTS_CAP);
    }

    #[tokio::test]
    async fn test_backend_error_becomes_empty_set() {
        let backend = StaticBackend::new(|| {
            Err(ProviderError::Connection {
                backend: "static".into(),
                message: "dns failure".into(),
            })
        });
        let provider = EvidenceProvider::new(backend);

        assert!(provider.search("someone", 10).await.is_empty());
        assert!(matches!(
            provider.search_live("someone", 10).await,
            Err(ProviderError::Connection { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_becomes_empty_set() {
        let provider =
            EvidenceProvider::new(Arc::new(SlowBackend)).with_timeout(Duration::from_millis(50));

        assert!(provider.search("someone", 10).await.is_empty());
        assert!(matches!(
            provider.search_live("someone", 10).await,
            Err(ProviderError::Timeout { .. })
        ));
    }
}
