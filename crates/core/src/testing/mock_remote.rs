//! Mock remote search backend for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::catalog::CatalogEntity;
use crate::remote::{RawResult, RemoteSearchClient, RemoteSearchError, RemoteSearchResponse};

/// A recorded search for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedSearch {
    /// The term that was searched.
    pub term: String,
    /// When the search was made.
    pub timestamp: Instant,
}

/// A query handler that produces results dynamically based on the term.
type QueryHandler = Box<dyn Fn(&str) -> Option<Vec<RawResult>> + Send + Sync>;

/// Mock implementation of the RemoteSearchClient trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable search results
/// - Track searched terms and container fetches for assertions
/// - Simulate failures and per-term latency
///
/// # Example
///
/// ```rust,ignore
/// use albumfinder_core::testing::{MockRemoteSearch, fixtures};
///
/// let remote = MockRemoteSearch::new();
/// remote.set_results(vec![fixtures::remote_album("A1")]).await;
/// remote.set_delay_for("moon", Duration::from_millis(500)).await;
///
/// let response = remote.search("moon").await?;
/// assert_eq!(response.results.len(), 1);
/// assert_eq!(remote.searched_terms().await, vec!["moon"]);
/// ```
pub struct MockRemoteSearch {
    /// Configured results to return.
    results: Arc<RwLock<Vec<RawResult>>>,
    /// Recorded searches.
    searches: Arc<RwLock<Vec<RecordedSearch>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<RemoteSearchError>>>,
    /// Simulated latency per term.
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// Query handler for dynamic result generation based on the term.
    query_handler: Arc<RwLock<Option<QueryHandler>>>,
    /// Containers served by `fetch_containers`.
    containers: Arc<RwLock<HashMap<String, CatalogEntity>>>,
    /// Recorded `fetch_containers` calls.
    fetches: Arc<RwLock<Vec<Vec<String>>>>,
    /// If set, the next container fetch will fail with this error.
    fetch_error: Arc<RwLock<Option<RemoteSearchError>>>,
}

impl std::fmt::Debug for MockRemoteSearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockRemoteSearch")
            .field("results", &"<results>")
            .field("searches", &"<searches>")
            .field("next_error", &"<next_error>")
            .field("delays", &"<delays>")
            .field("query_handler", &"<handler>")
            .field("containers", &"<containers>")
            .finish()
    }
}

impl Default for MockRemoteSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRemoteSearch {
    /// Create a new mock with empty results.
    pub fn new() -> Self {
        Self {
            results: Arc::new(RwLock::new(Vec::new())),
            searches: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            delays: Arc::new(RwLock::new(HashMap::new())),
            query_handler: Arc::new(RwLock::new(None)),
            containers: Arc::new(RwLock::new(HashMap::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
            fetch_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Set the results to return for subsequent searches.
    pub async fn set_results(&self, results: Vec<RawResult>) {
        *self.results.write().await = results;
    }

    /// Get recorded searches.
    pub async fn recorded_searches(&self) -> Vec<RecordedSearch> {
        self.searches.read().await.clone()
    }

    /// Get the searched terms in call order.
    pub async fn searched_terms(&self) -> Vec<String> {
        self.searches
            .read()
            .await
            .iter()
            .map(|s| s.term.clone())
            .collect()
    }

    /// Get the number of searches performed.
    pub async fn search_count(&self) -> usize {
        self.searches.read().await.len()
    }

    /// Configure the next search to fail with the given error.
    pub async fn set_next_error(&self, error: RemoteSearchError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay responses for `term` by `delay`.
    pub async fn set_delay_for(&self, term: &str, delay: Duration) {
        self.delays.write().await.insert(term.to_string(), delay);
    }

    /// Set a query handler that dynamically generates results based on the term.
    ///
    /// Returning `None` falls back to the configured results.
    pub async fn set_query_handler<F>(&self, handler: F)
    where
        F: Fn(&str) -> Option<Vec<RawResult>> + Send + Sync + 'static,
    {
        *self.query_handler.write().await = Some(Box::new(handler));
    }

    /// Make a container available to `fetch_containers`.
    pub async fn add_container(&self, container: CatalogEntity) {
        self.containers
            .write()
            .await
            .insert(container.id.clone(), container);
    }

    /// Get the id lists passed to `fetch_containers`.
    pub async fn recorded_fetches(&self) -> Vec<Vec<String>> {
        self.fetches.read().await.clone()
    }

    /// Configure the next container fetch to fail with the given error.
    pub async fn set_fetch_error(&self, error: RemoteSearchError) {
        *self.fetch_error.write().await = Some(error);
    }
}

#[async_trait]
impl RemoteSearchClient for MockRemoteSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, term: &str) -> Result<RemoteSearchResponse, RemoteSearchError> {
        self.searches.write().await.push(RecordedSearch {
            term: term.to_string(),
            timestamp: Instant::now(),
        });

        let delay = self.delays.read().await.get(term).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        let handler = self.query_handler.read().await;
        if let Some(ref h) = *handler {
            if let Some(results) = h(term) {
                return Ok(RemoteSearchResponse {
                    results,
                    duration_ms: 20,
                });
            }
        }
        drop(handler);

        Ok(RemoteSearchResponse {
            results: self.results.read().await.clone(),
            duration_ms: 20, // Simulated fast search
        })
    }

    async fn fetch_containers(
        &self,
        ids: &[String],
    ) -> Result<Vec<CatalogEntity>, RemoteSearchError> {
        self.fetches.write().await.push(ids.to_vec());

        if let Some(err) = self.fetch_error.write().await.take() {
            return Err(err);
        }

        let containers = self.containers.read().await;
        Ok(ids.iter().filter_map(|id| containers.get(id).cloned()).collect())
    }
}
