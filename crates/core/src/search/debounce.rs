//! Debounced remote search.
//!
//! [`DebouncedFetcher::schedule`] arms a timer. A later call before the timer
//! fires supersedes the earlier one, so a burst of query edits results in a
//! single remote request for the last query. Requests already sent are never
//! aborted; their responses carry the sequence number of the query they were
//! made for and the session decides whether they are still current.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::catalog::CatalogStore;
use crate::metrics;
use crate::remote::RemoteSearchClient;

use super::{merge_results, MergedResults, SearchResult};

/// Capacity of the fetch event channel.
const EVENT_BUFFER_SIZE: usize = 64;

/// Outcome of a scheduled remote search.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchEvent {
    /// The debounce window elapsed and the request was sent.
    Dispatched { seq: u64 },
    /// The remote search succeeded and was merged with the local results.
    Completed { seq: u64, results: MergedResults },
    /// The remote search failed.
    Failed { seq: u64, error: String },
}

impl FetchEvent {
    pub fn seq(&self) -> u64 {
        match self {
            Self::Dispatched { seq } | Self::Completed { seq, .. } | Self::Failed { seq, .. } => {
                *seq
            }
        }
    }
}

/// Wraps a [`RemoteSearchClient`] with a debounce window.
pub struct DebouncedFetcher {
    client: Arc<dyn RemoteSearchClient>,
    catalog: CatalogStore,
    window: Duration,
    generation: Arc<AtomicU64>,
    events: mpsc::Sender<FetchEvent>,
}

impl DebouncedFetcher {
    /// Create a fetcher. Events for every scheduled search are delivered on
    /// the returned receiver.
    pub fn new(
        client: Arc<dyn RemoteSearchClient>,
        catalog: CatalogStore,
        window: Duration,
    ) -> (Self, mpsc::Receiver<FetchEvent>) {
        let (events, rx) = mpsc::channel(EVENT_BUFFER_SIZE);
        let fetcher = Self {
            client,
            catalog,
            window,
            generation: Arc::new(AtomicU64::new(0)),
            events,
        };
        (fetcher, rx)
    }

    /// Schedule a remote search for `query`, superseding any search that has
    /// not fired yet.
    pub fn schedule(&self, seq: u64, query: &str, local: Vec<SearchResult>) {
        let token = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let client = Arc::clone(&self.client);
        let catalog = self.catalog.clone();
        let events = self.events.clone();
        let window = self.window;
        let query = query.to_string();

        tokio::spawn(async move {
            tokio::time::sleep(window).await;

            if generation.load(Ordering::SeqCst) != token {
                metrics::DEBOUNCE_SUPERSEDED.inc();
                debug!(seq, query = %query, "Remote search superseded");
                return;
            }

            let _ = events.send(FetchEvent::Dispatched { seq }).await;
            debug!(seq, query = %query, backend = client.name(), "Dispatching remote search");

            let start = Instant::now();
            let event = match client.search(&query).await {
                Ok(response) => {
                    metrics::REMOTE_REQUESTS.with_label_values(&["success"]).inc();
                    metrics::REMOTE_REQUEST_DURATION
                        .with_label_values(&[])
                        .observe(start.elapsed().as_secs_f64());
                    debug!(
                        seq,
                        duration_ms = response.duration_ms,
                        results = response.results.len(),
                        "Remote search returned"
                    );

                    let results = merge_results(&response.results, &local);
                    if generation.load(Ordering::SeqCst) == token {
                        fetch_missing_containers(client.as_ref(), &catalog, &results).await;
                    }
                    FetchEvent::Completed { seq, results }
                }
                Err(e) => {
                    metrics::REMOTE_REQUESTS.with_label_values(&["failure"]).inc();
                    warn!(seq, query = %query, error = %e, "Remote search failed");
                    FetchEvent::Failed {
                        seq,
                        error: e.to_string(),
                    }
                }
            };

            let _ = events.send(event).await;
        });
    }

    /// Cancel a search that has not fired yet. In-flight requests are left
    /// to complete.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Fetch containers referenced by remote results that the catalog does not
/// know yet and publish them into the catalog.
async fn fetch_missing_containers(
    client: &dyn RemoteSearchClient,
    catalog: &CatalogStore,
    results: &MergedResults,
) {
    let snapshot = catalog.current();
    let missing: Vec<String> = results
        .remote
        .iter()
        .map(|r| r.container_id())
        .filter(|id| !snapshot.contains(id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        return;
    }

    debug!(count = missing.len(), "Fetching missing containers");
    match client.fetch_containers(&missing).await {
        Ok(containers) if !containers.is_empty() => {
            catalog.extend(containers);
        }
        Ok(_) => {}
        Err(e) => {
            warn!(count = missing.len(), error = %e, "Failed to fetch missing containers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogEntity;
    use crate::remote::{RawResult, RemoteSearchError};
    use crate::testing::MockRemoteSearch;

    const WINDOW: Duration = Duration::from_millis(50);

    fn fetcher(mock: &Arc<MockRemoteSearch>) -> (DebouncedFetcher, mpsc::Receiver<FetchEvent>) {
        let catalog = CatalogStore::with_entities(vec![CatalogEntity::container("A1", "Moonlight")]);
        DebouncedFetcher::new(mock.clone(), catalog, WINDOW)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_window() {
        let mock = Arc::new(MockRemoteSearch::new());
        mock.set_results(vec![RawResult::container("A2")]).await;
        let (fetcher, mut rx) = fetcher(&mock);

        fetcher.schedule(1, "moon", vec![]);

        assert_eq!(rx.recv().await, Some(FetchEvent::Dispatched { seq: 1 }));
        match rx.recv().await {
            Some(FetchEvent::Completed { seq, results }) => {
                assert_eq!(seq, 1);
                assert_eq!(results.remote, vec![SearchResult::container("A2")]);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(mock.searched_terms().await, vec!["moon"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_sent_before_window() {
        let mock = Arc::new(MockRemoteSearch::new());
        let (fetcher, mut rx) = fetcher(&mock);

        fetcher.schedule(1, "moon", vec![]);
        tokio::time::sleep(Duration::from_millis(49)).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(mock.search_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_collapses_to_latest() {
        let mock = Arc::new(MockRemoteSearch::new());
        let (fetcher, mut rx) = fetcher(&mock);

        fetcher.schedule(1, "m", vec![]);
        tokio::time::sleep(Duration::from_millis(20)).await;
        fetcher.schedule(2, "mo", vec![]);
        tokio::time::sleep(Duration::from_millis(20)).await;
        fetcher.schedule(3, "moo", vec![]);

        assert_eq!(rx.recv().await, Some(FetchEvent::Dispatched { seq: 3 }));
        assert!(matches!(rx.recv().await, Some(FetchEvent::Completed { seq: 3, .. })));
        assert_eq!(mock.searched_terms().await, vec!["moo"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_prevents_request() {
        let mock = Arc::new(MockRemoteSearch::new());
        let (fetcher, mut rx) = fetcher(&mock);

        fetcher.schedule(1, "moon", vec![]);
        fetcher.cancel();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(rx.try_recv().is_err());
        assert_eq!(mock.search_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reported() {
        let mock = Arc::new(MockRemoteSearch::new());
        mock.set_next_error(RemoteSearchError::ConnectionFailed("refused".into()))
            .await;
        let (fetcher, mut rx) = fetcher(&mock);

        fetcher.schedule(7, "moon", vec![]);

        assert_eq!(rx.recv().await, Some(FetchEvent::Dispatched { seq: 7 }));
        match rx.recv().await {
            Some(FetchEvent::Failed { seq, error }) => {
                assert_eq!(seq, 7);
                assert!(error.contains("refused"));
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_containers_extend_catalog() {
        let mock = Arc::new(MockRemoteSearch::new());
        mock.set_results(vec![
            RawResult::leaf("T1", "A2", "Intro"),
            RawResult::leaf("T2", "A1", "Known"),
        ])
        .await;
        mock.add_container(CatalogEntity::container("A2", "Sunrise"))
            .await;

        let catalog = CatalogStore::with_entities(vec![CatalogEntity::container("A1", "Moonlight")]);
        let (fetcher, mut rx) = DebouncedFetcher::new(mock.clone(), catalog.clone(), WINDOW);

        fetcher.schedule(1, "intro", vec![]);
        rx.recv().await;
        assert!(matches!(rx.recv().await, Some(FetchEvent::Completed { .. })));

        let snapshot = catalog.current();
        assert_eq!(snapshot.version(), 2);
        assert_eq!(snapshot.get("A2").unwrap().name, "Sunrise");
        assert_eq!(mock.recorded_fetches().await, vec![vec!["A2".to_string()]]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_container_failure_is_ignored() {
        let mock = Arc::new(MockRemoteSearch::new());
        mock.set_results(vec![RawResult::leaf("T1", "A2", "Intro")]).await;
        mock.set_fetch_error(RemoteSearchError::Timeout).await;

        let catalog = CatalogStore::new();
        let (fetcher, mut rx) = DebouncedFetcher::new(mock.clone(), catalog.clone(), WINDOW);

        fetcher.schedule(1, "intro", vec![]);
        rx.recv().await;
        match rx.recv().await {
            Some(FetchEvent::Completed { results, .. }) => assert_eq!(results.remote.len(), 1),
            other => panic!("unexpected event: {:?}", other),
        }
        assert_eq!(catalog.current().version(), 0);
    }
}
