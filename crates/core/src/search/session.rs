//! Search session controller.
//!
//! The controller owns the fuzzy index and the debounced fetcher, and
//! publishes a [`SearchSession`] on a watch channel whenever the visible state
//! changes. All state transitions happen on the task that owns the
//! controller; the only concurrent work is the remote request itself.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::catalog::{CatalogSnapshot, CatalogStore};
use crate::config::SearchConfig;
use crate::index::{FuzzyIndex, IndexOptions};
use crate::metrics;
use crate::remote::RemoteSearchClient;

use super::{DebouncedFetcher, FetchEvent, SearchPhase, SearchResult, SearchSession};

/// Drives one search box: local results on every edit, debounced remote
/// results after the typing pauses.
pub struct SearchController {
    options: IndexOptions,
    catalog: CatalogStore,
    snapshot_rx: watch::Receiver<Arc<CatalogSnapshot>>,
    index: FuzzyIndex,
    fetcher: DebouncedFetcher,
    fetch_events: mpsc::Receiver<FetchEvent>,
    state: watch::Sender<SearchSession>,
}

impl SearchController {
    /// Create a controller over `catalog`, querying `client` for remote
    /// results.
    pub fn new(
        config: &SearchConfig,
        catalog: CatalogStore,
        client: Arc<dyn RemoteSearchClient>,
    ) -> Self {
        let options = config.index_options();
        let mut snapshot_rx = catalog.subscribe();
        let snapshot = Arc::clone(&snapshot_rx.borrow_and_update());
        let index = build_index(&snapshot, options);

        let (fetcher, fetch_events) = DebouncedFetcher::new(
            client,
            catalog.clone(),
            Duration::from_millis(config.debounce_ms),
        );

        let (state, _) = watch::channel(SearchSession {
            snapshot_version: snapshot.version(),
            ..Default::default()
        });

        Self {
            options,
            catalog,
            snapshot_rx,
            index,
            fetcher,
            fetch_events,
            state,
        }
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<SearchSession> {
        self.state.subscribe()
    }

    /// The currently published session.
    pub fn session(&self) -> SearchSession {
        self.state.borrow().clone()
    }

    pub fn index(&self) -> &FuzzyIndex {
        &self.index
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    /// Apply a query edit.
    ///
    /// Local results are computed and published before this returns. A
    /// non-empty query also schedules a remote search; an empty one cancels
    /// any pending search and resets the session.
    pub fn set_query(&mut self, query: &str) {
        let current = self.state.borrow().clone();
        if current.query == query {
            return;
        }

        self.sync_index();
        let seq = current.seq + 1;

        if query.trim().is_empty() {
            self.fetcher.cancel();
            debug!(seq, "Query cleared");
            self.publish(SearchSession {
                query: query.to_string(),
                seq,
                phase: SearchPhase::Idle,
                local: Vec::new(),
                remote: Vec::new(),
                loading: false,
                snapshot_version: self.index.snapshot_version(),
            });
            return;
        }

        let local = self.search_local(query);
        debug!(seq, query, results = local.len(), "Published local results");

        self.fetcher.schedule(seq, query, local.clone());
        self.publish(SearchSession {
            query: query.to_string(),
            seq,
            phase: SearchPhase::LocalOnly,
            local,
            remote: Vec::new(),
            loading: true,
            snapshot_version: self.index.snapshot_version(),
        });
    }

    /// Apply the outcome of a remote search.
    ///
    /// Returns `true` if the session changed. Outcomes for anything but the
    /// current query are discarded.
    pub fn handle_event(&mut self, event: FetchEvent) -> bool {
        let mut session = self.session();

        if event.seq() != session.seq {
            if !matches!(event, FetchEvent::Dispatched { .. }) {
                metrics::STALE_RESPONSES.inc();
                debug!(
                    seq = event.seq(),
                    current = session.seq,
                    "Discarding stale remote response"
                );
            }
            return false;
        }

        match event {
            FetchEvent::Dispatched { seq } => {
                debug!(seq, "Remote search in flight");
                session.phase = SearchPhase::Loading;
                self.publish(session);
                return true;
            }
            FetchEvent::Completed { seq, results } => {
                // The catalog may have grown since the request was merged
                let mut remote = results.remote;
                retain_not_local(&mut remote, &session.local);
                metrics::SEARCH_RESULTS
                    .with_label_values(&["remote"])
                    .observe(remote.len() as f64);
                debug!(seq, results = remote.len(), "Remote search complete");
                session.remote = remote;
            }
            FetchEvent::Failed { seq, error } => {
                debug!(seq, error = %error, "Keeping local results after remote failure");
                session.remote.clear();
            }
        }

        session.phase = SearchPhase::Resolved;
        session.loading = false;
        self.publish(session);
        true
    }

    /// Rebuild the index if the catalog snapshot changed and republish the
    /// session against it. Returns `true` if the index was rebuilt.
    pub fn refresh_snapshot(&mut self) -> bool {
        if !self.sync_index() {
            return false;
        }

        let mut session = self.session();
        session.snapshot_version = self.index.snapshot_version();

        if !session.query.trim().is_empty() {
            session.local = self.search_local(&session.query);
            retain_not_local(&mut session.remote, &session.local);
        }

        self.publish(session);
        true
    }

    /// Wait for the next remote search outcome.
    pub async fn next_event(&mut self) -> Option<FetchEvent> {
        self.fetch_events.recv().await
    }

    /// Run the controller until the query channel closes.
    ///
    /// Each received string replaces the whole query.
    pub async fn run(mut self, mut queries: mpsc::Receiver<String>) {
        loop {
            tokio::select! {
                query = queries.recv() => match query {
                    Some(query) => self.set_query(&query),
                    None => {
                        debug!("Query channel closed, stopping search controller");
                        break;
                    }
                },
                Some(event) = self.fetch_events.recv() => {
                    self.handle_event(event);
                }
                changed = self.snapshot_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    self.refresh_snapshot();
                }
            }
        }
    }

    fn search_local(&self, query: &str) -> Vec<SearchResult> {
        let local: Vec<SearchResult> = self
            .index
            .search(query)
            .into_iter()
            .map(SearchResult::from)
            .collect();
        metrics::SEARCH_RESULTS
            .with_label_values(&["local"])
            .observe(local.len() as f64);
        local
    }

    /// Rebuild the index when the current snapshot differs from the one it
    /// was built from.
    fn sync_index(&mut self) -> bool {
        let snapshot = Arc::clone(&self.snapshot_rx.borrow_and_update());
        if snapshot.version() == self.index.snapshot_version() {
            return false;
        }

        self.index = build_index(&snapshot, self.options);
        true
    }

    fn publish(&self, session: SearchSession) {
        self.state.send_replace(session);
    }
}

/// Drop remote results whose album is already among the local matches.
fn retain_not_local(remote: &mut Vec<SearchResult>, local: &[SearchResult]) {
    let local_ids: HashSet<&str> = local.iter().map(|r| r.container_id()).collect();
    remote.retain(|r| !local_ids.contains(r.container_id()));
}

fn build_index(snapshot: &CatalogSnapshot, options: IndexOptions) -> FuzzyIndex {
    let start = Instant::now();
    match FuzzyIndex::build(snapshot, options) {
        Ok(index) => {
            metrics::INDEX_REBUILDS.with_label_values(&["success"]).inc();
            info!(
                version = snapshot.version(),
                entries = index.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Rebuilt search index"
            );
            index
        }
        Err(e) => {
            metrics::INDEX_REBUILDS.with_label_values(&["failure"]).inc();
            error!(version = snapshot.version(), error = %e, "Failed to build search index");
            FuzzyIndex::empty(snapshot.version(), options)
        }
    }
}
