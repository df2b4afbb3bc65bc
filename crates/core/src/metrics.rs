//! Prometheus metrics for the search engine.
//!
//! This module provides metrics for:
//! - Local fuzzy index (searches, latency, rebuilds)
//! - Remote search backend (requests, latency)
//! - Session bookkeeping (superseded debounces, stale responses, result counts)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Local Index Metrics
// =============================================================================

/// Local fuzzy searches total.
pub static LOCAL_SEARCHES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "albumfinder_local_searches_total",
        "Total searches against the local fuzzy index",
    )
    .unwrap()
});

/// Local fuzzy search duration in seconds.
pub static LOCAL_SEARCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "albumfinder_local_search_duration_seconds",
            "Duration of local fuzzy index searches",
        )
        .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]),
        &[],
    )
    .unwrap()
});

/// Index rebuilds by result.
pub static INDEX_REBUILDS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "albumfinder_index_rebuilds_total",
            "Total fuzzy index rebuilds",
        ),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

// =============================================================================
// Remote Search Metrics
// =============================================================================

/// Remote search requests by status.
pub static REMOTE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "albumfinder_remote_requests_total",
            "Total remote search requests",
        ),
        &["status"], // "success", "failure"
    )
    .unwrap()
});

/// Remote search request duration in seconds.
pub static REMOTE_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "albumfinder_remote_request_duration_seconds",
            "Duration of remote search requests",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &[],
    )
    .unwrap()
});

// =============================================================================
// Session Metrics
// =============================================================================

/// Debounced remote searches replaced by a newer query before firing.
pub static DEBOUNCE_SUPERSEDED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "albumfinder_debounce_superseded_total",
        "Total scheduled remote searches superseded before the window elapsed",
    )
    .unwrap()
});

/// Remote responses discarded because a newer query was current.
pub static STALE_RESPONSES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "albumfinder_stale_responses_total",
        "Total remote responses discarded as stale",
    )
    .unwrap()
});

/// Results published per query by source.
pub static SEARCH_RESULTS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "albumfinder_search_results",
            "Number of results published per query",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &["source"], // "local", "remote"
    )
    .unwrap()
});

/// Returns all metrics for registration with a Prometheus registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Local
        Box::new(LOCAL_SEARCHES.clone()),
        Box::new(LOCAL_SEARCH_DURATION.clone()),
        Box::new(INDEX_REBUILDS.clone()),
        // Remote
        Box::new(REMOTE_REQUESTS.clone()),
        Box::new(REMOTE_REQUEST_DURATION.clone()),
        // Session
        Box::new(DEBOUNCE_SUPERSEDED.clone()),
        Box::new(STALE_RESPONSES.clone()),
        Box::new(SEARCH_RESULTS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }

        INDEX_REBUILDS.with_label_values(&["success"]).inc();
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.get_name().to_string())
            .collect();
        assert!(names.contains(&"albumfinder_index_rebuilds_total".to_string()));
    }
}
