//! Types shared by the search session components.

use serde::{Deserialize, Serialize};

use crate::index::IndexMatch;

/// A single entry of the combined result list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SearchResult {
    /// A matched album, resolved by looking up `id`.
    Container { id: String },
    /// A matched track, resolved by looking up its container.
    Leaf {
        id: String,
        container_id: String,
        display_name: String,
    },
}

impl SearchResult {
    pub fn container(id: impl Into<String>) -> Self {
        Self::Container { id: id.into() }
    }

    pub fn leaf(
        id: impl Into<String>,
        container_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self::Leaf {
            id: id.into(),
            container_id: container_id.into(),
            display_name: display_name.into(),
        }
    }

    /// Id of the result itself.
    pub fn id(&self) -> &str {
        match self {
            Self::Container { id } | Self::Leaf { id, .. } => id,
        }
    }

    /// Id of the catalog entity the result resolves to.
    pub fn container_id(&self) -> &str {
        match self {
            Self::Container { id } => id,
            Self::Leaf { container_id, .. } => container_id,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Self::Container { .. })
    }
}

impl From<IndexMatch> for SearchResult {
    fn from(m: IndexMatch) -> Self {
        Self::Container { id: m.id }
    }
}

/// Lifecycle of a search session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchPhase {
    /// No query.
    #[default]
    Idle,
    /// Local results published, remote search waiting out the debounce.
    LocalOnly,
    /// Remote request in flight.
    Loading,
    /// Remote results merged, or the remote search failed.
    Resolved,
}

/// Published state of the current query.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SearchSession {
    /// Raw query as typed.
    pub query: String,
    /// Incremented on every query change.
    pub seq: u64,
    pub phase: SearchPhase,
    /// Fuzzy index matches, best first.
    pub local: Vec<SearchResult>,
    /// Filtered remote matches, in service order.
    pub remote: Vec<SearchResult>,
    pub loading: bool,
    /// Catalog snapshot version the local results were computed against.
    pub snapshot_version: u64,
}

impl SearchSession {
    /// Combined list: local first, then remote.
    pub fn results(&self) -> Vec<SearchResult> {
        self.local.iter().chain(self.remote.iter()).cloned().collect()
    }

    /// True when a search finished without finding anything.
    pub fn shows_no_results(&self) -> bool {
        !self.query.trim().is_empty()
            && self.local.is_empty()
            && self.remote.is_empty()
            && !self.loading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_result_serialization() {
        let leaf = SearchResult::leaf("T1", "A1", "Intro");
        let json = serde_json::to_value(&leaf).unwrap();
        assert_eq!(json["kind"], "leaf");
        assert_eq!(json["container_id"], "A1");

        let container = SearchResult::container("A1");
        let json = serde_json::to_value(&container).unwrap();
        assert_eq!(json["kind"], "container");
        assert_eq!(json["id"], "A1");
    }

    #[test]
    fn test_container_id_of_leaf() {
        let leaf = SearchResult::leaf("T1", "A1", "Intro");
        assert_eq!(leaf.id(), "T1");
        assert_eq!(leaf.container_id(), "A1");
        assert!(!leaf.is_container());
    }

    #[test]
    fn test_shows_no_results() {
        let mut session = SearchSession {
            query: "zzz".to_string(),
            ..Default::default()
        };
        assert!(session.shows_no_results());

        session.loading = true;
        assert!(!session.shows_no_results());

        session.loading = false;
        session.remote.push(SearchResult::container("A1"));
        assert!(!session.shows_no_results());

        let idle = SearchSession::default();
        assert!(!idle.shows_no_results());
    }

    #[test]
    fn test_results_local_first() {
        let session = SearchSession {
            query: "m".to_string(),
            local: vec![SearchResult::container("A1")],
            remote: vec![SearchResult::container("A2")],
            ..Default::default()
        };
        let ids: Vec<_> = session.results().iter().map(|r| r.id().to_string()).collect();
        assert_eq!(ids, vec!["A1", "A2"]);
    }
}
