//! Types for the remote search service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::CatalogEntity;

/// Entity kind reported by the remote service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RemoteItemKind {
    /// A container (album).
    Container,
    /// A leaf item (track).
    Leaf,
    /// Anything else the service returned.
    #[serde(other)]
    Unknown,
}

/// A single raw result, before merging with local results.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RawResult {
    pub id: String,
    pub kind: RemoteItemKind,
    /// Container of a leaf result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// Display name of a leaf result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl RawResult {
    pub fn container(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: RemoteItemKind::Container,
            container_id: None,
            display_name: None,
        }
    }

    pub fn leaf(
        id: impl Into<String>,
        container_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: RemoteItemKind::Leaf,
            container_id: Some(container_id.into()),
            display_name: Some(display_name.into()),
        }
    }
}

/// Response of a remote search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RemoteSearchResponse {
    pub results: Vec<RawResult>,
    /// How long the search took in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,
}

/// Errors that can occur during remote search operations.
#[derive(Debug, Error)]
pub enum RemoteSearchError {
    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for remote search backends.
#[async_trait]
pub trait RemoteSearchClient: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Search the remote service for `term`.
    async fn search(&self, term: &str) -> Result<RemoteSearchResponse, RemoteSearchError>;

    /// Fetch container entities by id, used to fill in albums of leaf
    /// results that the local catalog does not know yet.
    async fn fetch_containers(
        &self,
        ids: &[String],
    ) -> Result<Vec<CatalogEntity>, RemoteSearchError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_result_deserialize_unknown_kind() {
        let json = r#"{"id": "X1", "kind": "playlist"}"#;
        let parsed: RawResult = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.kind, RemoteItemKind::Unknown);
        assert!(parsed.container_id.is_none());
    }

    #[test]
    fn test_raw_result_leaf_serialization() {
        let leaf = RawResult::leaf("T1", "A1", "Intro");
        let json = serde_json::to_string(&leaf).unwrap();
        let parsed: RawResult = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, leaf);
        assert!(json.contains("\"kind\":\"leaf\""));
    }

    #[test]
    fn test_container_skips_empty_fields() {
        let json = serde_json::to_string(&RawResult::container("A1")).unwrap();
        assert!(!json.contains("container_id"));
        assert!(!json.contains("display_name"));
    }
}
