//! Projection of search results onto displayable rows.

use serde::Serialize;

use crate::catalog::CatalogSnapshot;

use super::SearchResult;

/// Kind of a displayed row.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RowKind {
    Album,
    Track,
}

/// A result resolved against the catalog, ready for display.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ResultRow {
    /// Stable key of the row (the result id).
    pub key: String,
    pub kind: RowKind,
    /// Album to open when the row is selected.
    pub container_id: String,
    /// Track name for tracks, album name otherwise.
    pub title: String,
    pub container_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_artist: Option<String>,
}

/// Resolve `results` against `snapshot`, in order.
///
/// Results whose album is not in the snapshot are omitted.
pub fn resolve_rows(results: &[SearchResult], snapshot: &CatalogSnapshot) -> Vec<ResultRow> {
    results
        .iter()
        .filter_map(|result| {
            let container = snapshot.get(result.container_id())?;

            let (kind, title) = match result {
                SearchResult::Container { .. } => (RowKind::Album, container.name.clone()),
                SearchResult::Leaf { display_name, .. } if !display_name.is_empty() => {
                    (RowKind::Track, display_name.clone())
                }
                SearchResult::Leaf { .. } => (RowKind::Track, container.name.clone()),
            };

            Some(ResultRow {
                key: result.id().to_string(),
                kind,
                container_id: container.id.clone(),
                title,
                container_name: container.name.clone(),
                album_artist: container.album_artist.clone(),
            })
        })
        .collect()
}
