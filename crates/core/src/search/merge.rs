//! Merging of local index matches with remote search results.

use std::collections::HashSet;

use tracing::debug;

use crate::remote::{RawResult, RemoteItemKind};

use super::SearchResult;

/// Local and remote results of one query, already deduplicated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergedResults {
    pub local: Vec<SearchResult>,
    pub remote: Vec<SearchResult>,
}

impl MergedResults {
    /// Local first, then remote, each in its own order.
    pub fn combined(&self) -> Vec<SearchResult> {
        self.local.iter().chain(self.remote.iter()).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.local.len() + self.remote.len()
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.remote.is_empty()
    }
}

/// Combine remote results with the local matches of the same query.
///
/// Remote entries pointing at a container the local list already shows are
/// dropped: containers with a local id and leaves whose container is local.
/// Repeated `(kind, id)` pairs in the remote list collapse to the first one.
/// Remote results of an unknown kind, and leaves without a container, are
/// skipped. Neither source is re-sorted.
pub fn merge_results(remote: &[RawResult], local: &[SearchResult]) -> MergedResults {
    let local_ids: HashSet<&str> = local.iter().map(|r| r.container_id()).collect();
    let mut seen: HashSet<(RemoteItemKind, &str)> = HashSet::new();
    let mut filtered = Vec::new();

    for raw in remote {
        if !seen.insert((raw.kind, raw.id.as_str())) {
            continue;
        }

        let result = match raw.kind {
            RemoteItemKind::Container => {
                if local_ids.contains(raw.id.as_str()) {
                    continue;
                }
                SearchResult::container(raw.id.clone())
            }
            RemoteItemKind::Leaf => {
                let Some(container_id) = raw.container_id.as_deref() else {
                    debug!(id = %raw.id, "Skipping remote leaf without container");
                    continue;
                };
                if local_ids.contains(container_id) {
                    continue;
                }
                SearchResult::leaf(
                    raw.id.clone(),
                    container_id,
                    raw.display_name.clone().unwrap_or_default(),
                )
            }
            RemoteItemKind::Unknown => {
                debug!(id = %raw.id, "Skipping remote result of unknown kind");
                continue;
            }
        };

        filtered.push(result);
    }

    MergedResults {
        local: local.to_vec(),
        remote: filtered,
    }
}
