//! In-memory fuzzy index over the container entities of a catalog snapshot.

use std::time::Instant;

use tracing::debug;

use crate::catalog::CatalogSnapshot;
use crate::metrics;

use super::scorer::{prepare, score_prepared};
use super::IndexError;

/// Options controlling how the index matches queries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexOptions {
    /// Maximum dissimilarity (0.0-1.0) a match may have.
    pub threshold: f64,
    /// Divisor for the location penalty. 0 requires matches at the start.
    pub distance: u32,
    /// Maximum number of matches returned (0 = unlimited).
    pub max_results: usize,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            distance: 100,
            max_results: 0,
        }
    }
}

/// A container that matched a query.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMatch {
    pub id: String,
    /// Dissimilarity score, lower is better.
    pub score: f64,
}

struct IndexEntry {
    id: String,
    /// Lowercased name, album artist and artists.
    fields: Vec<Vec<char>>,
}

/// Searchable structure built from one catalog snapshot.
///
/// The index never tracks changes: when the snapshot changes a new index is
/// built from scratch.
pub struct FuzzyIndex {
    snapshot_version: u64,
    options: IndexOptions,
    entries: Vec<IndexEntry>,
}

impl std::fmt::Debug for FuzzyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzyIndex")
            .field("snapshot_version", &self.snapshot_version)
            .field("options", &self.options)
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl FuzzyIndex {
    /// Build an index over the containers of `snapshot`.
    pub fn build(snapshot: &CatalogSnapshot, options: IndexOptions) -> Result<Self, IndexError> {
        if !(0.0..=1.0).contains(&options.threshold) {
            return Err(IndexError::InvalidThreshold(options.threshold));
        }

        let mut entries = Vec::new();
        for entity in snapshot.containers() {
            if entity.id.is_empty() {
                return Err(IndexError::MalformedEntity {
                    name: entity.name.clone(),
                    reason: "empty id".to_string(),
                });
            }

            let mut fields = vec![prepare(&entity.name)];
            if let Some(artist) = &entity.album_artist {
                fields.push(prepare(artist));
            }
            fields.extend(entity.artists.iter().map(|a| prepare(a)));

            entries.push(IndexEntry {
                id: entity.id.clone(),
                fields,
            });
        }

        debug!(
            version = snapshot.version(),
            entries = entries.len(),
            "Built fuzzy index"
        );

        Ok(Self {
            snapshot_version: snapshot.version(),
            options,
            entries,
        })
    }

    /// An index that matches nothing, tagged with a snapshot version.
    pub fn empty(snapshot_version: u64, options: IndexOptions) -> Self {
        Self {
            snapshot_version,
            options,
            entries: Vec::new(),
        }
    }

    /// Version of the snapshot this index was built from.
    pub fn snapshot_version(&self) -> u64 {
        self.snapshot_version
    }

    pub fn options(&self) -> IndexOptions {
        self.options
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Search for containers matching `query`, best match first.
    ///
    /// An empty (or whitespace-only) query returns nothing. Matches with equal
    /// scores keep snapshot order.
    pub fn search(&self, query: &str) -> Vec<IndexMatch> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let start = Instant::now();
        let pattern = prepare(query);

        let mut matches: Vec<IndexMatch> = self
            .entries
            .iter()
            .filter_map(|entry| {
                let score = entry
                    .fields
                    .iter()
                    .map(|field| score_prepared(&pattern, field, self.options.distance))
                    .fold(1.0, f64::min);

                (score <= self.options.threshold).then(|| IndexMatch {
                    id: entry.id.clone(),
                    score,
                })
            })
            .collect();

        // Stable sort keeps snapshot order among equal scores
        matches.sort_by(|a, b| a.score.total_cmp(&b.score));

        if self.options.max_results > 0 {
            matches.truncate(self.options.max_results);
        }

        metrics::LOCAL_SEARCHES.inc();
        metrics::LOCAL_SEARCH_DURATION
            .with_label_values(&[])
            .observe(start.elapsed().as_secs_f64());

        debug!(query, matches = matches.len(), "Local search complete");
        matches
    }
}
