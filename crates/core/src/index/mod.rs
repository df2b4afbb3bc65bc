//! Fuzzy index over the local catalog.
//!
//! The index is rebuilt from a [`CatalogSnapshot`](crate::catalog::CatalogSnapshot)
//! whenever the snapshot changes and queried synchronously on every
//! keystroke.

mod fuzzy;
mod scorer;

pub use fuzzy::{FuzzyIndex, IndexMatch, IndexOptions};
pub use scorer::fuzzy_score;

use thiserror::Error;

/// Errors that can occur while building the index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Invalid match threshold {0}, expected a value between 0 and 1")]
    InvalidThreshold(f64),

    #[error("Malformed catalog entity '{name}': {reason}")]
    MalformedEntity { name: String, reason: String },
}
