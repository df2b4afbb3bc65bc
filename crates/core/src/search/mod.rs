//! Search session: local fuzzy results on every query edit, merged with
//! debounced remote results once typing pauses.
//!
//! Flow per query edit:
//! 1. [`SearchController::set_query`] searches the [`FuzzyIndex`](crate::index::FuzzyIndex)
//!    and publishes the local results with `loading` set.
//! 2. [`DebouncedFetcher`] waits for the debounce window, then calls the
//!    remote backend.
//! 3. [`merge_results`] drops remote entries already shown locally.
//! 4. The controller publishes the merged list if the response belongs to
//!    the current query, otherwise discards it.
//!
//! [`resolve_rows`] turns a result list into displayable rows, omitting
//! results whose album is not in the catalog.

mod debounce;
mod merge;
mod render;
mod session;
mod types;

pub use debounce::{DebouncedFetcher, FetchEvent};
pub use merge::{merge_results, MergedResults};
pub use render::{resolve_rows, ResultRow, RowKind};
pub use session::SearchController;
pub use types::*;
