//! Local catalog: versioned snapshots of the cached album catalog.
//!
//! The catalog is replaced wholesale on every change. Consumers subscribe to
//! the [`CatalogStore`] and rebuild whatever they derive from a snapshot when
//! its version changes.

mod load;
mod store;
mod types;

pub use load::{load_catalog_file, load_catalog_from_str};
pub use store::CatalogStore;
pub use types::*;
