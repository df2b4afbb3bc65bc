//! Testing utilities and mock implementations.
//!
//! This module provides a mock remote search backend and catalog fixtures,
//! allowing the whole search session to be exercised without a media server.
//!
//! # Example
//!
//! ```rust,ignore
//! use albumfinder_core::testing::{fixtures, MockRemoteSearch};
//!
//! let catalog = CatalogStore::with_entities(vec![
//!     fixtures::album("A1", "Moonlight", "Luna"),
//! ]);
//! let remote = Arc::new(MockRemoteSearch::new());
//! remote.set_results(vec![fixtures::remote_album("A1")]).await;
//! ```

mod mock_remote;

pub use mock_remote::{MockRemoteSearch, RecordedSearch};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::catalog::{CatalogEntity, CatalogStore};
    use crate::remote::RawResult;

    /// Create an album with an album artist.
    pub fn album(id: &str, name: &str, album_artist: &str) -> CatalogEntity {
        CatalogEntity::container(id, name).with_album_artist(album_artist)
    }

    /// A small catalog used across session tests.
    pub fn sample_albums() -> Vec<CatalogEntity> {
        vec![
            album("A1", "Moonlight", "Luna"),
            album("A2", "Sunrise", "Sol"),
            album("A3", "Midnight Drive", "The Nightcrawlers").with_artist("Luna"),
            album("A4", "Harbor Lights", "The Tides"),
        ]
    }

    /// A catalog store holding [`sample_albums`].
    pub fn sample_catalog() -> CatalogStore {
        CatalogStore::with_entities(sample_albums())
    }

    /// A remote album result.
    pub fn remote_album(id: &str) -> RawResult {
        RawResult::container(id)
    }

    /// A remote track result.
    pub fn remote_track(id: &str, album_id: &str, name: &str) -> RawResult {
        RawResult::leaf(id, album_id, name)
    }
}
