//! Snapshot publisher for the local catalog.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use super::{CatalogEntity, CatalogSnapshot};

/// Holds the current catalog snapshot and notifies subscribers on change.
///
/// Cheap to clone; all clones publish into the same channel. Every publish
/// replaces the snapshot wholesale and bumps its version.
#[derive(Clone)]
pub struct CatalogStore {
    tx: Arc<watch::Sender<Arc<CatalogSnapshot>>>,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// Create a store holding an empty snapshot.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(CatalogSnapshot::empty()));
        Self { tx: Arc::new(tx) }
    }

    /// Create a store and immediately publish the given entities.
    pub fn with_entities(entities: Vec<CatalogEntity>) -> Self {
        let store = Self::new();
        store.publish(entities);
        store
    }

    /// The current snapshot.
    pub fn current(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.tx.borrow())
    }

    /// Subscribe to snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<CatalogSnapshot>> {
        self.tx.subscribe()
    }

    /// Replace the catalog with `entities`. Returns the new version.
    pub fn publish(&self, entities: Vec<CatalogEntity>) -> u64 {
        let mut published = None;
        self.tx.send_modify(|current| {
            let snapshot = CatalogSnapshot::new(current.version() + 1, entities);
            published = Some((snapshot.version(), snapshot.published_at()));
            *current = Arc::new(snapshot);
        });
        let (version, published_at) = published.unwrap_or_default();
        info!(version, %published_at, "Published catalog snapshot");
        version
    }

    /// Publish a new snapshot made of the current entities plus `added`.
    ///
    /// Added entities replace existing ones with the same id.
    pub fn extend(&self, added: Vec<CatalogEntity>) -> u64 {
        let count = added.len();
        let mut published = None;
        self.tx.send_modify(|current| {
            let entities: Vec<CatalogEntity> =
                current.iter().cloned().chain(added).collect();
            let snapshot = CatalogSnapshot::new(current.version() + 1, entities);
            published = Some((snapshot.version(), snapshot.published_at()));
            *current = Arc::new(snapshot);
        });
        let (version, published_at) = published.unwrap_or_default();
        info!(version, %published_at, added = count, "Extended catalog snapshot");
        version
    }
}
