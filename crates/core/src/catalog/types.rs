//! Types for the locally cached catalog.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Whether an entity groups other items or is an individual item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// A collection-like item (album).
    #[default]
    Container,
    /// An individual item belonging to exactly one container (track).
    Leaf,
}

/// A single catalog record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntity {
    /// Identifier, unique within the catalog.
    pub id: String,
    /// Display name.
    pub name: String,
    #[serde(default)]
    pub kind: EntityKind,
    /// Primary grouping name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_artist: Option<String>,
    /// Secondary grouping names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artists: Vec<String>,
    /// Parent container, only meaningful for leaves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
}

impl CatalogEntity {
    /// Create a container entity with no grouping attributes.
    pub fn container(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: EntityKind::Container,
            album_artist: None,
            artists: Vec::new(),
            container_id: None,
        }
    }

    /// Set the album artist.
    pub fn with_album_artist(mut self, artist: impl Into<String>) -> Self {
        self.album_artist = Some(artist.into());
        self
    }

    /// Add an artist.
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artists.push(artist.into());
        self
    }

    pub fn is_container(&self) -> bool {
        self.kind == EntityKind::Container
    }
}

/// An immutable, versioned view of the catalog.
///
/// Entities keep the order in which they were provided. A snapshot is never
/// mutated; changes produce a new snapshot with a higher version.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    version: u64,
    published_at: DateTime<Utc>,
    entities: Vec<CatalogEntity>,
    by_id: HashMap<String, usize>,
}

impl CatalogSnapshot {
    /// Build a snapshot. A later entity with an already seen id replaces the
    /// earlier one in place.
    pub fn new(version: u64, entities: impl IntoIterator<Item = CatalogEntity>) -> Self {
        let mut list: Vec<CatalogEntity> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::new();

        for entity in entities {
            match by_id.get(&entity.id) {
                Some(&idx) => list[idx] = entity,
                None => {
                    by_id.insert(entity.id.clone(), list.len());
                    list.push(entity);
                }
            }
        }

        Self {
            version,
            published_at: Utc::now(),
            entities: list,
            by_id,
        }
    }

    /// An empty snapshot at version 0.
    pub fn empty() -> Self {
        Self::new(0, Vec::new())
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn get(&self, id: &str) -> Option<&CatalogEntity> {
        self.by_id.get(id).map(|&idx| &self.entities[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Iterate entities in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntity> {
        self.entities.iter()
    }

    /// Iterate container entities in snapshot order.
    pub fn containers(&self) -> impl Iterator<Item = &CatalogEntity> {
        self.entities.iter().filter(|e| e.is_container())
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Errors that can occur while loading the catalog cache.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Catalog file not found: {0}")]
    NotFound(String),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = CatalogSnapshot::new(
            1,
            vec![
                CatalogEntity::container("A1", "Moonlight"),
                CatalogEntity::container("A2", "Sunrise"),
            ],
        );

        assert_eq!(snapshot.version(), 1);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("A2").unwrap().name, "Sunrise");
        assert!(snapshot.get("missing").is_none());
    }

    #[test]
    fn test_snapshot_duplicate_id_replaces_in_place() {
        let snapshot = CatalogSnapshot::new(
            1,
            vec![
                CatalogEntity::container("A1", "Old"),
                CatalogEntity::container("A2", "Other"),
                CatalogEntity::container("A1", "New"),
            ],
        );

        let names: Vec<_> = snapshot.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["New", "Other"]);
    }

    #[test]
    fn test_containers_skips_leaves() {
        let mut track = CatalogEntity::container("T1", "Track");
        track.kind = EntityKind::Leaf;
        track.container_id = Some("A1".to_string());

        let snapshot =
            CatalogSnapshot::new(1, vec![CatalogEntity::container("A1", "Album"), track]);

        assert_eq!(snapshot.containers().count(), 1);
        assert!(snapshot.contains("T1"));
    }

    #[test]
    fn test_entity_deserialize_minimal() {
        let json = r#"{"id": "A1", "name": "Moonlight"}"#;
        let entity: CatalogEntity = serde_json::from_str(json).unwrap();

        assert_eq!(entity.kind, EntityKind::Container);
        assert!(entity.album_artist.is_none());
        assert!(entity.artists.is_empty());
    }

    #[test]
    fn test_entity_kind_serialization() {
        assert_eq!(
            serde_json::to_string(&EntityKind::Container).unwrap(),
            "\"container\""
        );
        assert_eq!(serde_json::to_string(&EntityKind::Leaf).unwrap(), "\"leaf\"");
    }
}
