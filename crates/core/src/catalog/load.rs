use std::path::Path;

use tracing::debug;

use super::{CatalogEntity, CatalogError};

/// Load the cached catalog from a JSON array of entities.
pub fn load_catalog_file(path: &Path) -> Result<Vec<CatalogEntity>, CatalogError> {
    if !path.exists() {
        return Err(CatalogError::NotFound(path.display().to_string()));
    }

    let contents = std::fs::read_to_string(path)?;
    let entities = load_catalog_from_str(&contents)?;
    debug!(path = %path.display(), entities = entities.len(), "Loaded catalog cache");
    Ok(entities)
}

/// Parse a catalog from a JSON string (useful for testing)
pub fn load_catalog_from_str(json: &str) -> Result<Vec<CatalogEntity>, CatalogError> {
    serde_json::from_str(json).map_err(|e| CatalogError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EntityKind;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_from_str() {
        let json = r#"[
            {"id": "A1", "name": "Moonlight", "album_artist": "Luna"},
            {"id": "T1", "name": "Intro", "kind": "leaf", "container_id": "A1"}
        ]"#;
        let entities = load_catalog_from_str(json).unwrap();

        assert_eq!(entities.len(), 2);
        assert_eq!(entities[0].album_artist.as_deref(), Some("Luna"));
        assert_eq!(entities[1].kind, EntityKind::Leaf);
        assert_eq!(entities[1].container_id.as_deref(), Some("A1"));
    }

    #[test]
    fn test_load_from_str_invalid() {
        let result = load_catalog_from_str("{not json");
        assert!(matches!(result, Err(CatalogError::Parse(_))));
    }

    #[test]
    fn test_load_file_not_found() {
        let result = load_catalog_file(Path::new("/nonexistent/catalog.json"));
        assert!(matches!(result, Err(CatalogError::NotFound(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"[{{"id": "A1", "name": "Moonlight"}}]"#).unwrap();

        let entities = load_catalog_file(temp_file.path()).unwrap();
        assert_eq!(entities.len(), 1);
        assert_eq!(entities[0].name, "Moonlight");
    }
}
