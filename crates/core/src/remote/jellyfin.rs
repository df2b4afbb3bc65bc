//! Jellyfin search backend implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::catalog::CatalogEntity;
use crate::config::JellyfinConfig;

use super::{RawResult, RemoteItemKind, RemoteSearchClient, RemoteSearchError, RemoteSearchResponse};

/// Client name reported in the authorization header.
const CLIENT_NAME: &str = "albumfinder";

/// Item types requested from the search endpoint.
const SEARCH_ITEM_TYPES: &str = "Audio,MusicAlbum";

/// Jellyfin search backend implementation.
pub struct JellyfinClient {
    client: Client,
    config: JellyfinConfig,
    auth_header: String,
}

impl JellyfinClient {
    /// Create a new JellyfinClient with the given configuration.
    pub fn new(config: JellyfinConfig) -> Result<Self, RemoteSearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| RemoteSearchError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let device_id = config
            .device_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let auth_header = format!(
            "MediaBrowser Client=\"{}\", Device=\"{}\", DeviceId=\"{}\", Version=\"{}\", Token=\"{}\"",
            CLIENT_NAME,
            CLIENT_NAME,
            device_id,
            env!("CARGO_PKG_VERSION"),
            config.api_key
        );

        Ok(Self {
            client,
            config,
            auth_header,
        })
    }

    fn items_url(&self) -> String {
        format!(
            "{}/Users/{}/Items",
            self.config.url.trim_end_matches('/'),
            urlencoding::encode(&self.config.user_id)
        )
    }

    /// Build the URL for a recursive album + track search.
    fn build_search_url(&self, term: &str) -> String {
        format!(
            "{}?SearchTerm={}&IncludeItemTypes={}&Recursive=true&Limit={}",
            self.items_url(),
            urlencoding::encode(term),
            SEARCH_ITEM_TYPES,
            self.config.limit
        )
    }

    /// Build the URL fetching specific items by id.
    fn build_items_url(&self, ids: &[String]) -> String {
        format!(
            "{}?Ids={}&Fields=AlbumArtist,Artists",
            self.items_url(),
            urlencoding::encode(&ids.join(","))
        )
    }

    async fn get_items(&self, url: &str) -> Result<ItemsResponse, RemoteSearchError> {
        let response = self
            .client
            .get(url)
            .header("X-Emby-Authorization", &self.auth_header)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RemoteSearchError::Timeout
                } else if e.is_connect() {
                    RemoteSearchError::ConnectionFailed(e.to_string())
                } else {
                    RemoteSearchError::Internal(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteSearchError::ApiError {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| RemoteSearchError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl RemoteSearchClient for JellyfinClient {
    fn name(&self) -> &str {
        "jellyfin"
    }

    async fn search(&self, term: &str) -> Result<RemoteSearchResponse, RemoteSearchError> {
        let start = Instant::now();
        let url = self.build_search_url(term);
        debug!(term, "Searching Jellyfin");

        let items = self.get_items(&url).await?;
        let results: Vec<RawResult> = items.items.into_iter().map(JellyfinItem::into_raw).collect();

        debug!(term, results = results.len(), "Jellyfin search complete");

        Ok(RemoteSearchResponse {
            results,
            duration_ms: start.elapsed().as_millis() as u64,
        })
    }

    async fn fetch_containers(
        &self,
        ids: &[String],
    ) -> Result<Vec<CatalogEntity>, RemoteSearchError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.build_items_url(ids);
        debug!(count = ids.len(), "Fetching albums from Jellyfin");

        let items = self.get_items(&url).await?;
        Ok(items
            .items
            .into_iter()
            .filter(|item| item.kind() == RemoteItemKind::Container)
            .map(JellyfinItem::into_entity)
            .collect())
    }
}

// ============================================================================
// Jellyfin API Response Types (private)
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ItemsResponse {
    #[serde(default)]
    items: Vec<JellyfinItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct JellyfinItem {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "Type", default)]
    item_type: Option<String>,
    #[serde(default)]
    album_id: Option<String>,
    #[serde(default)]
    album_artist: Option<String>,
    #[serde(default)]
    artists: Vec<String>,
}

impl JellyfinItem {
    fn kind(&self) -> RemoteItemKind {
        match self.item_type.as_deref() {
            Some("MusicAlbum") => RemoteItemKind::Container,
            Some("Audio") => RemoteItemKind::Leaf,
            _ => RemoteItemKind::Unknown,
        }
    }

    fn into_raw(self) -> RawResult {
        let kind = self.kind();
        let (container_id, display_name) = match kind {
            RemoteItemKind::Leaf => (self.album_id, self.name),
            _ => (None, None),
        };

        RawResult {
            id: self.id,
            kind,
            container_id,
            display_name,
        }
    }

    fn into_entity(self) -> CatalogEntity {
        CatalogEntity {
            name: self.name.unwrap_or_default(),
            id: self.id,
            kind: crate::catalog::EntityKind::Container,
            album_artist: self.album_artist,
            artists: self.artists,
            container_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JellyfinConfig {
        JellyfinConfig {
            url: "http://localhost:8096/".to_string(),
            api_key: "secret".to_string(),
            user_id: "user 1".to_string(),
            timeout_secs: 5,
            limit: 25,
            device_id: Some("device-1".to_string()),
        }
    }

    #[test]
    fn test_build_search_url() {
        let client = JellyfinClient::new(config()).unwrap();
        let url = client.build_search_url("moon light");

        assert_eq!(
            url,
            "http://localhost:8096/Users/user%201/Items?SearchTerm=moon%20light\
             &IncludeItemTypes=Audio,MusicAlbum&Recursive=true&Limit=25"
        );
    }

    #[test]
    fn test_build_items_url() {
        let client = JellyfinClient::new(config()).unwrap();
        let url = client.build_items_url(&["A1".to_string(), "A2".to_string()]);

        assert!(url.starts_with("http://localhost:8096/Users/user%201/Items?Ids=A1%2CA2"));
    }

    #[test]
    fn test_auth_header_carries_token_and_device() {
        let client = JellyfinClient::new(config()).unwrap();
        assert!(client.auth_header.contains("Token=\"secret\""));
        assert!(client.auth_header.contains("DeviceId=\"device-1\""));
    }

    #[test]
    fn test_parse_items_response() {
        let json = r#"{
            "Items": [
                {"Id": "A1", "Name": "Moonlight", "Type": "MusicAlbum", "AlbumArtist": "Luna"},
                {"Id": "T1", "Name": "Intro", "Type": "Audio", "AlbumId": "A1"},
                {"Id": "P1", "Name": "Mix", "Type": "Playlist"}
            ],
            "TotalRecordCount": 3
        }"#;
        let parsed: ItemsResponse = serde_json::from_str(json).unwrap();
        let raw: Vec<RawResult> = parsed.items.into_iter().map(JellyfinItem::into_raw).collect();

        assert_eq!(raw[0], RawResult::container("A1"));
        assert_eq!(raw[1], RawResult::leaf("T1", "A1", "Intro"));
        assert_eq!(raw[2].kind, RemoteItemKind::Unknown);
    }

    #[test]
    fn test_parse_missing_items() {
        let parsed: ItemsResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.items.is_empty());
    }

    #[test]
    fn test_item_into_entity() {
        let json = r#"{"Id": "A1", "Name": "Moonlight", "Type": "MusicAlbum",
                       "AlbumArtist": "Luna", "Artists": ["Luna", "Sol"]}"#;
        let item: JellyfinItem = serde_json::from_str(json).unwrap();
        let entity = item.into_entity();

        assert_eq!(entity.id, "A1");
        assert_eq!(entity.name, "Moonlight");
        assert_eq!(entity.album_artist.as_deref(), Some("Luna"));
        assert_eq!(entity.artists, vec!["Luna", "Sol"]);
        assert!(entity.is_container());
    }
}
