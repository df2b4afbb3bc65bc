use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::index::IndexOptions;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Local catalog cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from("catalog.json")
}

/// Search engine tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Maximum dissimilarity (0.0-1.0) kept by the fuzzy index
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Location penalty divisor (0 = matches must start at the first character)
    #[serde(default = "default_distance")]
    pub distance: u32,
    /// Remote debounce window in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum local matches (0 = unlimited)
    #[serde(default)]
    pub max_local_results: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            distance: default_distance(),
            debounce_ms: default_debounce_ms(),
            max_local_results: 0,
        }
    }
}

impl SearchConfig {
    pub fn index_options(&self) -> IndexOptions {
        IndexOptions {
            threshold: self.threshold,
            distance: self.distance,
            max_results: self.max_local_results,
        }
    }
}

fn default_threshold() -> f64 {
    0.1
}

fn default_distance() -> u32 {
    100
}

fn default_debounce_ms() -> u64 {
    50
}

/// Remote search configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub backend: RemoteBackend,
    /// Jellyfin-specific configuration (required when backend = "jellyfin")
    #[serde(default)]
    pub jellyfin: Option<JellyfinConfig>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: RemoteBackend::Offline,
            jellyfin: None,
        }
    }
}

/// Available remote search backends
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RemoteBackend {
    /// No remote search; local results only
    #[default]
    Offline,
    Jellyfin,
}

/// Jellyfin search backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JellyfinConfig {
    /// Server URL (e.g., "http://localhost:8096")
    pub url: String,
    /// API key / access token
    pub api_key: String,
    /// User whose library is searched
    pub user_id: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Maximum items per search (default: 50)
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// Device id sent with requests, generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

fn default_timeout() -> u32 {
    30
}

fn default_limit() -> u32 {
    50
}

/// Metrics configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MetricsConfig {
    /// Print the Prometheus text exposition on exit
    #[serde(default)]
    pub dump_on_exit: bool,
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub catalog: CatalogConfig,
    pub search: SearchConfig,
    pub remote: SanitizedRemoteConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedRemoteConfig {
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jellyfin: Option<SanitizedJellyfinConfig>,
}

/// Sanitized Jellyfin config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJellyfinConfig {
    pub url: String,
    pub user_id: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
    pub limit: u32,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            catalog: config.catalog.clone(),
            search: config.search.clone(),
            remote: SanitizedRemoteConfig {
                backend: match config.remote.backend {
                    RemoteBackend::Offline => "offline".to_string(),
                    RemoteBackend::Jellyfin => "jellyfin".to_string(),
                },
                jellyfin: config
                    .remote
                    .jellyfin
                    .as_ref()
                    .map(|j| SanitizedJellyfinConfig {
                        url: j.url.clone(),
                        user_id: j.user_id.clone(),
                        api_key_configured: !j.api_key.is_empty(),
                        timeout_secs: j.timeout_secs,
                        limit: j.limit,
                    }),
            },
            metrics: config.metrics.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.catalog.path.to_str().unwrap(), "catalog.json");
        assert_eq!(config.search.threshold, 0.1);
        assert_eq!(config.search.distance, 100);
        assert_eq!(config.search.debounce_ms, 50);
        assert_eq!(config.search.max_local_results, 0);
        assert_eq!(config.remote.backend, RemoteBackend::Offline);
        assert!(!config.metrics.dump_on_exit);
    }

    #[test]
    fn test_deserialize_search_section() {
        let toml = r#"
[search]
threshold = 0.3
debounce_ms = 120
max_local_results = 25
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.search.threshold, 0.3);
        assert_eq!(config.search.debounce_ms, 120);
        assert_eq!(config.search.distance, 100); // default

        let options = config.search.index_options();
        assert_eq!(options.threshold, 0.3);
        assert_eq!(options.max_results, 25);
    }

    #[test]
    fn test_deserialize_with_jellyfin_config() {
        let toml = r#"
[remote]
backend = "jellyfin"

[remote.jellyfin]
url = "http://localhost:8096"
api_key = "test-api-key"
user_id = "user-1"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.remote.backend, RemoteBackend::Jellyfin);

        let jellyfin = config.remote.jellyfin.as_ref().unwrap();
        assert_eq!(jellyfin.url, "http://localhost:8096");
        assert_eq!(jellyfin.api_key, "test-api-key");
        assert_eq!(jellyfin.timeout_secs, 30); // default
        assert_eq!(jellyfin.limit, 50); // default
        assert!(jellyfin.device_id.is_none());
    }

    #[test]
    fn test_deserialize_unknown_backend_fails() {
        let toml = r#"
[remote]
backend = "spotify"
"#;
        let result: Result<Config, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    #[test]
    fn test_sanitized_config() {
        let config = Config::default();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.remote.backend, "offline");
        assert!(sanitized.remote.jellyfin.is_none());
        assert_eq!(sanitized.search.debounce_ms, 50);
    }

    #[test]
    fn test_sanitized_config_hides_api_key() {
        let config = Config {
            remote: RemoteConfig {
                backend: RemoteBackend::Jellyfin,
                jellyfin: Some(JellyfinConfig {
                    url: "http://localhost:8096".to_string(),
                    api_key: "secret-key".to_string(),
                    user_id: "user-1".to_string(),
                    timeout_secs: 10,
                    limit: 20,
                    device_id: None,
                }),
            },
            ..Default::default()
        };

        let sanitized = SanitizedConfig::from(&config);
        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret-key"));

        let jellyfin = sanitized.remote.jellyfin.as_ref().unwrap();
        assert_eq!(sanitized.remote.backend, "jellyfin");
        assert!(jellyfin.api_key_configured);
        assert_eq!(jellyfin.timeout_secs, 10);
    }
}
