use super::{types::Config, ConfigError, RemoteBackend};

/// Longest accepted debounce window
const MAX_DEBOUNCE_MS: u64 = 10_000;

/// Validate configuration
/// Currently validates:
/// - Search threshold is within 0..=1
/// - Debounce window is at most 10 seconds
/// - Jellyfin backend has url, api key, user id and a non-zero timeout
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let threshold = config.search.threshold;
    if !(0.0..=1.0).contains(&threshold) {
        return Err(ConfigError::ValidationError(format!(
            "search.threshold must be between 0 and 1, got {}",
            threshold
        )));
    }

    if config.search.debounce_ms > MAX_DEBOUNCE_MS {
        return Err(ConfigError::ValidationError(format!(
            "search.debounce_ms cannot exceed {}",
            MAX_DEBOUNCE_MS
        )));
    }

    if config.remote.backend == RemoteBackend::Jellyfin {
        let jellyfin = config.remote.jellyfin.as_ref().ok_or_else(|| {
            ConfigError::ValidationError(
                "remote.backend is jellyfin but [remote.jellyfin] is missing".to_string(),
            )
        })?;

        for (field, value) in [
            ("url", &jellyfin.url),
            ("api_key", &jellyfin.api_key),
            ("user_id", &jellyfin.user_id),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "remote.jellyfin.{} cannot be empty",
                    field
                )));
            }
        }

        if jellyfin.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "remote.jellyfin.timeout_secs cannot be 0".to_string(),
            ));
        }
    }

    Ok(())
}
