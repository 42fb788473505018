//! TripPlanner configuration types and loading

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder identity used until real authentication exists
pub const DEFAULT_USER_ID: &str = "123e4567-e89b-12d3-a456-426614174000";

/// Upper bound for `services.max-retries`
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Upper bound for `services.timeout-ms` (five minutes)
pub const MAX_TIMEOUT_MS: u64 = 300_000;

/// Main TripPlanner configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Fixed user identity for the session
    #[serde(rename = "user-id")]
    pub user_id: Uuid,

    /// Collaborator service endpoints
    pub services: ServicesConfig,

    /// Place suggestion behavior
    pub suggestions: SuggestionsConfig,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level", skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_id: Uuid::parse_str(DEFAULT_USER_ID).unwrap_or_else(|_| Uuid::nil()),
            services: ServicesConfig::default(),
            suggestions: SuggestionsConfig::default(),
            log_level: None,
        }
    }
}

impl Config {
    /// Validate configuration before use
    ///
    /// Call this early in startup to fail fast with clear error messages.
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("cities-url", &self.services.cities_url),
            ("places-url", &self.services.places_url),
            ("trips-url", &self.services.trips_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(eyre::eyre!(
                    "services.{} must be an http(s) URL, got '{}'",
                    name,
                    url
                ));
            }
        }

        if self.services.timeout_ms == 0 || self.services.timeout_ms > MAX_TIMEOUT_MS {
            return Err(eyre::eyre!(
                "services.timeout-ms must be between 1 and {}, got {}",
                MAX_TIMEOUT_MS,
                self.services.timeout_ms
            ));
        }

        if self.services.max_retries > MAX_RETRIES_LIMIT {
            return Err(eyre::eyre!(
                "services.max-retries must be at most {}, got {}",
                MAX_RETRIES_LIMIT,
                self.services.max_retries
            ));
        }

        if self.suggestions.min_query_len == 0 {
            return Err(eyre::eyre!("suggestions.min-query-len must be at least 1"));
        }
        Ok(())
    }

    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::default_locations() {
            if candidate.exists() {
                match Self::load_from_file(&candidate) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                    }
                }
            }
        }

        // No config file found, use defaults
        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Read only the log level, before logging is set up
    ///
    /// Errors are swallowed; a broken config is reported later by `load`.
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        let path = match config_path {
            Some(p) => Some(p.clone()),
            None => Self::default_locations().into_iter().find(|p| p.exists()),
        }?;
        let content = fs::read_to_string(path).ok()?;
        let config: Self = serde_yaml::from_str(&content).ok()?;
        config.log_level
    }

    /// Project-local config first, then the user config directory
    fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(".tripplanner.yml")];
        if let Some(config_dir) = dirs::config_dir() {
            locations.push(config_dir.join("tripplanner").join("tripplanner.yml"));
        }
        locations
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Collaborator service endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// City catalog base URL (`GET /cities`)
    #[serde(rename = "cities-url")]
    pub cities_url: String,

    /// Place search base URL (`GET /places`)
    #[serde(rename = "places-url")]
    pub places_url: String,

    /// Trip storage base URL (`/trips`)
    #[serde(rename = "trips-url")]
    pub trips_url: String,

    /// Per-request timeout in milliseconds
    #[serde(rename = "timeout-ms")]
    pub timeout_ms: u64,

    /// Retries for idempotent requests (never applied to create)
    #[serde(rename = "max-retries")]
    pub max_retries: u32,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            cities_url: "http://localhost:5004".to_string(),
            places_url: "http://localhost:5002".to_string(),
            trips_url: "http://localhost:5003".to_string(),
            timeout_ms: 10_000,
            max_retries: 2,
        }
    }
}

impl ServicesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Place suggestion behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    /// Shortest query text that triggers a lookup
    #[serde(rename = "min-query-len")]
    pub min_query_len: usize,

    /// Quiet period before a lookup is sent
    #[serde(rename = "debounce-ms")]
    pub debounce_ms: u64,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            min_query_len: 2,
            debounce_ms: 200,
        }
    }
}

impl SuggestionsConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.user_id.to_string(), DEFAULT_USER_ID);
        assert_eq!(config.services.cities_url, "http://localhost:5004");
        assert_eq!(config.services.places_url, "http://localhost:5002");
        assert_eq!(config.services.trips_url, "http://localhost:5003");
        assert_eq!(config.suggestions.min_query_len, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r#"
user-id: 6f1c2d3e-0000-4000-8000-000000000001
log-level: debug

services:
  cities-url: http://cities.internal
  places-url: http://places.internal
  trips-url: https://trips.internal
  timeout-ms: 2500
  max-retries: 0

suggestions:
  min-query-len: 3
  debounce-ms: 50
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.user_id.to_string(), "6f1c2d3e-0000-4000-8000-000000000001");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.services.trips_url, "https://trips.internal");
        assert_eq!(config.services.timeout(), Duration::from_millis(2500));
        assert_eq!(config.services.max_retries, 0);
        assert_eq!(config.suggestions.min_query_len, 3);
        assert_eq!(config.suggestions.debounce(), Duration::from_millis(50));
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = r#"
services:
  places-url: http://places.example
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();

        // Specified value
        assert_eq!(config.services.places_url, "http://places.example");

        // Defaults for unspecified
        assert_eq!(config.services.cities_url, "http://localhost:5004");
        assert_eq!(config.user_id.to_string(), DEFAULT_USER_ID);
        assert_eq!(config.suggestions.debounce_ms, 200);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = Config::default();
        config.services.trips_url = "localhost:5003".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("trips-url"));
    }

    #[test]
    fn test_validate_rejects_zero_min_query_len() {
        let mut config = Config::default();
        config.suggestions.min_query_len = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_timeout() {
        let mut config = Config::default();
        config.services.timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout-ms"));

        config.services.timeout_ms = MAX_TIMEOUT_MS + 1;
        assert!(config.validate().is_err());

        config.services.timeout_ms = MAX_TIMEOUT_MS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bounds_max_retries() {
        let mut config = Config::default();
        config.services.max_retries = 64;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max-retries"));

        config.services.max_retries = MAX_RETRIES_LIMIT;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "log-level: warn\nsuggestions:\n  debounce-ms: 0").unwrap();
        let path = file.path().to_path_buf();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.suggestions.debounce_ms, 0);
        assert_eq!(Config::load_log_level(Some(&path)).as_deref(), Some("warn"));
    }

    #[test]
    fn test_load_explicit_missing_path_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nope.yml");
        assert!(Config::load(Some(&path)).is_err());
        assert!(Config::load_log_level(Some(&path)).is_none());
    }
}
