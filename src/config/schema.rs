//! Configuration schema for geomatrix
//!
//! Configuration is stored at `~/.config/geomatrix/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Routing/geocoding service settings
    pub service: ServiceConfig,

    /// Call-rate quota
    pub quota: QuotaConfig,

    /// Token settings
    pub credentials: CredentialsConfig,

    /// On-disk caches
    pub store: StoreConfig,

    /// Matrix build behaviour
    pub matrix: MatrixConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// External service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Base URL of the geocoding/routing API
    pub base_url: String,

    /// Travel profile passed to the routing call
    pub route_type: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.onemap.gov.sg".to_string(),
            route_type: "drive".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl ServiceConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Rolling-window quota settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    /// Maximum calls per window
    pub max_calls: u32,

    /// Window length in seconds
    pub window_secs: u64,

    /// Fixed pause after every pairwise route call, in milliseconds
    pub call_delay_ms: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_calls: 150,
            window_secs: 60,
            call_delay_ms: 500,
        }
    }
}

impl QuotaConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn call_delay(&self) -> Duration {
        Duration::from_millis(self.call_delay_ms)
    }
}

/// Token settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsConfig {
    /// Reuse a persisted token while it is younger than this many days
    pub token_max_age_days: u32,

    /// Environment variable holding the account email
    pub email_env: String,

    /// Environment variable holding the account password
    pub password_env: String,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            token_max_age_days: 3,
            email_env: "ONEMAP_EMAIL".to_string(),
            password_env: "ONEMAP_PASSWORD".to_string(),
        }
    }
}

/// Cache file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory holding every cache file (defaults to the local data dir)
    pub directory: Option<PathBuf>,

    /// Token file name
    pub token_file: String,

    /// Identifier -> coordinate cache file name
    pub geocode_file: String,

    /// Matrix snapshot file name
    pub matrix_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: None,
            token_file: "token.json".to_string(),
            geocode_file: "geocode.json".to_string(),
            matrix_file: "matrices.bin.gz".to_string(),
        }
    }
}

impl StoreConfig {
    /// Resolve the store directory, falling back to `default_dir`
    pub fn dir_or(&self, default_dir: PathBuf) -> PathBuf {
        self.directory.clone().unwrap_or(default_dir)
    }
}

/// Matrix build settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Re-issue calls for cells left pending by an earlier failed call
    pub retry_pending: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[quota]"));
        assert!(toml.contains("[service]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.quota.max_calls, 150);
        assert_eq!(config.quota.window_secs, 60);
        assert_eq!(config.credentials.token_max_age_days, 3);
        assert!(!config.matrix.retry_pending);
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [quota]
            max_calls = 20
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.quota.max_calls, 20);
        assert_eq!(config.quota.call_delay_ms, 500); // default preserved
        assert_eq!(config.service.route_type, "drive");
    }

    #[test]
    fn store_dir_prefers_configured_directory() {
        let mut store = StoreConfig::default();
        assert_eq!(store.dir_or(PathBuf::from("/data")), PathBuf::from("/data"));

        store.directory = Some(PathBuf::from("/custom"));
        assert_eq!(store.dir_or(PathBuf::from("/data")), PathBuf::from("/custom"));
    }
}
