//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! which backend to talk to, how long to wait for it, where the session
//! token lives and how long the UI lingers before navigating.
//!
//! Configuration is stored at `~/.config/sessiongate/config.json`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::client::{DEFAULT_API_BASE_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
use crate::api::ApiClient;
use crate::auth::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config/cache directory paths
pub const APP_NAME: &str = "sessiongate";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "SESSIONGATE_API_URL";

/// Delay between a successful login and opening the dashboard
const DEFAULT_LOGIN_REDIRECT_DELAY_MS: u64 = 500;

/// Delay between a failed verification and returning to the login view,
/// long enough to read the expiry banner
const DEFAULT_EXPIRED_REDIRECT_DELAY_MS: u64 = 2000;

/// How long an error banner stays up
const DEFAULT_BANNER_DISMISS_MS: u64 = 5000;

/// Where the session token is persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenStoreKind {
    #[default]
    File,
    Keyring,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub token_store: TokenStoreKind,
    pub login_redirect_delay_ms: u64,
    pub expired_redirect_delay_ms: u64,
    pub banner_dismiss_ms: u64,
    pub last_username: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            token_store: TokenStoreKind::default(),
            login_redirect_delay_ms: DEFAULT_LOGIN_REDIRECT_DELAY_MS,
            expired_redirect_delay_ms: DEFAULT_EXPIRED_REDIRECT_DELAY_MS,
            banner_dismiss_ms: DEFAULT_BANNER_DISMISS_MS,
            last_username: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            debug!(path = ?path, "Config loaded");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply environment overrides (`SESSIONGATE_API_URL`)
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            self.apply_api_url_override(&url);
        }
        self
    }

    fn apply_api_url_override(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.api_base_url = url.to_string();
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    pub fn login_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.login_redirect_delay_ms)
    }

    pub fn expired_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.expired_redirect_delay_ms)
    }

    pub fn banner_dismiss(&self) -> Duration {
        Duration::from_millis(self.banner_dismiss_ms)
    }

    pub fn api_client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.api_base_url, self.request_timeout())
            .context("Failed to build HTTP client")
    }

    /// Build the configured token store
    pub fn token_store(&self) -> Result<Box<dyn TokenStore>> {
        let store: Box<dyn TokenStore> = match self.token_store {
            TokenStoreKind::File => Box::new(FileTokenStore::new(&self.cache_dir()?)),
            TokenStoreKind::Keyring => Box::new(KeyringTokenStore::new()?),
            TokenStoreKind::Memory => Box::new(MemoryTokenStore::new()),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.login_redirect_delay(), Duration::from_millis(500));
        assert_eq!(config.expired_redirect_delay(), Duration::from_millis(2000));
        assert_eq!(config.banner_dismiss(), Duration::from_millis(5000));
        assert_eq!(config.token_store, TokenStoreKind::File);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"api_base_url":"http://localhost:3000","token_store":"keyring"}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:3000");
        assert_eq!(config.token_store, TokenStoreKind::Keyring);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_round_trips_username() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            last_username: Some("alice".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.last_username.as_deref(), Some("alice"));
    }

    #[test]
    fn test_api_url_override_ignores_blank() {
        let mut config = Config::default();
        config.apply_api_url_override("   ");
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        config.apply_api_url_override(" http://127.0.0.1:8080 ");
        assert_eq!(config.api_base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_zero_timeout_clamped() {
        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
    }
}
