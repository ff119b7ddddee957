//! Core configuration struct and loading logic.
//!
//! This module provides the main [`Config`] struct which aggregates every
//! setting the issuekit client reads.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cache::CacheConfig;
use crate::env::apply_overrides;
use crate::error::{ConfigError, Result};
use crate::persistence::{find_config_file, read_config_file, write_config_file};
use crate::repository::Repository;
use crate::retry::RetryConfig;

/// Default GitHub REST API endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Default request timeout, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum allowed request timeout (ten minutes).
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// The main configuration struct for issuekit.
///
/// # Examples
///
/// ```
/// use issuekit_config::{Config, Repository};
///
/// let config = Config::default();
/// assert_eq!(config.base_url, "https://api.github.com");
/// assert!(config.repository.is_none());
///
/// let config = Config {
///     github_token: Some("ghp_xxx".to_string()),
///     repository: Some(Repository::new("rust-lang", "rust")),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// GitHub token used for bearer authentication.
    ///
    /// If not set, the `gh` CLI is consulted by
    /// [`auth::resolve_token`](crate::auth::resolve_token).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    /// REST API base URL (GitHub Enterprise hosts use `https://host/api/v3`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Retry settings for connectors.
    #[serde(default)]
    pub retry: RetryConfig,

    /// Response cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Repository used when callers do not name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Config {
    fn default() -> Self {
        Self {
            github_token: None,
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry: RetryConfig::default(),
            cache: CacheConfig::default(),
            repository: None,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    ///
    /// This is equivalent to `Config::default()`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from the default file locations and the process
    /// environment.
    ///
    /// Searches for configuration files in the following order:
    ///
    /// 1. Local: `./issuekit.json5` or `./issuekit.json`
    /// 2. User: `~/.config/issuekit/config.json5` or `~/.config/issuekit/config.json`
    ///
    /// Environment variables are applied on top of whatever was found.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is found but cannot be
    /// read or parsed, if an environment variable is malformed, or if the
    /// result fails validation.
    pub async fn load() -> Result<Self> {
        Self::load_with_env(|name| std::env::var(name).ok())
    }

    /// Like [`load`](Self::load), reading environment variables through
    /// `lookup`.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn load_with_env<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match find_config_file() {
            Some(path) => {
                debug!(path = %path.display(), "loading config file");
                read_config_file(&path)?
            }
            None => Self::default(),
        };

        apply_overrides(&mut config, lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a specific file, without environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use issuekit_config::Config;
    ///
    /// # fn example() -> issuekit_config::Result<()> {
    /// let config = Config::load_from("custom-config.json5")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load_from(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let config: Config = read_config_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration to a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_to(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        write_config_file(path, self)
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s), the timeout is
    /// outside `1..=600` seconds, or the retry/cache settings are invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use issuekit_config::Config;
    ///
    /// let mut config = Config::default();
    /// assert!(config.validate().is_ok());
    ///
    /// config.timeout_secs = 0;
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: format!("'{url}' must start with http:// or https://"),
            });
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs",
                reason: format!(
                    "{} is outside the allowed range of 1 to {MAX_TIMEOUT_SECS} seconds",
                    self.timeout_secs
                ),
            });
        }

        self.retry.validate()?;
        self.cache.validate()?;
        Ok(())
    }

    /// The base URL without a trailing slash.
    #[must_use]
    pub fn api_base(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// The request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns whether a token is configured (file or environment).
    #[must_use]
    pub fn has_token(&self) -> bool {
        self.github_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert!(config.github_token.is_none());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(!config.cache.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn new_config() {
        assert_eq!(Config::new(), Config::default());
    }

    #[test]
    fn api_base_trims_trailing_slash() {
        let config = Config {
            base_url: "https://ghe.example.com/api/v3/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.api_base(), "https://ghe.example.com/api/v3");
    }

    #[test]
    fn validate_rejects_bad_base_url() {
        let config = Config {
            base_url: "api.github.com".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_timeout_range() {
        let mut config = Config::default();
        config.timeout_secs = MAX_TIMEOUT_SECS;
        assert!(config.validate().is_ok());
        config.timeout_secs = MAX_TIMEOUT_SECS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_delegates_to_cache() {
        let mut config = Config::default();
        config.cache.enabled = true;
        config.cache.ttl_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn deserialize_with_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn deserialize_partial() {
        let json = r#"{"repository": "owner/repo", "timeout_secs": 5}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.repository.unwrap().full_name(), "owner/repo");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json5");
        std::fs::write(
            &path,
            r#"
            {
                github_token: "ghp_test",
                base_url: "https://ghe.example.com/api/v3",
                retry: { attempts: 2 },
                cache: { enabled: true, ttl_secs: 120 },
                repository: { owner: "tokio-rs", repo: "tokio" },
            }
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.github_token.as_deref(), Some("ghp_test"));
        assert_eq!(config.retry.attempts, 2);
        assert!(config.cache.enabled);
        assert_eq!(config.cache.ttl_secs, 120);
        assert_eq!(config.repository.unwrap().full_name(), "tokio-rs/tokio");
    }

    #[test]
    fn load_from_invalid_file_fails_validation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"timeout_secs": 0}"#).unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let original = Config {
            github_token: Some("ghp_xxx".to_string()),
            repository: Some(Repository::new("owner", "repo")),
            timeout_secs: 12,
            ..Default::default()
        };

        original.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(original, loaded);
    }

    #[test]
    fn github_token_not_serialized_when_none() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(!json.contains("github_token"));
    }
}
