//! Response cache settings.
//!
//! Only the settings live here; no cache is implemented by issuekit itself.

use serde::{Deserialize, Serialize};

/// Default time-to-live for cached responses (one hour).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// Default prefix for cache keys.
pub const DEFAULT_CACHE_PREFIX: &str = "issuekit";

/// Response cache configuration.
///
/// # Examples
///
/// ```
/// use issuekit_config::CacheConfig;
///
/// let cache = CacheConfig::default();
/// assert!(!cache.enabled);
/// assert_eq!(cache.key("repos/o/r/issues"), "issuekit:repos/o/r/issues");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether response caching is requested.
    #[serde(default)]
    pub enabled: bool,

    /// Time-to-live for cached entries, in seconds.
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,

    /// Prefix prepended to every cache key.
    #[serde(default = "default_prefix")]
    pub key_prefix: String,
}

fn default_ttl() -> u64 {
    DEFAULT_CACHE_TTL_SECS
}

fn default_prefix() -> String {
    DEFAULT_CACHE_PREFIX.to_string()
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            key_prefix: DEFAULT_CACHE_PREFIX.to_string(),
        }
    }
}

impl CacheConfig {
    /// Builds a namespaced cache key.
    #[must_use]
    pub fn key(&self, suffix: &str) -> String {
        format!("{}:{suffix}", self.key_prefix)
    }

    /// Validates the cache configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if caching is enabled with a zero TTL or an empty
    /// key prefix.
    pub fn validate(&self) -> crate::Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if self.ttl_secs == 0 {
            return Err(crate::ConfigError::InvalidValue {
                field: "cache.ttl_secs",
                reason: "must be at least 1 when caching is enabled".to_string(),
            });
        }

        if self.key_prefix.trim().is_empty() {
            return Err(crate::ConfigError::InvalidValue {
                field: "cache.key_prefix",
                reason: "cannot be empty when caching is enabled".to_string(),
            });
        }

        Ok(())
    }
}
