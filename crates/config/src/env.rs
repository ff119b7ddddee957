//! Environment variable overrides.
//!
//! Every setting can be overridden from the environment. Lookups go through
//! a caller-supplied function so the process environment is only read by
//! [`apply_process_env`].
//!
//! | Variable | Setting |
//! |----------|---------|
//! | `ISSUEKIT_TOKEN`, then `GITHUB_TOKEN` | `github_token` |
//! | `ISSUEKIT_BASE_URL` | `base_url` |
//! | `ISSUEKIT_TIMEOUT` | `timeout_secs` |
//! | `ISSUEKIT_RETRY_ATTEMPTS` | `retry.attempts` |
//! | `ISSUEKIT_RETRY_SLEEP_MS` | `retry.sleep_ms` |
//! | `ISSUEKIT_CACHE_ENABLED` | `cache.enabled` |
//! | `ISSUEKIT_CACHE_TTL` | `cache.ttl_secs` |
//! | `ISSUEKIT_CACHE_PREFIX` | `cache.key_prefix` |
//! | `ISSUEKIT_REPOSITORY` | `repository` (`owner/repo`) |

use std::str::FromStr;

use crate::Repository;
use crate::config::Config;
use crate::error::{ConfigError, Result};

pub const TOKEN: &str = "ISSUEKIT_TOKEN";
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
pub const BASE_URL: &str = "ISSUEKIT_BASE_URL";
pub const TIMEOUT: &str = "ISSUEKIT_TIMEOUT";
pub const RETRY_ATTEMPTS: &str = "ISSUEKIT_RETRY_ATTEMPTS";
pub const RETRY_SLEEP_MS: &str = "ISSUEKIT_RETRY_SLEEP_MS";
pub const CACHE_ENABLED: &str = "ISSUEKIT_CACHE_ENABLED";
pub const CACHE_TTL: &str = "ISSUEKIT_CACHE_TTL";
pub const CACHE_PREFIX: &str = "ISSUEKIT_CACHE_PREFIX";
pub const REPOSITORY: &str = "ISSUEKIT_REPOSITORY";

/// Applies overrides read through `lookup` onto `config`.
///
/// Empty values are treated as unset.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvValue`] if a numeric or boolean
/// variable cannot be parsed, or [`ConfigError::InvalidRepository`] for a
/// malformed `ISSUEKIT_REPOSITORY`.
///
/// # Examples
///
/// ```
/// use issuekit_config::{Config, env::apply_overrides};
///
/// let mut config = Config::default();
/// apply_overrides(&mut config, |name| match name {
///     "GITHUB_TOKEN" => Some("ghp_from_env".to_string()),
///     "ISSUEKIT_TIMEOUT" => Some("10".to_string()),
///     _ => None,
/// })
/// .unwrap();
///
/// assert_eq!(config.github_token.as_deref(), Some("ghp_from_env"));
/// assert_eq!(config.timeout_secs, 10);
/// ```
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(token) = get(TOKEN).or_else(|| get(GITHUB_TOKEN)) {
        config.github_token = Some(token);
    }
    if let Some(url) = get(BASE_URL) {
        config.base_url = url.trim().to_string();
    }
    if let Some(raw) = get(TIMEOUT) {
        config.timeout_secs = parse(TIMEOUT, &raw)?;
    }
    if let Some(raw) = get(RETRY_ATTEMPTS) {
        config.retry.attempts = parse(RETRY_ATTEMPTS, &raw)?;
    }
    if let Some(raw) = get(RETRY_SLEEP_MS) {
        config.retry.sleep_ms = parse(RETRY_SLEEP_MS, &raw)?;
    }
    if let Some(raw) = get(CACHE_ENABLED) {
        config.cache.enabled = parse_bool(CACHE_ENABLED, &raw)?;
    }
    if let Some(raw) = get(CACHE_TTL) {
        config.cache.ttl_secs = parse(CACHE_TTL, &raw)?;
    }
    if let Some(prefix) = get(CACHE_PREFIX) {
        config.cache.key_prefix = prefix;
    }
    if let Some(raw) = get(REPOSITORY) {
        config.repository = Some(Repository::parse(&raw)?);
    }

    Ok(())
}

/// Applies overrides from the process environment.
///
/// # Errors
///
/// See [`apply_overrides`].
pub fn apply_process_env(config: &mut Config) -> Result<()> {
    apply_overrides(config, |name| std::env::var(name).ok())
}

fn parse<T: FromStr>(name: &'static str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidEnvValue {
            name,
            value: raw.to_string(),
        })
}

fn parse_bool(name: &'static str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvValue {
            name,
            value: raw.to_string(),
        }),
    }
}
