//! Retry settings.
//!
//! These values are carried for connectors that implement their own retry
//! policy. The issuekit managers never retry: a failed response is classified
//! and returned to the caller immediately.

use serde::{Deserialize, Serialize};

/// Default number of attempts.
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;

/// Default pause between attempts, in milliseconds.
pub const DEFAULT_RETRY_SLEEP_MS: u64 = 1000;

/// Maximum allowed number of attempts.
pub const MAX_RETRY_ATTEMPTS: u32 = 10;

/// Maximum allowed pause between attempts (one minute).
pub const MAX_RETRY_SLEEP_MS: u64 = 60_000;

/// Retry configuration.
///
/// # Examples
///
/// ```
/// use issuekit_config::RetryConfig;
///
/// let retry = RetryConfig::default();
/// assert_eq!(retry.attempts, 3);
///
/// let none = RetryConfig::disabled();
/// assert!(!none.is_enabled());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// How many times a connector may retry a failed request.
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    /// Pause between attempts, in milliseconds.
    #[serde(default = "default_sleep_ms")]
    pub sleep_ms: u64,
}

fn default_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_sleep_ms() -> u64 {
    DEFAULT_RETRY_SLEEP_MS
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            sleep_ms: DEFAULT_RETRY_SLEEP_MS,
        }
    }
}

impl RetryConfig {
    /// Creates a configuration that never retries.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            attempts: 0,
            sleep_ms: 0,
        }
    }

    /// Returns `true` if at least one retry is allowed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.attempts > 0
    }

    /// Validates the retry configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if attempts or sleep exceed their maximum.
    pub fn validate(&self) -> crate::Result<()> {
        if self.attempts > MAX_RETRY_ATTEMPTS {
            return Err(crate::ConfigError::InvalidValue {
                field: "retry.attempts",
                reason: format!(
                    "{} exceeds maximum of {MAX_RETRY_ATTEMPTS}",
                    self.attempts
                ),
            });
        }

        if self.sleep_ms > MAX_RETRY_SLEEP_MS {
            return Err(crate::ConfigError::InvalidValue {
                field: "retry.sleep_ms",
                reason: format!(
                    "{} exceeds maximum of {MAX_RETRY_SLEEP_MS} milliseconds",
                    self.sleep_ms
                ),
            });
        }

        Ok(())
    }
}
