//! Configuration management for issuekit.
//!
//! This crate handles loading, validating, and persisting the client
//! configuration from multiple sources (files, environment variables,
//! defaults).
//!
//! # Overview
//!
//! The crate is organized into the following modules:
//!
//! - [`config`]: Core configuration struct and loading logic
//! - [`env`]: Environment variable overrides
//! - [`repository`]: Default repository context with flexible parsing
//! - [`retry`]: Retry settings (declared for connectors, not enforced here)
//! - [`cache`]: Response cache settings (declared, not implemented here)
//! - [`auth`]: GitHub token resolution
//! - [`persistence`]: Config file reading and writing
//! - [`error`]: Error types for configuration operations
//!
//! # Configuration Sources (Priority)
//!
//! Configuration is loaded from multiple sources with the following priority
//! (highest to lowest):
//!
//! 1. Environment variables (`ISSUEKIT_*`, plus `GITHUB_TOKEN`)
//! 2. Local config (`./issuekit.json5` or `./issuekit.json`)
//! 3. User config (`~/.config/issuekit/config.json5` or `~/.config/issuekit/config.json`)
//! 4. Built-in defaults
//!
//! # Examples
//!
//! ```no_run
//! use issuekit_config::Config;
//!
//! # async fn example() -> issuekit_config::Result<()> {
//! let config = Config::load().await?;
//! println!("Talking to {}", config.base_url);
//!
//! if let Some(repo) = &config.repository {
//!     println!("Default repository: {}", repo.full_name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cache;
pub mod config;
pub mod env;
pub mod error;
pub mod persistence;
pub mod repository;
pub mod retry;

// Re-export primary types at crate root for convenience
pub use cache::CacheConfig;
pub use config::{Config, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
pub use error::{ConfigError, Result};
pub use repository::Repository;
pub use retry::RetryConfig;
