//! GitHub token resolution.
//!
//! Tokens are looked up in this order:
//!
//! 1. The token attached to the [`Repository`] being accessed
//! 2. The global `github_token` (config file, `ISSUEKIT_TOKEN` or `GITHUB_TOKEN`)
//! 3. `gh auth token` from the GitHub CLI
//!
//! When none of these yields a token the client runs unauthenticated.

use tracing::debug;

use crate::Repository;
use crate::config::Config;
use crate::error::{ConfigError, Result};

/// Resolves the token to use for `repo` (or for no repository in particular).
///
/// Failures of the `gh` CLI are logged and treated as "no token".
///
/// # Examples
///
/// ```no_run
/// use issuekit_config::{Repository, auth::resolve_token};
///
/// # async fn example() {
/// let repo = Repository::new("rust-lang", "rust");
/// let token = resolve_token(Some(&repo), Some("ghp_global")).await;
/// assert_eq!(token.as_deref(), Some("ghp_global"));
/// # }
/// ```
pub async fn resolve_token(repo: Option<&Repository>, global_token: Option<&str>) -> Option<String> {
    if let Some(token) = repo.and_then(Repository::token) {
        debug!("using repository-specific token");
        return Some(token.to_string());
    }

    if let Some(token) = global_token.filter(|t| !t.is_empty()) {
        debug!("using configured token");
        return Some(token.to_string());
    }

    match get_gh_token().await {
        Ok(token) => token,
        Err(error) => {
            debug!(%error, "gh CLI token lookup failed");
            None
        }
    }
}

/// Reads a token from `gh auth token`.
///
/// Returns `Ok(None)` when `gh` is not installed or not logged in.
///
/// # Errors
///
/// Returns an error if `gh` cannot be spawned, or exits unsuccessfully for
/// a reason other than being logged out.
pub async fn get_gh_token() -> Result<Option<String>> {
    use tokio::process::Command;

    let output = match Command::new("gh").args(["auth", "token"]).output().await {
        Ok(output) => output,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(ConfigError::GhAuthFailed(e)),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        if stderr.contains("not logged in") || stderr.contains("no oauth token") {
            return Ok(None);
        }
        return Err(ConfigError::GhAuthError {
            code: output.status.code(),
            stderr,
        });
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(Some(token).filter(|t| !t.is_empty()))
}

impl Config {
    /// Resolves the token for this configuration's default repository.
    pub async fn resolve_token(&self) -> Option<String> {
        resolve_token(self.repository.as_ref(), self.github_token.as_deref()).await
    }
}
