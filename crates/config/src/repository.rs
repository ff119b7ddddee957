//! The default repository context.
//!
//! A [`Repository`] names the `owner/repo` pair a client works against when
//! the caller does not pass one explicitly. It accepts several textual forms:
//!
//! - `"owner/repo"`
//! - `"https://github.com/owner/repo"` (optionally ending in `.git` or `/`)
//! - `"git@github.com:owner/repo.git"`
//!
//! and an object form carrying a repository-specific token:
//! `{ "owner": "...", "repo": "...", "token": "..." }`.
//!
//! # Examples
//!
//! ```
//! use issuekit_config::Repository;
//!
//! let repo: Repository = "https://github.com/octocat/hello-world.git".parse().unwrap();
//! assert_eq!(repo.full_name(), "octocat/hello-world");
//!
//! let repo: Repository = serde_json::from_str(r#"{"owner": "org", "repo": "tools"}"#).unwrap();
//! assert_eq!(repo.to_string(), "org/tools");
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConfigError, Result};

const HTTPS_PREFIXES: &[&str] = &["https://github.com/", "http://github.com/"];
const SSH_PREFIX: &str = "git@github.com:";

/// An `owner/repo` pair with an optional repository-specific token.
///
/// Only the shape is checked here; character rules for owner and repository
/// names are enforced by the client when a repository context is opened.
#[derive(Clone, PartialEq, Eq)]
pub struct Repository {
    owner: String,
    repo: String,
    token: Option<String>,
}

impl Repository {
    /// Creates a repository reference without a token.
    #[must_use]
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            token: None,
        }
    }

    /// Creates a repository reference that carries its own token.
    ///
    /// ```
    /// use issuekit_config::Repository;
    ///
    /// let repo = Repository::with_token("org", "repo", "ghp_xxx");
    /// assert_eq!(repo.token(), Some("ghp_xxx"));
    /// ```
    #[must_use]
    pub fn with_token(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            token: Some(token.into()),
            ..Self::new(owner, repo)
        }
    }

    /// Parses any of the supported textual forms.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRepository`] when the input does not
    /// reduce to exactly two non-empty path segments.
    ///
    /// ```
    /// use issuekit_config::Repository;
    ///
    /// assert!(Repository::parse("git@github.com:octocat/hello.git").is_ok());
    /// assert!(Repository::parse("octocat").is_err());
    /// assert!(Repository::parse("a/b/c").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        let path = HTTPS_PREFIXES
            .iter()
            .chain(std::iter::once(&SSH_PREFIX))
            .find_map(|prefix| trimmed.strip_prefix(prefix))
            .unwrap_or(trimmed);
        let path = path.trim_end_matches('/');
        let path = path.strip_suffix(".git").unwrap_or(path);

        let (owner, repo) = path.split_once('/').ok_or_else(|| {
            ConfigError::InvalidRepository(format!("expected 'owner/repo', got '{input}'"))
        })?;
        let (owner, repo) = (owner.trim(), repo.trim());

        if repo.contains('/') {
            return Err(ConfigError::InvalidRepository(format!(
                "too many path segments in '{input}'"
            )));
        }
        if owner.is_empty() || repo.is_empty() {
            return Err(ConfigError::InvalidRepository(format!(
                "owner and repo cannot be empty in '{input}'"
            )));
        }

        Ok(Self::new(owner, repo))
    }

    /// Returns the repository owner.
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the repository name.
    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// Returns the repository-specific token, if configured.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Returns `"owner/repo"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

impl fmt::Display for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

// The token never appears in debug output.
impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl FromStr for Repository {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Repository {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match &self.token {
            None => serializer.collect_str(self),
            Some(token) => {
                use serde::ser::SerializeStruct;
                let mut state = serializer.serialize_struct("Repository", 3)?;
                state.serialize_field("owner", &self.owner)?;
                state.serialize_field("repo", &self.repo)?;
                state.serialize_field("token", token)?;
                state.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Repository {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, MapAccess, Visitor};

        struct RepositoryVisitor;

        impl<'de> Visitor<'de> for RepositoryVisitor {
            type Value = Repository;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str(
                    "an 'owner/repo' string, a GitHub URL, or an object with owner and repo",
                )
            }

            fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
            where
                E: de::Error,
            {
                Repository::parse(v).map_err(de::Error::custom)
            }

            fn visit_map<M>(self, mut map: M) -> std::result::Result<Self::Value, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut owner: Option<String> = None;
                let mut repo: Option<String> = None;
                let mut token: Option<String> = None;

                while let Some(key) = map.next_key::<String>()? {
                    let slot = match key.as_str() {
                        "owner" => &mut owner,
                        "repo" => &mut repo,
                        "token" => &mut token,
                        _ => {
                            let _: de::IgnoredAny = map.next_value()?;
                            continue;
                        }
                    };
                    if slot.is_some() {
                        return Err(de::Error::custom(format_args!("duplicate field `{key}`")));
                    }
                    *slot = Some(map.next_value()?);
                }

                let owner = owner.ok_or_else(|| de::Error::missing_field("owner"))?;
                let repo = repo.ok_or_else(|| de::Error::missing_field("repo"))?;
                Ok(Repository { owner, repo, token })
            }
        }

        deserializer.deserialize_any(RepositoryVisitor)
    }
}
