//! Octocrab-backed [`Connector`].
//!
//! [`GitHubClient`] owns an authenticated (or anonymous) [`Octocrab`]
//! instance and sends raw [`Request`]s through it. Octocrab supplies
//! authentication, the HTTP stack and TLS; status codes are left alone and
//! interpreted later by [`classify`](crate::error::classify).

use std::time::Duration;

use async_trait::async_trait;
use issuekit_config::{Config, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use octocrab::Octocrab;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, instrument, warn};

use crate::connector::{Connector, ConnectorError, Request, Response};
use crate::error::{Error, RequestScope, Result, classify};

/// Media type sent when a request does not ask for another one.
pub const DEFAULT_ACCEPT: &str = "application/vnd.github+json";

/// GitHub API client with optional authentication.
///
/// Authenticated clients have higher rate limits (5,000 req/hour vs 60
/// req/hour) and can access private repositories.
///
/// # Security
///
/// Tokens are stored using [`SecretString`] to prevent accidental logging
/// or exposure in debug output.
///
/// # Examples
///
/// ```no_run
/// use secrecy::SecretString;
/// use issuekit_github::{GitHubClient, IssueKit};
///
/// # async fn example() -> issuekit_github::Result<()> {
/// let token = SecretString::from("ghp_your_token".to_string());
/// let client = GitHubClient::new(Some(token)).await?;
///
/// if client.validate_token().await? {
///     let kit = IssueKit::new(client);
///     let open = kit.repository("rust-lang", "rust")?.query().open().count().await?;
///     println!("{open} open issues on the first page");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GitHubClient {
    inner: Octocrab,
    authenticated: bool,
    base_url: String,
    timeout: Duration,
}

impl GitHubClient {
    /// Creates a client for `api.github.com` with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the octocrab client fails to initialize.
    pub async fn new(token: Option<SecretString>) -> Result<Self> {
        Self::with_options(
            token,
            DEFAULT_BASE_URL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
        .await
    }

    /// Creates a client for `base_url` (e.g. a GitHub Enterprise API root).
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid URI or the octocrab
    /// client fails to initialize.
    #[instrument(skip(token), fields(authenticated = token.is_some()))]
    pub async fn with_options(
        token: Option<SecretString>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let builder = Octocrab::builder()
            .base_uri(base_url.as_str())
            .map_err(build_error)?;

        let (inner, authenticated) = match token {
            Some(token) => {
                debug!("creating authenticated GitHub client");
                let client = builder
                    .personal_token(token.expose_secret())
                    .build()
                    .map_err(build_error)?;
                (client, true)
            }
            None => {
                debug!("creating unauthenticated GitHub client");
                (builder.build().map_err(build_error)?, false)
            }
        };

        Ok(Self {
            inner,
            authenticated,
            base_url,
            timeout,
        })
    }

    /// Creates a client from a loaded [`Config`], resolving the token from
    /// the repository entry, the global setting or the `gh` CLI.
    ///
    /// # Errors
    ///
    /// See [`with_options`](Self::with_options).
    pub async fn from_config(config: &Config) -> Result<Self> {
        let token = config.resolve_token().await.map(SecretString::from);
        Self::with_options(token, config.api_base(), config.timeout()).await
    }

    /// Validates the current token by calling `/user`.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if authenticated and the token is valid
    /// - `Ok(false)` if not authenticated (no token provided)
    ///
    /// # Errors
    ///
    /// Returns [`Error::TokenValidation`] if GitHub rejects the token (401),
    /// or the classified error for any other failure.
    #[instrument(skip(self))]
    pub async fn validate_token(&self) -> Result<bool> {
        if !self.authenticated {
            debug!("client is not authenticated, skipping validation");
            return Ok(false);
        }

        debug!("validating token by calling /user endpoint");
        let response = self.send(Request::get("/user")).await?;
        if response.status == 401 {
            let reason = response
                .json_value()
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or("Bad credentials")
                .to_string();
            warn!(%reason, "token validation failed");
            return Err(Error::TokenValidation { reason });
        }

        classify(response, &RequestScope::default())?;
        debug!("token validated successfully");
        Ok(true)
    }

    /// Returns the authentication state at creation time. Use
    /// [`validate_token`](Self::validate_token) to check the token is still
    /// accepted.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// The API root every request path is joined to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns a reference to the underlying octocrab client, for
    /// endpoints this crate does not wrap.
    #[must_use]
    pub fn inner(&self) -> &Octocrab {
        &self.inner
    }

    async fn dispatch(&self, request: Request) -> std::result::Result<Response, ConnectorError> {
        let mut builder = http::Request::builder()
            .method(request.method.as_str())
            .uri(request.url(&self.base_url));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if request.header("accept").is_none() {
            builder = builder.header(http::header::ACCEPT, DEFAULT_ACCEPT);
        }

        let http_request = self
            .inner
            .build_request(builder, request.body.as_ref())
            .map_err(|e| ConnectorError::Build(e.to_string()))?;

        let response = self
            .inner
            .execute(http_request)
            .await
            .map_err(|e| ConnectorError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let body = self
            .inner
            .body_to_string(response)
            .await
            .map_err(|e| ConnectorError::Http(e.to_string()))?;

        Ok(Response::new(status, headers, body.into_bytes()))
    }
}

#[async_trait]
impl Connector for GitHubClient {
    #[instrument(
        level = "debug",
        skip(self, request),
        fields(method = %request.method, path = %request.path)
    )]
    async fn send(&self, request: Request) -> std::result::Result<Response, ConnectorError> {
        let response = tokio::time::timeout(self.timeout, self.dispatch(request))
            .await
            .map_err(|_| ConnectorError::Timeout(self.timeout))??;
        debug!(status = response.status, "response received");
        Ok(response)
    }
}

fn build_error(e: octocrab::Error) -> Error {
    Error::Transport(ConnectorError::Build(e.to_string()))
}
