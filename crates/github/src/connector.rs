//! The HTTP boundary every API call goes through.
//!
//! Managers never talk to the network directly. They build a [`Request`],
//! hand it to a [`Connector`], and receive a [`Response`] carrying the raw
//! status, headers and body. [`GitHubClient`](crate::GitHubClient) is the
//! production connector; tests use
//! [`MockConnector`](crate::mock::MockConnector).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Characters left as-is in path segments and query components (RFC 3986
/// unreserved set).
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// HTTP verbs used by the Issues API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header name/value pairs.
pub type Headers = Vec<(String, String)>;

/// An outbound API request, relative to the connector's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: HttpMethod,
    /// Absolute path starting with `/`, segments already encoded.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: Headers,
    pub body: Option<Value>,
}

impl Request {
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Appends one query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Appends every query parameter in `params`.
    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.query.extend(params);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Returns the first query value named `name`.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first header matching `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    /// Joins `base` with the path and the percent-encoded query string.
    ///
    /// ```
    /// use issuekit_github::connector::Request;
    ///
    /// let request = Request::get("/repos/o/r/issues")
    ///     .with_query("labels", "bug,help wanted")
    ///     .with_query("state", "open");
    /// assert_eq!(
    ///     request.url("https://api.github.com/"),
    ///     "https://api.github.com/repos/o/r/issues?labels=bug%2Chelp%20wanted&state=open"
    /// );
    /// ```
    #[must_use]
    pub fn url(&self, base: &str) -> String {
        let mut url = format!("{}{}", base.trim_end_matches('/'), self.path);
        for (i, (name, value)) in self.query.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(&encode_segment(name));
            url.push('=');
            url.push_str(&encode_segment(value));
        }
        url
    }
}

/// A response as returned by a [`Connector`], before any classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    /// Header names are lower-cased.
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Response {
    /// Builds a response, lower-casing header names.
    #[must_use]
    pub fn new<K, V>(status: u16, headers: impl IntoIterator<Item = (K, V)>, body: Vec<u8>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            status,
            headers: headers
                .into_iter()
                .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
                .collect(),
            body,
        }
    }

    /// A response with a JSON body.
    #[must_use]
    pub fn from_json(status: u16, body: &Value) -> Self {
        Self::new(
            status,
            [("content-type", "application/json")],
            body.to_string().into_bytes(),
        )
    }

    /// A response without a body, such as `204 No Content`.
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::new::<&str, String>(status, [], Vec::new())
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_ascii_lowercase(), value.into()));
        self
    }

    /// Returns `true` for any 2xx status.
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        header_get(&self.headers, name)
    }

    /// Decodes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns the decoder error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// Decodes the body leniently: empty or invalid bodies yield `Null`.
    #[must_use]
    pub fn json_value(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

/// Failures below the HTTP layer: nothing usable came back.
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    /// The underlying client could not be built or configured.
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    /// The request could not be sent or its body could not be read.
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// No response arrived within the configured timeout.
    #[error("request timed out after {} seconds", .0.as_secs())]
    Timeout(Duration),

    /// A mock connector had nothing queued for the request.
    #[error("no mock response registered for {method} {path}")]
    NoMockResponse {
        method: HttpMethod,
        path: String,
    },
}

/// Sends requests and returns raw responses.
///
/// Implementations must not interpret status codes: a `404` or `500` is a
/// successful send. Error mapping happens in
/// [`classify`](crate::error::classify).
#[async_trait]
pub trait Connector: Send + Sync {
    async fn send(&self, request: Request) -> Result<Response, ConnectorError>;
}

/// Returns the first header value matching `name` (case-insensitive).
#[must_use]
pub fn header_get<'a>(headers: &'a Headers, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Percent-encodes a single path segment or query component.
#[must_use]
pub fn encode_segment(raw: &str) -> String {
    utf8_percent_encode(raw, UNRESERVED).to_string()
}
