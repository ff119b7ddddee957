//! Error types and response classification.
//!
//! Every failed API response is turned into exactly one [`Error`] by
//! [`classify`]. Precedence, first match wins:
//!
//! | Status | Condition | Error |
//! |--------|-----------|-------|
//! | 2xx | | none |
//! | 404 | issue number in scope | [`Error::IssueNotFound`] |
//! | 404 | otherwise | [`Error::RepositoryNotFound`] |
//! | 422 | | [`Error::Validation`] |
//! | 403, 429 | `X-RateLimit-Remaining: 0` | [`Error::RateLimitExceeded`] |
//! | anything else | | [`Error::Api`] |
//!
//! A 403 or 429 with quota left is not a rate limit (abuse detection,
//! missing scopes) and is reported as [`Error::Api`].

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::connector::{ConnectorError, Headers, Response};

const REMAINING_HEADER: &str = "x-ratelimit-remaining";
const RESET_HEADER: &str = "x-ratelimit-reset";
const LIMIT_HEADER: &str = "x-ratelimit-limit";

/// Where a failed request was aimed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestScope {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub issue_number: Option<u64>,
}

impl RequestScope {
    /// A scope naming a repository.
    #[must_use]
    pub fn repository(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: Some(owner.into()),
            repo: Some(repo.into()),
            issue_number: None,
        }
    }

    /// Narrows the scope to one issue.
    #[must_use]
    pub fn with_issue(mut self, number: impl Into<Option<u64>>) -> Self {
        self.issue_number = number.into();
        self
    }
}

/// Structured details attached to every API-originated error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub issue_number: Option<u64>,
    pub status: u16,
    pub headers: Headers,
}

/// A failed response together with the message extracted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    pub message: String,
    pub status: u16,
    pub context: ErrorContext,
    /// The raw response, for introspection.
    pub response: Response,
}

impl ApiFailure {
    fn new(response: Response, scope: &RequestScope, message: Option<String>, fallback: &str) -> Box<Self> {
        Box::new(Self {
            message: message.unwrap_or_else(|| fallback.to_string()),
            status: response.status,
            context: ErrorContext {
                owner: scope.owner.clone(),
                repo: scope.repo.clone(),
                issue_number: scope.issue_number,
                status: response.status,
                headers: response.headers.clone(),
            },
            response,
        })
    }
}

/// Errors that can occur during GitHub API operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An argument was rejected before any request was sent.
    #[error("invalid {field}: {message}")]
    InvalidInput {
        /// The offending field or parameter.
        field: String,
        /// What is wrong with it.
        message: String,
    },

    /// 404 outside of an issue scope.
    #[error("{} (HTTP {})", .0.message, .0.status)]
    RepositoryNotFound(Box<ApiFailure>),

    /// 404 for a specific issue.
    #[error("{} (HTTP {})", .0.message, .0.status)]
    IssueNotFound(Box<ApiFailure>),

    /// 422: the server rejected the payload.
    #[error("{} (HTTP {})", .failure.message, .failure.status)]
    Validation {
        failure: Box<ApiFailure>,
        /// The `errors` array of the response, empty if absent.
        errors: Vec<Value>,
    },

    /// 403/429 with no quota remaining.
    #[error("{}{}", .failure.message, format_reset(*.reset_at))]
    RateLimitExceeded {
        failure: Box<ApiFailure>,
        /// Unix timestamp at which the quota resets.
        reset_at: Option<i64>,
        remaining: Option<u64>,
        limit: Option<u64>,
    },

    /// Any other failure status.
    #[error("GitHub API error: {} (HTTP {})", .0.message, .0.status)]
    Api(Box<ApiFailure>),

    /// Token validation failed.
    #[error("token validation failed: {reason}")]
    TokenValidation {
        /// A description of why validation failed.
        reason: String,
    },

    /// No response was received.
    #[error(transparent)]
    Transport(#[from] ConnectorError),

    /// A successful response did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
}

fn format_reset(reset_at: Option<i64>) -> String {
    reset_at
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|at| format!(", resets at {}", at.to_rfc3339()))
        .unwrap_or_default()
}

impl Error {
    /// Shorthand for [`Error::InvalidInput`].
    #[must_use]
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The failed response behind an API-originated error.
    #[must_use]
    pub fn failure(&self) -> Option<&ApiFailure> {
        match self {
            Self::RepositoryNotFound(failure)
            | Self::IssueNotFound(failure)
            | Self::Api(failure)
            | Self::Validation { failure, .. }
            | Self::RateLimitExceeded { failure, .. } => Some(failure),
            _ => None,
        }
    }

    /// Numeric code: the HTTP status for API errors, `400` for rejected
    /// input, `401` for a rejected token and `0` when no usable response
    /// was received.
    #[must_use]
    pub fn code(&self) -> u16 {
        match self {
            Self::InvalidInput { .. } => 400,
            Self::TokenValidation { .. } => 401,
            Self::Transport(_) | Self::Decode(_) => 0,
            other => other.failure().map_or(0, |f| f.status),
        }
    }

    /// The context map of an API-originated error.
    #[must_use]
    pub fn context(&self) -> Option<&ErrorContext> {
        self.failure().map(|f| &f.context)
    }

    /// The raw response of an API-originated error.
    #[must_use]
    pub fn response(&self) -> Option<&Response> {
        self.failure().map(|f| &f.response)
    }

    /// The human-readable message, without status decoration.
    #[must_use]
    pub fn message(&self) -> String {
        match (self, self.failure()) {
            (_, Some(failure)) => failure.message.clone(),
            (Self::InvalidInput { message, .. }, None) => message.clone(),
            (other, None) => other.to_string(),
        }
    }

    /// Per-field details of a [`Error::Validation`].
    #[must_use]
    pub fn validation_errors(&self) -> &[Value] {
        match self {
            Self::Validation { errors, .. } => errors,
            _ => &[],
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RepositoryNotFound(_) | Self::IssueNotFound(_))
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
    }

    /// When the rate limit resets, if this is a rate-limit error with a
    /// known reset time.
    #[must_use]
    pub fn reset_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::RateLimitExceeded {
                reset_at: Some(ts), ..
            } => DateTime::from_timestamp(*ts, 0),
            _ => None,
        }
    }

    /// Seconds until the rate limit resets, never negative.
    #[must_use]
    pub fn seconds_until_reset(&self) -> Option<u64> {
        self.seconds_until_reset_at(Utc::now().timestamp())
    }

    /// Like [`seconds_until_reset`](Self::seconds_until_reset) against an
    /// explicit `now` (Unix seconds).
    #[must_use]
    pub fn seconds_until_reset_at(&self, now: i64) -> Option<u64> {
        match self {
            Self::RateLimitExceeded {
                reset_at: Some(reset_at),
                ..
            } => Some(u64::try_from(reset_at.saturating_sub(now)).unwrap_or(0)),
            _ => None,
        }
    }
}

/// A specialized Result type for GitHub API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Passes successful responses through and turns failures into an
/// [`Error`].
///
/// # Errors
///
/// Returns the classified error for any non-2xx response.
///
/// # Examples
///
/// ```
/// use issuekit_github::connector::Response;
/// use issuekit_github::error::{Error, RequestScope, classify};
///
/// let scope = RequestScope::repository("octocat", "hello").with_issue(5);
/// let response = Response::from_json(404, &serde_json::json!({"message": "Not Found"}));
///
/// let err = classify(response, &scope).unwrap_err();
/// assert!(matches!(err, Error::IssueNotFound(_)));
/// assert_eq!(err.code(), 404);
/// assert_eq!(err.context().unwrap().issue_number, Some(5));
/// ```
pub fn classify(response: Response, scope: &RequestScope) -> Result<Response> {
    if response.is_success() {
        return Ok(response);
    }

    let body = response.json_value();
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_owned);

    let error = match response.status {
        404 if scope.issue_number.is_some() => {
            Error::IssueNotFound(ApiFailure::new(response, scope, message, "Issue not found"))
        }
        404 => Error::RepositoryNotFound(ApiFailure::new(
            response,
            scope,
            message,
            "Repository not found",
        )),
        422 => {
            let errors = match body.get("errors") {
                Some(Value::Array(errors)) => errors.clone(),
                _ => Vec::new(),
            };
            Error::Validation {
                failure: ApiFailure::new(response, scope, message, "Validation failed"),
                errors,
            }
        }
        403 | 429 if header_number::<u64>(&response, REMAINING_HEADER) == Some(0) => {
            let reset_at = header_number(&response, RESET_HEADER);
            let limit = header_number(&response, LIMIT_HEADER);
            Error::RateLimitExceeded {
                failure: ApiFailure::new(response, scope, message, "API rate limit exceeded"),
                reset_at,
                remaining: Some(0),
                limit,
            }
        }
        _ => Error::Api(ApiFailure::new(
            response,
            scope,
            message,
            "Unknown GitHub API error",
        )),
    };

    Err(error)
}

fn header_number<T: FromStr>(response: &Response, name: &str) -> Option<T> {
    response.header(name).and_then(|v| v.trim().parse().ok())
}
