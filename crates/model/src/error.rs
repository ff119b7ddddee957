//! Error types for the issuekit-model crate.

use thiserror::Error;

/// Errors that can occur while converting value objects.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Failed to serialize a value object to JSON.
    #[error("failed to serialize to JSON: {0}")]
    SerializationFailed(#[source] serde_json::Error),

    /// Failed to build a value object from JSON.
    #[error("failed to deserialize from JSON: {0}")]
    DeserializationFailed(#[source] serde_json::Error),

    /// A string did not name a known enum member.
    #[error("invalid {kind} '{value}', expected one of: {expected}")]
    InvalidValue {
        /// What was being parsed (e.g. "state").
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// Comma-separated list of accepted values.
        expected: String,
    },
}

impl ModelError {
    pub(crate) fn invalid(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self::InvalidValue {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

/// A specialized Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
