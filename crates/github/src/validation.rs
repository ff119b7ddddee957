//! Input checks run before any request is sent.
//!
//! Every rule fails with [`Error::InvalidInput`] naming the offending field.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use issuekit_model::ReactionContent;
use issuekit_model::label::{is_valid_color, normalize_color};
use regex::Regex;

use crate::error::{Error, Result};

pub const MAX_OWNER_LEN: usize = 39;
pub const MAX_REPO_LEN: usize = 100;
pub const MAX_TITLE_LEN: usize = 256;
pub const MAX_BODY_LEN: usize = 65_536;
pub const MAX_LABEL_NAME_LEN: usize = 50;
pub const MAX_LABEL_DESCRIPTION_LEN: usize = 100;

static OWNER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]*[A-Za-z0-9])?$").expect("owner pattern is valid")
});

/// Checks a user or organization name and returns it trimmed.
///
/// ```
/// use issuekit_github::validation::owner;
///
/// assert_eq!(owner(" octo-cat ").unwrap(), "octo-cat");
/// assert!(owner("-octocat").is_err());
/// assert!(owner("octo--cat").is_err());
/// ```
///
/// # Errors
///
/// Rejects empty names, names over 39 characters, names with characters
/// other than ASCII letters, digits and inner hyphens, and `--`.
pub fn owner(raw: &str) -> Result<String> {
    let value = non_empty("owner", raw)?;
    if value.chars().count() > MAX_OWNER_LEN {
        return Err(too_long("owner", MAX_OWNER_LEN));
    }
    if !OWNER_PATTERN.is_match(value) {
        return Err(Error::invalid(
            "owner",
            "may only contain alphanumeric characters or single hyphens, and cannot begin or end with a hyphen",
        ));
    }
    if value.contains("--") {
        return Err(Error::invalid("owner", "cannot contain consecutive hyphens"));
    }
    Ok(value.to_string())
}

/// Checks a repository name and returns it trimmed.
///
/// # Errors
///
/// Rejects empty names, names over 100 characters, and any character other
/// than ASCII letters, digits, `.`, `_` and `-`.
pub fn repository(raw: &str) -> Result<String> {
    let value = non_empty("repository", raw)?;
    if value.chars().count() > MAX_REPO_LEN {
        return Err(too_long("repository", MAX_REPO_LEN));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(Error::invalid(
            "repository",
            "may only contain alphanumeric characters, '.', '_' and '-'",
        ));
    }
    Ok(value.to_string())
}

/// Checks that a numeric identifier is at least 1.
///
/// # Errors
///
/// Rejects zero.
pub fn id(field: &str, value: u64) -> Result<u64> {
    if value == 0 {
        return Err(Error::invalid(field, "must be a positive integer"));
    }
    Ok(value)
}

/// Trims an issue title and checks its length.
///
/// # Errors
///
/// Rejects titles over 256 characters.
pub fn title(raw: &str) -> Result<String> {
    bounded("title", raw, MAX_TITLE_LEN)
}

/// Trims a Markdown body and checks its length.
///
/// # Errors
///
/// Rejects bodies over 65536 characters.
pub fn body(raw: &str) -> Result<String> {
    bounded("body", raw, MAX_BODY_LEN)
}

/// Checks a comment body: like [`body`], but it may not be blank.
///
/// # Errors
///
/// Rejects blank or over-long bodies.
pub fn comment_body(raw: &str) -> Result<String> {
    non_empty("body", raw)?;
    body(raw)
}

/// Trims every element of a label or assignee list.
///
/// # Errors
///
/// Rejects the list if any element is blank.
pub fn string_list<S: AsRef<str>>(field: &str, items: &[S]) -> Result<Vec<String>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let value = item.as_ref().trim();
            if value.is_empty() {
                Err(Error::invalid(
                    field,
                    format!("element {i} must be a non-empty string"),
                ))
            } else {
                Ok(value.to_string())
            }
        })
        .collect()
}

/// Parses a reaction token.
///
/// ```
/// use issuekit_github::validation::reaction_content;
/// use issuekit_model::ReactionContent;
///
/// assert_eq!(reaction_content("+1").unwrap(), ReactionContent::PlusOne);
/// assert!(reaction_content("").is_err());
/// assert!(reaction_content("thumbsup").is_err());
/// ```
///
/// # Errors
///
/// Rejects empty input and anything outside the eight GitHub tokens.
pub fn reaction_content(raw: &str) -> Result<ReactionContent> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(Error::invalid("content", "reaction content cannot be empty"));
    }
    value.parse().map_err(|_| {
        Error::invalid(
            "content",
            format!(
                "'{value}' is not a valid reaction; expected one of: {}",
                ReactionContent::VALUES.join(", ")
            ),
        )
    })
}

/// Parses a milestone due date.
///
/// Accepts RFC 3339 timestamps, `YYYY-MM-DDTHH:MM:SS` (taken as UTC) and
/// bare `YYYY-MM-DD` dates (midnight UTC).
///
/// # Errors
///
/// Rejects anything else with "must be a valid ISO 8601 date string".
pub fn due_on(raw: &str) -> Result<DateTime<Utc>> {
    parse_datetime(raw).ok_or_else(|| Error::invalid("due_on", "must be a valid ISO 8601 date string"))
}

/// Parses the date forms accepted by [`due_on`].
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let value = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Checks a repository label name.
///
/// # Errors
///
/// Rejects blank names and names over 50 characters.
pub fn label_name(raw: &str) -> Result<String> {
    non_empty("name", raw)?;
    bounded("name", raw, MAX_LABEL_NAME_LEN)
}

/// Normalizes a label color, dropping a leading `#`.
///
/// # Errors
///
/// Rejects anything but six hex digits.
pub fn label_color(raw: &str) -> Result<String> {
    let color = normalize_color(raw.trim());
    if !is_valid_color(&color) {
        return Err(Error::invalid(
            "color",
            format!("'{raw}' must be a 6-digit hex color"),
        ));
    }
    Ok(color)
}

/// Checks a label description.
///
/// # Errors
///
/// Rejects descriptions over 100 characters.
pub fn label_description(raw: &str) -> Result<String> {
    bounded("description", raw, MAX_LABEL_DESCRIPTION_LEN)
}

fn non_empty<'a>(field: &str, raw: &'a str) -> Result<&'a str> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(Error::invalid(field, "cannot be empty"));
    }
    Ok(value)
}

fn bounded(field: &str, raw: &str, max: usize) -> Result<String> {
    let value = raw.trim();
    if value.chars().count() > max {
        return Err(too_long(field, max));
    }
    Ok(value.to_string())
}

fn too_long(field: &str, max: usize) -> Error {
    Error::invalid(field, format!("must be at most {max} characters"))
}
