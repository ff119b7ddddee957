//! Issues and their state-related enums.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::label::Label;
use crate::milestone::State;
use crate::record::JsonRecord;
use crate::user::User;

/// Why an issue was closed (or reopened).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StateReason {
    /// The work was done.
    Completed,
    /// The issue will not be worked on.
    NotPlanned,
    /// A closed issue was opened again.
    Reopened,
}

impl StateReason {
    /// Every accepted wire value, in documentation order.
    pub const VALUES: [&'static str; 3] = ["completed", "not_planned", "reopened"];

    /// The wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::NotPlanned => "not_planned",
            Self::Reopened => "reopened",
        }
    }
}

impl fmt::Display for StateReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateReason {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "not_planned" => Ok(Self::NotPlanned),
            "reopened" => Ok(Self::Reopened),
            other => Err(ModelError::invalid("state_reason", other, &Self::VALUES)),
        }
    }
}

/// Reason given when locking an issue's conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockReason {
    /// Comments drifted away from the topic.
    #[serde(rename = "off-topic")]
    OffTopic,
    /// The discussion became heated.
    #[serde(rename = "too heated")]
    TooHeated,
    /// The conversation is resolved.
    #[serde(rename = "resolved")]
    Resolved,
    /// Spam.
    #[serde(rename = "spam")]
    Spam,
}

impl LockReason {
    /// Every accepted wire value.
    pub const VALUES: [&'static str; 4] = ["off-topic", "too heated", "resolved", "spam"];

    /// The wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OffTopic => "off-topic",
            Self::TooHeated => "too heated",
            Self::Resolved => "resolved",
            Self::Spam => "spam",
        }
    }
}

impl FromStr for LockReason {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off-topic" => Ok(Self::OffTopic),
            "too heated" => Ok(Self::TooHeated),
            "resolved" => Ok(Self::Resolved),
            "spam" => Ok(Self::Spam),
            other => Err(ModelError::invalid("lock_reason", other, &Self::VALUES)),
        }
    }
}

/// Marker the issues endpoints attach to entries that are pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// REST resource URL of the pull request.
    #[serde(default)]
    pub url: String,
    /// Web page URL of the pull request.
    #[serde(default)]
    pub html_url: String,
}

/// A GitHub issue.
///
/// The milestone is kept as its title only; the API's full milestone
/// object is reduced on parse.
///
/// # Examples
///
/// ```
/// use issuekit_model::{Issue, JsonRecord, State};
///
/// let issue = Issue::from_value(serde_json::json!({
///     "id": 1,
///     "number": 7,
///     "title": "Docs typo",
///     "state": "closed",
///     "state_reason": "completed",
///     "milestone": { "id": 4, "number": 1, "title": "v1.0" },
///     "created_at": "2024-01-01T00:00:00Z",
///     "updated_at": "2024-01-02T00:00:00Z",
///     "closed_at": "2024-01-02T00:00:00Z",
///     "html_url": "https://github.com/o/r/issues/7",
///     "url": "https://api.github.com/repos/o/r/issues/7",
///     "user": { "id": 7, "login": "octocat" }
/// }))
/// .unwrap();
///
/// assert_eq!(issue.state, State::Closed);
/// assert_eq!(issue.milestone.as_deref(), Some("v1.0"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Numeric issue ID.
    pub id: u64,
    /// Repository-scoped issue number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Markdown body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Open or closed.
    pub state: State,
    /// Why the issue reached its current state, as sent by the server.
    ///
    /// Kept raw so values newer than [`StateReason`] (e.g. `"duplicate"`)
    /// still decode; see [`Issue::reason`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<String>,
    /// Whether the conversation is locked.
    #[serde(default)]
    pub locked: bool,
    /// Assigned users, in server order.
    #[serde(default)]
    pub assignees: Vec<User>,
    /// Applied labels, in server order.
    #[serde(default)]
    pub labels: Vec<Label>,
    /// Title of the milestone the issue belongs to.
    #[serde(
        default,
        with = "crate::milestone::title_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub milestone: Option<String>,
    /// Number of comments.
    #[serde(default)]
    pub comments: u64,
    /// When the issue was opened.
    pub created_at: DateTime<Utc>,
    /// When the issue was last modified.
    pub updated_at: DateTime<Utc>,
    /// When the issue was closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Web page URL.
    #[serde(default)]
    pub html_url: String,
    /// REST resource URL.
    #[serde(rename = "url", default)]
    pub api_url: String,
    /// Reason the conversation was locked, raw; see [`Issue::lock_reason`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_lock_reason: Option<String>,
    /// Who opened the issue.
    #[serde(rename = "user")]
    pub author: User,
    /// Primary assignee.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    /// Who closed the issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_by: Option<User>,
    /// Set when the entry is a pull request rather than an issue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_request: Option<PullRequestRef>,
}

impl Issue {
    /// Returns `true` if the issue is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == State::Open
    }

    /// Returns `true` if the issue is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Returns `true` if the entry is a pull request.
    #[must_use]
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Returns `true` if a label with this name is applied.
    #[must_use]
    pub fn has_label(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }

    /// Returns `true` if the given login is among the assignees.
    #[must_use]
    pub fn is_assigned_to(&self, login: &str) -> bool {
        self.assignees.iter().any(|u| u.login == login)
    }

    /// The state reason, if it is one of the [`StateReason`] values.
    #[must_use]
    pub fn reason(&self) -> Option<StateReason> {
        self.state_reason.as_deref().and_then(|r| r.parse().ok())
    }

    /// The lock reason, if it is one of the [`LockReason`] values.
    #[must_use]
    pub fn lock_reason(&self) -> Option<LockReason> {
        self.active_lock_reason.as_deref().and_then(|r| r.parse().ok())
    }

    /// Label names, in server order.
    #[must_use]
    pub fn label_names(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.name.as_str()).collect()
    }
}

impl JsonRecord for Issue {}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::strategies::{arb_label, arb_text, arb_timestamp, arb_user};
    use proptest::prelude::*;

    fn arb_state_reason() -> impl Strategy<Value = Option<String>> {
        proptest::option::of(
            prop::sample::select(vec!["completed", "not_planned", "reopened", "duplicate"])
                .prop_map(str::to_string),
        )
    }

    prop_compose! {
        fn arb_issue()(
            number in 1u64..100_000,
            title in "[a-zA-Z][a-zA-Z0-9 ]{0,60}",
            body in proptest::option::of(arb_text()),
            state in any::<State>(),
            (state_reason, locked) in (arb_state_reason(), any::<bool>()),
            (labels, assignees) in (
                proptest::collection::vec(arb_label(), 0..4),
                proptest::collection::vec(arb_user(), 0..3),
            ),
            (milestone, comments) in (proptest::option::of("v[0-9]\\.[0-9]"), 0u64..500),
            (author, closed_by) in (arb_user(), proptest::option::of(arb_user())),
            (created_at, updated_at, closed_at) in (
                arb_timestamp(),
                arb_timestamp(),
                proptest::option::of(arb_timestamp()),
            ),
            is_pull_request in any::<bool>(),
        ) -> Issue {
            Issue {
                id: number * 10,
                number,
                title,
                body,
                state,
                state_reason,
                active_lock_reason: locked.then(|| "resolved".to_string()),
                locked,
                assignee: assignees.first().cloned(),
                assignees,
                labels,
                milestone,
                comments,
                created_at,
                updated_at,
                closed_at,
                html_url: format!("https://github.com/o/r/issues/{number}"),
                api_url: format!("https://api.github.com/repos/o/r/issues/{number}"),
                author,
                closed_by,
                pull_request: is_pull_request.then(|| PullRequestRef {
                    url: format!("https://api.github.com/repos/o/r/pulls/{number}"),
                    html_url: format!("https://github.com/o/r/pull/{number}"),
                }),
            }
        }
    }

    proptest! {
        /// Tests that an issue survives a trip through its JSON map unchanged.
        #[test]
        fn issue_roundtrip(issue in arb_issue()) {
            let value = issue.to_value().expect("serialize");
            let parsed = Issue::from_value(value).expect("deserialize");
            prop_assert_eq!(parsed, issue);
        }

        /// Tests that open/closed predicates are mutually exclusive.
        #[test]
        fn open_and_closed_are_exclusive(issue in arb_issue()) {
            prop_assert!(issue.is_open() != issue.is_closed());
        }

        /// Tests that the typed reason agrees with the raw one when known.
        #[test]
        fn reason_matches_raw_value(issue in arb_issue()) {
            let typed = issue.reason().map(StateReason::as_str);
            match issue.state_reason.as_deref() {
                Some("duplicate") | None => prop_assert_eq!(typed, None),
                raw => prop_assert_eq!(typed, raw),
            }
        }
    }
}
