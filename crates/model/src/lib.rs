//! Value objects for the GitHub Issues API.
//!
//! This crate defines the immutable records returned by the issuekit
//! managers. Every record is built fresh from a server response and can be
//! turned back into the JSON shape it came from.
//!
//! # Overview
//!
//! - [`user`]: Issue authors, assignees and event actors
//! - [`label`]: Repository labels
//! - [`milestone`]: Milestones and the open/closed [`State`]
//! - [`issue`]: Issues, [`StateReason`] and [`LockReason`]
//! - [`comment`]: Issue comments
//! - [`reaction`]: Reactions and the eight [`ReactionContent`] tokens
//! - [`event`]: Issue events and timeline entries
//! - [`record`]: The [`JsonRecord`] conversion trait
//!
//! # Examples
//!
//! ```
//! use issuekit_model::{Issue, JsonRecord};
//!
//! let value = serde_json::json!({
//!     "id": 1,
//!     "number": 42,
//!     "title": "Crash on start",
//!     "state": "open",
//!     "created_at": "2024-01-01T00:00:00Z",
//!     "updated_at": "2024-01-02T00:00:00Z",
//!     "html_url": "https://github.com/o/r/issues/42",
//!     "url": "https://api.github.com/repos/o/r/issues/42",
//!     "user": { "id": 7, "login": "octocat" }
//! });
//!
//! let issue = Issue::from_value(value).unwrap();
//! assert_eq!(issue.number, 42);
//! assert!(issue.is_open());
//! ```

pub mod comment;
pub mod error;
pub mod event;
pub mod issue;
pub mod label;
pub mod milestone;
pub mod reaction;
pub mod record;
pub mod user;

#[cfg(test)]
mod strategies;

// Re-export primary types at crate root for convenience
pub use comment::Comment;
pub use error::{ModelError, Result};
pub use event::{CrossReference, EventKind, EventLabel, IssueEvent, IssueReference, Rename, TimelineEvent};
pub use issue::{Issue, LockReason, PullRequestRef, StateReason};
pub use label::Label;
pub use milestone::{Milestone, State};
pub use reaction::{Reaction, ReactionContent};
pub use record::JsonRecord;
pub use user::User;
