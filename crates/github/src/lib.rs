//! GitHub Issues REST API client.
//!
//! This crate turns the Issues API into typed calls: every argument is
//! checked before a request leaves the process, every failed response is
//! classified into an [`Error`] variant, and every success is decoded into
//! an [`issuekit_model`] value object.
//!
//! # Overview
//!
//! - [`IssueKit`]: Entry point owning the [`Connector`]
//! - [`RepoContext`]: One validated repository, handing out managers
//! - [`IssueManager`], [`IssueLabelManager`], [`LabelManager`],
//!   [`CommentManager`], [`MilestoneManager`], [`ReactionManager`],
//!   [`EventManager`]: One manager per resource
//! - [`IssueQuery`]: Fluent issue filters, including the client-side
//!   `updated_before`
//! - [`IssueHandle`]: A cached view of one issue
//! - [`BatchRunner`]: Sequential operations with per-item outcomes
//! - [`GitHubClient`]: The octocrab-backed connector
//! - [`Error`]: Classified failures
//!
//! # Authentication
//!
//! - **Authenticated**: 5,000 requests/hour, access to private repos
//! - **Unauthenticated**: 60 requests/hour, public repos only
//!
//! Tokens are handled with [`secrecy::SecretString`] so they never end up
//! in logs.
//!
//! # Examples
//!
//! ```no_run
//! use issuekit_config::Config;
//! use issuekit_github::{IssueKit, IssueUpdate, StateReason};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load().await?;
//! let kit = IssueKit::from_config(&config).await?;
//! let repo = kit.repository("octocat", "hello-world")?;
//!
//! let issue = repo
//!     .issues()
//!     .create(IssueUpdate::new().title("Crash on start").labels(["bug"]))
//!     .await?;
//!
//! let stale = repo.query().open().label("needs-info").older(30).get().await?;
//! for old in &stale {
//!     repo.issues().close(old.number, Some(StateReason::NotPlanned)).await?;
//! }
//! # let _ = issue;
//! # Ok(())
//! # }
//! ```
//!
//! Testing against canned responses:
//!
//! ```ignore
//! use issuekit_github::{IssueKit, connector::HttpMethod, mock::MockConnector};
//!
//! let mock = MockConnector::new();
//! mock.push_status(HttpMethod::Delete, "/repos/o/r/labels/stale", 404);
//!
//! let repo = IssueKit::new(mock.clone()).repository("o", "r")?;
//! assert!(!repo.repo_labels().delete("stale").await?);
//! ```

pub mod batch;
pub mod client;
pub mod comments;
pub mod connector;
pub mod context;
pub mod error;
pub mod events;
pub mod handle;
pub mod issue_labels;
pub mod issues;
pub mod labels;
pub mod milestones;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod payload;
pub mod query;
pub mod reactions;
pub mod validation;

pub use batch::{BatchEntry, BatchOutcome, BatchReport, BatchRunner};
pub use client::GitHubClient;
pub use comments::CommentManager;
pub use connector::{Connector, ConnectorError, HttpMethod, Request, Response};
pub use context::{IssueKit, RepoContext};
pub use error::{ApiFailure, Error, ErrorContext, Result};
pub use events::EventManager;
pub use handle::IssueHandle;
pub use issue_labels::IssueLabelManager;
pub use issues::IssueManager;
pub use labels::LabelManager;
pub use milestones::MilestoneManager;
pub use payload::{IssueChanges, IssueUpdate, LabelPayload, MilestoneChange, MilestonePayload};
pub use query::{Direction, IssueQuery, IssueSort};
pub use reactions::ReactionManager;

pub use issuekit_model::{LockReason, ReactionContent, State, StateReason};

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the manager tests.

    use serde_json::{Value, json};

    use crate::context::{IssueKit, RepoContext};
    use crate::mock::MockConnector;

    /// A context for `octocat/hello` backed by `mock`.
    pub fn repo_with(mock: MockConnector) -> (MockConnector, RepoContext) {
        let repo = IssueKit::new(mock.clone())
            .repository("octocat", "hello")
            .expect("fixture names are valid");
        (mock, repo)
    }

    fn user_json(id: u64, login: &str) -> Value {
        json!({"id": id, "login": login, "type": "User"})
    }

    /// An open issue last updated at `updated_at`.
    pub fn issue_json(number: u64, updated_at: &str) -> Value {
        json!({
            "id": 1000 + number,
            "number": number,
            "title": format!("Issue {number}"),
            "state": "open",
            "locked": false,
            "labels": [],
            "assignees": [],
            "comments": 0,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": updated_at,
            "html_url": format!("https://github.com/octocat/hello/issues/{number}"),
            "url": format!("https://api.github.com/repos/octocat/hello/issues/{number}"),
            "user": user_json(1, "octocat"),
        })
    }

    /// [`issue_json`] with the fields of `overrides` replaced.
    pub fn issue_with(number: u64, overrides: Value) -> Value {
        let mut issue = issue_json(number, "2024-01-02T00:00:00Z");
        if let (Value::Object(base), Value::Object(extra)) = (&mut issue, overrides) {
            base.extend(extra);
        }
        issue
    }

    pub fn label_json(name: &str) -> Value {
        json!({"id": name.len() as u64 + 100, "name": name, "color": "ededed"})
    }

    pub fn comment_json(id: u64, body: &str) -> Value {
        json!({
            "id": id,
            "body": body,
            "user": user_json(2, "hubot"),
            "created_at": "2024-01-03T00:00:00Z",
            "updated_at": "2024-01-03T00:00:00Z",
            "html_url": format!("https://github.com/octocat/hello/issues/1#issuecomment-{id}"),
        })
    }

    pub fn reaction_json(id: u64, content: &str) -> Value {
        json!({
            "id": id,
            "content": content,
            "user": user_json(2, "hubot"),
            "created_at": "2024-01-04T00:00:00Z",
        })
    }

    pub fn milestone_json(number: u64, state: &str) -> Value {
        json!({
            "id": 500 + number,
            "number": number,
            "title": format!("v{number}.0"),
            "state": state,
            "open_issues": 1,
            "closed_issues": 2,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-05T00:00:00Z",
            "html_url": format!("https://github.com/octocat/hello/milestone/{number}"),
            "creator": user_json(1, "octocat"),
        })
    }

    pub fn event_json(id: u64, event: &str) -> Value {
        json!({
            "id": id,
            "event": event,
            "actor": user_json(1, "octocat"),
            "created_at": "2024-01-06T00:00:00Z",
        })
    }
}
