//! issuekit - a typed client for the GitHub Issues REST API.
//!
//! This crate re-exports the workspace crates under one name:
//!
//! - [`model`]: Value objects (issues, labels, milestones, comments...)
//! - [`config`]: File and environment configuration, token resolution
//! - [`github`]: The connector, error classifier, validators and managers
//!
//! # Examples
//!
//! ```no_run
//! use issuekit::{Config, IssueKit};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load().await?;
//! let kit = IssueKit::from_config(&config).await?;
//!
//! let repo = kit.default_repository()?;
//! for issue in repo.query().open().assigned_to("octocat").newest().get().await? {
//!     println!("#{} {}", issue.number, issue.title);
//! }
//! # Ok(())
//! # }
//! ```

pub use issuekit_config as config;
pub use issuekit_github as github;
pub use issuekit_model as model;

pub use issuekit_config::{Config, Repository};
pub use issuekit_github::{
    BatchReport, BatchRunner, Error, GitHubClient, IssueChanges, IssueKit, IssueQuery, IssueUpdate,
    LabelPayload, MilestonePayload, RepoContext, Result,
};
pub use issuekit_model::{
    Comment, Issue, IssueEvent, Label, LockReason, Milestone, Reaction, ReactionContent, State,
    StateReason, TimelineEvent, User,
};
