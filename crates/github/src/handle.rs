//! A lazily-fetched, cached view of one issue.
//!
//! ```no_run
//! # async fn example(repo: issuekit_github::RepoContext) -> issuekit_github::Result<()> {
//! let mut issue = repo.issue(42)?;
//!
//! // First access fetches, later ones hit the cache.
//! println!("{}", issue.get().await?.title);
//! println!("{} labels", issue.get().await?.labels.len());
//!
//! // Mutations replace the cached copy with GitHub's response.
//! issue.close(None).await?;
//! assert!(issue.cached().is_some_and(|i| i.is_closed()));
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use issuekit_model::{Comment, Issue, LockReason, StateReason};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::issues::IssueManager;
use crate::payload::{IssueChanges, IssueUpdate};

#[derive(Debug, Clone)]
struct Cached {
    issue: Issue,
    cached_at: DateTime<Utc>,
}

/// Handle on one issue number. Created by
/// [`RepoContext::issue`](crate::RepoContext::issue).
#[derive(Debug, Clone)]
pub struct IssueHandle {
    manager: IssueManager,
    number: u64,
    cache: Option<Cached>,
}

impl IssueHandle {
    pub(crate) fn new(manager: IssueManager, number: u64) -> Self {
        Self {
            manager,
            number,
            cache: None,
        }
    }

    #[must_use]
    pub fn number(&self) -> u64 {
        self.number
    }

    /// The cached issue, fetching it on first access.
    ///
    /// # Errors
    ///
    /// Returns the classified API error if the fetch fails.
    pub async fn get(&mut self) -> Result<&Issue> {
        if let Some(cached) = self.cache.take() {
            return Ok(&self.cache.insert(cached).issue);
        }
        self.refresh().await
    }

    /// Re-fetches the issue, replacing the cache.
    ///
    /// # Errors
    ///
    /// Returns the classified API error; the cache is left empty.
    #[instrument(skip(self), fields(number = self.number))]
    pub async fn refresh(&mut self) -> Result<&Issue> {
        self.cache = None;
        let issue = self.manager.get(self.number).await?;
        debug!("refreshed issue");
        Ok(self.store(issue))
    }

    /// The cached issue without any request.
    #[must_use]
    pub fn cached(&self) -> Option<&Issue> {
        self.cache.as_ref().map(|c| &c.issue)
    }

    /// When the cache was last filled.
    #[must_use]
    pub fn cached_at(&self) -> Option<DateTime<Utc>> {
        self.cache.as_ref().map(|c| c.cached_at)
    }

    /// Returns `true` if nothing is cached or the copy is older than
    /// `max_age`.
    #[must_use]
    pub fn is_stale(&self, max_age: Duration) -> bool {
        let Some(cached) = &self.cache else {
            return true;
        };
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return false;
        };
        Utc::now() - cached.cached_at > max_age
    }

    /// Drops the cached copy.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    fn store(&mut self, issue: Issue) -> &Issue {
        &self
            .cache
            .insert(Cached {
                issue,
                cached_at: Utc::now(),
            })
            .issue
    }

    /// See [`IssueManager::update`].
    ///
    /// # Errors
    ///
    /// Returns the underlying error; the cache is unchanged.
    pub async fn update(&mut self, update: IssueUpdate) -> Result<&Issue> {
        let issue = self.manager.update(self.number, update).await?;
        Ok(self.store(issue))
    }

    /// See [`IssueManager::close`].
    ///
    /// # Errors
    ///
    /// Returns the underlying error; the cache is unchanged.
    pub async fn close(&mut self, reason: Option<StateReason>) -> Result<&Issue> {
        let issue = self.manager.close(self.number, reason).await?;
        Ok(self.store(issue))
    }

    /// See [`IssueManager::reopen`].
    ///
    /// # Errors
    ///
    /// Returns the underlying error; the cache is unchanged.
    pub async fn reopen(&mut self) -> Result<&Issue> {
        let issue = self.manager.reopen(self.number).await?;
        Ok(self.store(issue))
    }

    /// See [`IssueManager::lock`].
    ///
    /// # Errors
    ///
    /// Returns the underlying error; the cache is unchanged.
    pub async fn lock(&mut self, reason: Option<LockReason>) -> Result<&Issue> {
        let issue = self.manager.lock(self.number, reason).await?;
        Ok(self.store(issue))
    }

    /// See [`IssueManager::unlock`].
    ///
    /// # Errors
    ///
    /// Returns the underlying error; the cache is unchanged.
    pub async fn unlock(&mut self) -> Result<&Issue> {
        let issue = self.manager.unlock(self.number).await?;
        Ok(self.store(issue))
    }

    /// See [`IssueManager::add_labels`].
    ///
    /// # Errors
    ///
    /// Returns the underlying error; the cache is unchanged.
    pub async fn add_labels<S: AsRef<str>>(&mut self, labels: &[S]) -> Result<&Issue> {
        let issue = self.manager.add_labels(self.number, labels).await?;
        Ok(self.store(issue))
    }

    /// See [`IssueManager::apply`].
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing step; the cache is dropped
    /// since earlier steps may already have been applied.
    pub async fn apply(&mut self, changes: IssueChanges) -> Result<&Issue> {
        self.cache = None;
        let issue = self.manager.apply(self.number, changes).await?;
        Ok(self.store(issue))
    }

    /// Posts a comment. The cached issue's comment count is now stale, so
    /// the cache is dropped.
    ///
    /// # Errors
    ///
    /// See [`CommentManager::create`](crate::CommentManager::create).
    pub async fn comment(&mut self, body: &str) -> Result<Comment> {
        let comment = self
            .manager
            .context()
            .comments()
            .create(self.number, body)
            .await?;
        self.invalidate();
        Ok(comment)
    }
}
