//! Fluent issue queries.
//!
//! An [`IssueQuery`] collects filters and resolves them into one
//! `GET /repos/{owner}/{repo}/issues` request per terminal call. Setting a
//! filter twice keeps the last value.
//!
//! The API has no "updated before" filter, so [`IssueQuery::updated_before`]
//! is applied to the decoded page: it is never sent, and only issues with
//! `updated_at <= cutoff` are returned, in server order. Only the fetched
//! page is filtered.
//!
//! The issues endpoint also lists pull requests. Those entries are dropped,
//! so [`IssueQuery::count`] and friends only ever see issues.
//!
//! Filter values that fail validation (such as milestone `0`) are held
//! back and reported by the terminal call as [`Error::InvalidInput`].

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use issuekit_model::{Issue, State};
use tracing::{debug, instrument};

use crate::connector::Request;
use crate::context::RepoContext;
use crate::error::{Error, Result};
use crate::validation;

/// Largest page the API serves.
pub const MAX_PER_PAGE: u32 = 100;

/// Sort keys for issue listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSort {
    Created,
    Updated,
    Comments,
}

impl IssueSort {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Comments => "comments",
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// A query over a repository's issues.
///
/// ```
/// # use issuekit_github::IssueKit;
/// # use issuekit_github::connector::{Connector, ConnectorError, Request, Response};
/// # struct Offline;
/// # #[async_trait::async_trait]
/// # impl Connector for Offline {
/// #     async fn send(&self, _: Request) -> Result<Response, ConnectorError> {
/// #         Ok(Response::empty(204))
/// #     }
/// # }
/// # let repo = IssueKit::new(Offline).repository("o", "r").unwrap();
/// let query = repo
///     .query()
///     .assigned_to("octocat")
///     .label("bug")
///     .open()
///     .per_page(500);
///
/// let params = query.to_params();
/// assert!(params.contains(&("state".to_string(), "open".to_string())));
/// assert!(params.contains(&("labels".to_string(), "bug".to_string())));
/// assert!(params.contains(&("assignee".to_string(), "octocat".to_string())));
/// assert!(params.contains(&("per_page".to_string(), "100".to_string())));
/// ```
#[derive(Debug, Clone)]
pub struct IssueQuery {
    ctx: RepoContext,
    filters: BTreeMap<&'static str, String>,
    rejected: BTreeMap<&'static str, String>,
    updated_before: Option<DateTime<Utc>>,
}

impl IssueQuery {
    pub(crate) fn new(ctx: RepoContext) -> Self {
        Self {
            ctx,
            filters: BTreeMap::new(),
            rejected: BTreeMap::new(),
            updated_before: None,
        }
    }

    fn set(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.rejected.remove(key);
        self.filters.insert(key, value.into());
        self
    }

    fn reject(mut self, key: &'static str, error: &Error) -> Self {
        self.filters.remove(key);
        self.rejected.insert(key, error.message());
        self
    }

    /// Filters by state.
    #[must_use]
    pub fn state(self, state: State) -> Self {
        self.set("state", state.as_str())
    }

    #[must_use]
    pub fn open(self) -> Self {
        self.state(State::Open)
    }

    #[must_use]
    pub fn closed(self) -> Self {
        self.state(State::Closed)
    }

    /// Open and closed issues alike.
    #[must_use]
    pub fn all(self) -> Self {
        self.set("state", "all")
    }

    /// Issues carrying `label`.
    #[must_use]
    pub fn label(self, label: impl Into<String>) -> Self {
        self.labels([label])
    }

    /// Issues carrying every label in `labels`. Blank names are skipped.
    #[must_use]
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let joined = labels
            .into_iter()
            .map(|l| {
                let l: String = l.into();
                l.trim().to_string()
            })
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(",");
        if joined.is_empty() {
            self.filters.remove("labels");
            self
        } else {
            self.set("labels", joined)
        }
    }

    #[must_use]
    pub fn assigned_to(self, login: impl Into<String>) -> Self {
        self.set("assignee", login)
    }

    /// Issues nobody is assigned to.
    #[must_use]
    pub fn unassigned(self) -> Self {
        self.set("assignee", "none")
    }

    /// Issues with at least one assignee.
    #[must_use]
    pub fn assigned(self) -> Self {
        self.set("assignee", "*")
    }

    #[must_use]
    pub fn created_by(self, login: impl Into<String>) -> Self {
        self.set("creator", login)
    }

    #[must_use]
    pub fn mentioning(self, login: impl Into<String>) -> Self {
        self.set("mentioned", login)
    }

    /// Issues in milestone `number`. Zero is rejected when the query runs.
    #[must_use]
    pub fn milestone(self, number: u64) -> Self {
        match validation::id("milestone", number) {
            Ok(number) => self.set("milestone", number.to_string()),
            Err(err) => self.reject("milestone", &err),
        }
    }

    #[must_use]
    pub fn no_milestone(self) -> Self {
        self.set("milestone", "none")
    }

    #[must_use]
    pub fn any_milestone(self) -> Self {
        self.set("milestone", "*")
    }

    /// Issues updated at or after `since`.
    #[must_use]
    pub fn since(self, since: DateTime<Utc>) -> Self {
        self.set("since", since.to_rfc3339_opts(SecondsFormat::Secs, true))
    }

    /// Issues updated at or before `cutoff`, filtered after the fetch.
    #[must_use]
    pub fn updated_before(mut self, cutoff: DateTime<Utc>) -> Self {
        self.updated_before = Some(cutoff);
        self
    }

    /// Issues not updated in the last `days` days.
    #[must_use]
    pub fn older(self, days: u32) -> Self {
        self.updated_before(Utc::now() - Duration::days(i64::from(days)))
    }

    #[must_use]
    pub fn sort(self, sort: IssueSort, direction: Direction) -> Self {
        self.set("sort", sort.as_str())
            .set("direction", direction.as_str())
    }

    #[must_use]
    pub fn newest(self) -> Self {
        self.sort(IssueSort::Created, Direction::Desc)
    }

    #[must_use]
    pub fn oldest(self) -> Self {
        self.sort(IssueSort::Created, Direction::Asc)
    }

    #[must_use]
    pub fn recently_updated(self) -> Self {
        self.sort(IssueSort::Updated, Direction::Desc)
    }

    /// Page size, clamped to `1..=100`.
    #[must_use]
    pub fn per_page(self, per_page: u32) -> Self {
        self.set("per_page", per_page.clamp(1, MAX_PER_PAGE).to_string())
    }

    /// One-based page number.
    #[must_use]
    pub fn page(self, page: u32) -> Self {
        self.set("page", page.max(1).to_string())
    }

    /// The parameters that will be sent, sorted by name.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    /// The client-side cutoff, if any.
    #[must_use]
    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.updated_before
    }

    /// Runs the query and returns the matching issues in server order,
    /// without pull requests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a rejected filter value, or the
    /// classified API error if the request fails.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn get(&self) -> Result<Vec<Issue>> {
        if let Some((field, message)) = self.rejected.iter().next() {
            return Err(Error::invalid(*field, message.clone()));
        }

        let request = Request::get(self.ctx.path("/issues")).with_params(self.to_params());
        let issues: Vec<Issue> = self.ctx.fetch(request, None).await?;
        let fetched = issues.len();

        let cutoff = self.updated_before;
        let issues: Vec<Issue> = issues
            .into_iter()
            .filter(|issue| !issue.is_pull_request())
            .filter(|issue| cutoff.is_none_or(|cutoff| issue.updated_at <= cutoff))
            .collect();

        debug!(fetched, returned = issues.len(), "issue query resolved");
        Ok(issues)
    }

    /// The first matching issue. Still fetches a full page.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn first(&self) -> Result<Option<Issue>> {
        Ok(self.get().await?.into_iter().next())
    }

    /// Number of matching issues on the fetched page.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn count(&self) -> Result<usize> {
        Ok(self.get().await?.len())
    }

    /// Whether any issue matches.
    ///
    /// # Errors
    ///
    /// See [`get`](Self::get).
    pub async fn exists(&self) -> Result<bool> {
        Ok(self.first().await?.is_some())
    }
}
