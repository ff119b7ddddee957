//! Issue operations.

use issuekit_model::{Issue, LockReason, State, StateReason};
use serde_json::json;
use tracing::{debug, instrument};

use crate::batch::{BatchReport, BatchRunner};
use crate::connector::Request;
use crate::context::RepoContext;
use crate::error::{Error, Result};
use crate::payload::{IssueChanges, IssueUpdate};
use crate::query::IssueQuery;
use crate::validation;

/// Issues of one repository.
#[derive(Debug, Clone)]
pub struct IssueManager {
    ctx: RepoContext,
}

impl IssueManager {
    pub(crate) fn new(ctx: RepoContext) -> Self {
        Self { ctx }
    }

    /// The repository this manager works on.
    #[must_use]
    pub fn context(&self) -> &RepoContext {
        &self.ctx
    }

    fn issue_path(&self, number: u64, tail: &str) -> String {
        self.ctx.path(&format!("/issues/{number}{tail}"))
    }

    /// Starts a filtered listing.
    #[must_use]
    pub fn query(&self) -> IssueQuery {
        self.ctx.query()
    }

    /// The first page of open issues.
    ///
    /// # Errors
    ///
    /// Returns the classified API error if the request fails.
    pub async fn list(&self) -> Result<Vec<Issue>> {
        self.query().get().await
    }

    /// Fetches one issue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IssueNotFound`] for an unknown number.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn get(&self, number: u64) -> Result<Issue> {
        let number = validation::id("issue_number", number)?;
        self.ctx
            .fetch(Request::get(self.issue_path(number, "")), Some(number))
            .await
    }

    /// Opens a new issue. `issue.title` is required.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a missing or invalid title, or the
    /// classified API error.
    #[instrument(skip(self, issue), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn create(&self, issue: IssueUpdate) -> Result<Issue> {
        let issue = issue.sanitized()?;
        if issue.title.as_deref().is_none_or(str::is_empty) {
            return Err(Error::invalid("title", "is required to create an issue"));
        }

        let request = Request::post(self.ctx.path("/issues")).with_json(issue.to_value());
        let created: Issue = self.ctx.fetch(request, None).await?;
        debug!(number = created.number, "created issue");
        Ok(created)
    }

    /// Applies a partial update (`PATCH`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for invalid fields, or the classified
    /// API error.
    #[instrument(skip(self, update), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn update(&self, number: u64, update: IssueUpdate) -> Result<Issue> {
        let number = validation::id("issue_number", number)?;
        let update = update.sanitized()?;
        let request = Request::patch(self.issue_path(number, "")).with_json(update.to_value());
        self.ctx.fetch(request, Some(number)).await
    }

    /// Closes an issue, optionally recording why.
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn close(&self, number: u64, reason: Option<StateReason>) -> Result<Issue> {
        let mut update = IssueUpdate::new().state(State::Closed);
        update.state_reason = reason;
        self.update(number, update).await
    }

    /// Reopens a closed issue.
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn reopen(&self, number: u64) -> Result<Issue> {
        self.update(number, IssueUpdate::new().state(State::Open)).await
    }

    /// Locks the conversation and returns the refreshed issue.
    ///
    /// # Errors
    ///
    /// Returns the classified API error.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn lock(&self, number: u64, reason: Option<LockReason>) -> Result<Issue> {
        let number = validation::id("issue_number", number)?;
        let mut request = Request::put(self.issue_path(number, "/lock"));
        if let Some(reason) = reason {
            request = request.with_json(json!({ "lock_reason": reason.as_str() }));
        }
        self.ctx.execute(request, Some(number)).await?;
        self.get(number).await
    }

    /// Unlocks the conversation and returns the refreshed issue.
    ///
    /// # Errors
    ///
    /// Returns the classified API error.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn unlock(&self, number: u64) -> Result<Issue> {
        let number = validation::id("issue_number", number)?;
        self.ctx
            .execute(Request::delete(self.issue_path(number, "/lock")), Some(number))
            .await?;
        self.get(number).await
    }

    /// Adds labels, keeping existing ones.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for blank names, or the classified
    /// API error.
    pub async fn add_labels<S: AsRef<str>>(&self, number: u64, labels: &[S]) -> Result<Issue> {
        self.ctx.labels().add(number, labels).await?;
        self.get(number).await
    }

    /// Replaces every label.
    ///
    /// # Errors
    ///
    /// See [`add_labels`](Self::add_labels).
    pub async fn set_labels<S: AsRef<str>>(&self, number: u64, labels: &[S]) -> Result<Issue> {
        self.ctx.labels().replace(number, labels).await?;
        self.get(number).await
    }

    /// Removes one label. Removing a label the issue does not carry is not
    /// an error.
    ///
    /// # Errors
    ///
    /// See [`add_labels`](Self::add_labels).
    pub async fn remove_label(&self, number: u64, label: &str) -> Result<Issue> {
        self.ctx.labels().remove(number, label).await?;
        self.get(number).await
    }

    /// Removes several labels, one request each.
    ///
    /// # Errors
    ///
    /// See [`add_labels`](Self::add_labels).
    pub async fn remove_labels<S: AsRef<str>>(&self, number: u64, labels: &[S]) -> Result<Issue> {
        self.ctx.labels().remove_many(number, labels).await?;
        self.get(number).await
    }

    /// Removes every label.
    ///
    /// # Errors
    ///
    /// Returns the classified API error.
    pub async fn clear_labels(&self, number: u64) -> Result<Issue> {
        self.ctx.labels().clear(number).await?;
        self.get(number).await
    }

    /// Adds assignees.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for blank logins, or the classified
    /// API error.
    #[instrument(skip(self, assignees), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn add_assignees<S: AsRef<str>>(&self, number: u64, assignees: &[S]) -> Result<Issue> {
        let number = validation::id("issue_number", number)?;
        let assignees = validation::string_list("assignees", assignees)?;
        let request = Request::post(self.issue_path(number, "/assignees"))
            .with_json(json!({ "assignees": assignees }));
        self.ctx.fetch(request, Some(number)).await
    }

    /// Removes assignees.
    ///
    /// # Errors
    ///
    /// See [`add_assignees`](Self::add_assignees).
    #[instrument(skip(self, assignees), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn remove_assignees<S: AsRef<str>>(&self, number: u64, assignees: &[S]) -> Result<Issue> {
        let number = validation::id("issue_number", number)?;
        let assignees = validation::string_list("assignees", assignees)?;
        let request = Request::delete(self.issue_path(number, "/assignees"))
            .with_json(json!({ "assignees": assignees }));
        self.ctx.fetch(request, Some(number)).await
    }

    /// Applies a composite change set.
    ///
    /// Steps run in order (state, fields, labels added, labels removed,
    /// labels replaced, assignees added, assignees removed), each only if
    /// present. The issue returned by the last step that ran is returned;
    /// when nothing ran, the issue is fetched.
    ///
    /// # Errors
    ///
    /// Stops at the first failing step and returns its error.
    #[instrument(skip(self, changes), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn apply(&self, number: u64, changes: IssueChanges) -> Result<Issue> {
        let mut last = None;

        match changes.state {
            Some(State::Closed) => last = Some(self.close(number, changes.state_reason).await?),
            Some(State::Open) => last = Some(self.reopen(number).await?),
            None => {}
        }
        if !changes.fields.is_empty() {
            last = Some(self.update(number, changes.fields).await?);
        }
        if let Some(labels) = &changes.add_labels {
            last = Some(self.add_labels(number, labels).await?);
        }
        if let Some(labels) = &changes.remove_labels {
            last = Some(self.remove_labels(number, labels).await?);
        }
        if let Some(labels) = &changes.set_labels {
            last = Some(self.set_labels(number, labels).await?);
        }
        if let Some(assignees) = &changes.add_assignees {
            last = Some(self.add_assignees(number, assignees).await?);
        }
        if let Some(assignees) = &changes.remove_assignees {
            last = Some(self.remove_assignees(number, assignees).await?);
        }

        match last {
            Some(issue) => Ok(issue),
            None => self.get(number).await,
        }
    }

    /// Closes each issue in turn. Failures are recorded, not propagated.
    pub async fn close_many(
        &self,
        numbers: impl IntoIterator<Item = u64>,
        reason: Option<StateReason>,
    ) -> BatchReport<u64, Issue> {
        BatchRunner::new()
            .run(numbers, move |number| self.close(number, reason))
            .await
    }

    /// Reopens each issue in turn. Failures are recorded, not propagated.
    pub async fn reopen_many(&self, numbers: impl IntoIterator<Item = u64>) -> BatchReport<u64, Issue> {
        BatchRunner::new()
            .run(numbers, move |number| self.reopen(number))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::HttpMethod;
    use crate::mock::MockConnector;
    use crate::test_support::{issue_json, issue_with, label_json, repo_with};
    use serde_json::json;

    const ISSUE_5: &str = "/repos/octocat/hello/issues/5";

    #[tokio::test]
    async fn create_sends_sanitized_body() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_json(
            HttpMethod::Post,
            "/repos/octocat/hello/issues",
            201,
            issue_with(12, json!({"title": "Test"})),
        );

        let issue = repo
            .issues()
            .create(IssueUpdate::new().title("  Test ").labels(["bug"]))
            .await
            .unwrap();

        assert_eq!(issue.number, 12);
        assert!(issue.is_open());
        let body = mock.last_request().unwrap().body.unwrap();
        assert_eq!(body, json!({"title": "Test", "labels": ["bug"]}));
    }

    #[tokio::test]
    async fn create_requires_title() {
        let (mock, repo) = repo_with(MockConnector::new());
        let err = repo.issues().create(IssueUpdate::new().body("x")).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "title"));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn get_maps_404_to_issue_not_found() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_json(HttpMethod::Get, ISSUE_5, 404, json!({"message": "Not Found"}));

        let err = repo.issues().get(5).await.unwrap_err();
        assert!(matches!(err, Error::IssueNotFound(_)));
        assert_eq!(err.context().unwrap().issue_number, Some(5));
    }

    #[tokio::test]
    async fn zero_is_rejected_before_sending() {
        let (mock, repo) = repo_with(MockConnector::new());
        assert!(repo.issues().get(0).await.is_err());
        assert!(repo.issues().close(0, None).await.is_err());
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn close_then_reopen() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_json(
            HttpMethod::Patch,
            ISSUE_5,
            200,
            issue_with(5, json!({"state": "closed", "state_reason": "completed"})),
        );
        mock.push_json(
            HttpMethod::Patch,
            ISSUE_5,
            200,
            issue_with(5, json!({"state": "open", "state_reason": "reopened"})),
        );

        let issues = repo.issues();
        let closed = issues.close(5, Some(StateReason::Completed)).await.unwrap();
        assert!(closed.is_closed());
        let reopened = issues.reopen(5).await.unwrap();
        assert_eq!(reopened.state, State::Open);

        let requests = mock.requests();
        assert_eq!(
            requests[0].body,
            Some(json!({"state": "closed", "state_reason": "completed"}))
        );
        assert_eq!(requests[1].body, Some(json!({"state": "open"})));
    }

    #[tokio::test]
    async fn lock_with_reason_then_refetch() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_status(HttpMethod::Put, format!("{ISSUE_5}/lock"), 204);
        mock.push_json(
            HttpMethod::Get,
            ISSUE_5,
            200,
            issue_with(5, json!({"locked": true, "active_lock_reason": "too heated"})),
        );

        let issue = repo.issues().lock(5, Some(LockReason::TooHeated)).await.unwrap();
        assert!(issue.locked);
        assert_eq!(
            mock.requests()[0].body,
            Some(json!({"lock_reason": "too heated"}))
        );
    }

    #[tokio::test]
    async fn unlock_uses_delete() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_status(HttpMethod::Delete, format!("{ISSUE_5}/lock"), 204);
        mock.push_json(HttpMethod::Get, ISSUE_5, 200, issue_json(5, "2024-01-01T00:00:00Z"));

        let issue = repo.issues().unlock(5).await.unwrap();
        assert!(!issue.locked);
        assert_eq!(mock.requests()[0].method, HttpMethod::Delete);
    }

    #[tokio::test]
    async fn add_then_clear_labels() {
        let (mock, repo) = repo_with(MockConnector::new());
        let labels_path = format!("{ISSUE_5}/labels");
        mock.push_json(
            HttpMethod::Post,
            &labels_path,
            200,
            json!([label_json("bug"), label_json("urgent")]),
        );
        mock.push_json(
            HttpMethod::Get,
            ISSUE_5,
            200,
            issue_with(5, json!({"labels": [label_json("bug"), label_json("urgent")]})),
        );
        mock.push_status(HttpMethod::Delete, &labels_path, 204);
        mock.push_json(HttpMethod::Get, ISSUE_5, 200, issue_with(5, json!({"labels": []})));

        let issues = repo.issues();
        let labelled = issues.add_labels(5, &["bug", "urgent"]).await.unwrap();
        assert_eq!(labelled.label_names(), vec!["bug", "urgent"]);

        let cleared = issues.clear_labels(5).await.unwrap();
        assert!(cleared.labels.is_empty());
    }

    #[tokio::test]
    async fn assignees_round_trip() {
        let (mock, repo) = repo_with(MockConnector::new());
        let path = format!("{ISSUE_5}/assignees");
        mock.push_json(
            HttpMethod::Post,
            &path,
            201,
            issue_with(5, json!({"assignees": [{"id": 1, "login": "octocat"}]})),
        );
        mock.push_json(HttpMethod::Delete, &path, 200, issue_with(5, json!({"assignees": []})));

        let issues = repo.issues();
        let assigned = issues.add_assignees(5, &[" octocat "]).await.unwrap();
        assert!(assigned.is_assigned_to("octocat"));
        assert_eq!(mock.requests()[0].body, Some(json!({"assignees": ["octocat"]})));

        let unassigned = issues.remove_assignees(5, &["octocat"]).await.unwrap();
        assert!(unassigned.assignees.is_empty());
    }

    #[tokio::test]
    async fn apply_runs_steps_in_order_and_returns_last() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_json(HttpMethod::Patch, ISSUE_5, 200, issue_with(5, json!({"state": "closed"})));
        mock.push_json(
            HttpMethod::Patch,
            ISSUE_5,
            200,
            issue_with(5, json!({"state": "closed", "title": "Renamed"})),
        );
        mock.push_json(
            HttpMethod::Post,
            format!("{ISSUE_5}/assignees"),
            201,
            issue_with(5, json!({"state": "closed", "title": "Renamed", "assignees": [{"id": 2, "login": "hubot"}]})),
        );

        let changes = IssueChanges::new()
            .add_assignees(["hubot"])
            .fields(IssueUpdate::new().title("Renamed"))
            .close(Some(StateReason::NotPlanned));
        let issue = repo.issues().apply(5, changes).await.unwrap();

        assert!(issue.is_assigned_to("hubot"));
        let methods: Vec<HttpMethod> = mock.requests().iter().map(|r| r.method).collect();
        assert_eq!(methods, vec![HttpMethod::Patch, HttpMethod::Patch, HttpMethod::Post]);
        assert_eq!(
            mock.requests()[0].body,
            Some(json!({"state": "closed", "state_reason": "not_planned"}))
        );
    }

    #[tokio::test]
    async fn apply_with_no_changes_fetches() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_json(HttpMethod::Get, ISSUE_5, 200, issue_json(5, "2024-01-01T00:00:00Z"));

        let issue = repo.issues().apply(5, IssueChanges::new()).await.unwrap();
        assert_eq!(issue.number, 5);
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn close_many_records_each_outcome() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_json(HttpMethod::Patch, "/repos/octocat/hello/issues/1", 200, issue_with(1, json!({"state": "closed"})));
        mock.push_json(HttpMethod::Patch, "/repos/octocat/hello/issues/2", 404, json!({"message": "Not Found"}));
        mock.push_json(HttpMethod::Patch, "/repos/octocat/hello/issues/3", 200, issue_with(3, json!({"state": "closed"})));

        let report = repo.issues().close_many([1, 2, 3], None).await;
        assert_eq!(report.len(), 3);
        assert_eq!(report.success_count(), 2);
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.entries()[1].item, 2);
        assert!(report.entries()[1].outcome.is_failure());
    }
}
