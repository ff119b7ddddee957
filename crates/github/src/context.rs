//! Entry point and per-repository context.
//!
//! [`IssueKit`] owns the connector. [`IssueKit::repository`] checks the
//! owner and repository names once and returns a [`RepoContext`], a cheap
//! clone that hands out one manager per resource. Every request made by a
//! manager goes through [`RepoContext::execute`], which sends it and runs
//! the response through [`classify`].

use std::fmt;
use std::sync::Arc;

use issuekit_config::{Config, Repository};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

use crate::client::GitHubClient;
use crate::comments::CommentManager;
use crate::connector::{Connector, Request, Response, encode_segment};
use crate::error::{Error, RequestScope, Result, classify};
use crate::events::EventManager;
use crate::handle::IssueHandle;
use crate::issue_labels::IssueLabelManager;
use crate::issues::IssueManager;
use crate::labels::LabelManager;
use crate::milestones::MilestoneManager;
use crate::query::IssueQuery;
use crate::reactions::ReactionManager;
use crate::validation;

/// The client facade.
///
/// ```
/// use issuekit_github::IssueKit;
/// # use issuekit_github::connector::{Connector, ConnectorError, Request, Response};
/// # struct Offline;
/// # #[async_trait::async_trait]
/// # impl Connector for Offline {
/// #     async fn send(&self, _: Request) -> Result<Response, ConnectorError> {
/// #         Ok(Response::empty(204))
/// #     }
/// # }
///
/// let kit = IssueKit::new(Offline);
/// let repo = kit.repository("rust-lang", "rust").unwrap();
/// assert_eq!(repo.full_name(), "rust-lang/rust");
///
/// assert!(kit.repository("bad--owner", "rust").is_err());
/// ```
#[derive(Clone)]
pub struct IssueKit {
    connector: Arc<dyn Connector>,
    default_repository: Option<Repository>,
}

impl IssueKit {
    /// Wraps a connector.
    #[must_use]
    pub fn new(connector: impl Connector + 'static) -> Self {
        Self::from_arc(Arc::new(connector))
    }

    /// Wraps a shared connector.
    #[must_use]
    pub fn from_arc(connector: Arc<dyn Connector>) -> Self {
        Self {
            connector,
            default_repository: None,
        }
    }

    /// Builds an octocrab-backed client from `config`, resolving the token
    /// and keeping the configured default repository.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let client = GitHubClient::from_config(config).await?;
        Ok(Self::new(client).with_default_repository(config.repository.clone()))
    }

    /// Sets the repository used by [`default_repository`](Self::default_repository).
    #[must_use]
    pub fn with_default_repository(mut self, repository: Option<Repository>) -> Self {
        self.default_repository = repository;
        self
    }

    /// The shared connector.
    #[must_use]
    pub fn connector(&self) -> &Arc<dyn Connector> {
        &self.connector
    }

    /// Opens a repository context.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if either name is malformed.
    pub fn repository(&self, owner: &str, repo: &str) -> Result<RepoContext> {
        let owner = validation::owner(owner)?;
        let repo = validation::repository(repo)?;
        Ok(RepoContext {
            connector: Arc::clone(&self.connector),
            owner: owner.into(),
            repo: repo.into(),
        })
    }

    /// Opens the configured default repository.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for field `repository` when none is
    /// configured, or if its names are malformed.
    pub fn default_repository(&self) -> Result<RepoContext> {
        let repository = self
            .default_repository
            .as_ref()
            .ok_or_else(|| Error::invalid("repository", "no default repository is configured"))?;
        self.repository(repository.owner(), repository.repo())
    }
}

impl fmt::Debug for IssueKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssueKit")
            .field("default_repository", &self.default_repository)
            .finish_non_exhaustive()
    }
}

/// A validated `owner/repo` pair bound to a connector.
#[derive(Clone)]
pub struct RepoContext {
    connector: Arc<dyn Connector>,
    owner: Arc<str>,
    repo: Arc<str>,
}

impl RepoContext {
    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    #[must_use]
    pub fn repo(&self) -> &str {
        &self.repo
    }

    /// `"owner/repo"`.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    #[must_use]
    pub fn issues(&self) -> IssueManager {
        IssueManager::new(self.clone())
    }

    /// Labels applied to individual issues.
    #[must_use]
    pub fn labels(&self) -> IssueLabelManager {
        IssueLabelManager::new(self.clone())
    }

    /// Labels defined on the repository.
    #[must_use]
    pub fn repo_labels(&self) -> LabelManager {
        LabelManager::new(self.clone())
    }

    #[must_use]
    pub fn comments(&self) -> CommentManager {
        CommentManager::new(self.clone())
    }

    #[must_use]
    pub fn milestones(&self) -> MilestoneManager {
        MilestoneManager::new(self.clone())
    }

    #[must_use]
    pub fn reactions(&self) -> ReactionManager {
        ReactionManager::new(self.clone())
    }

    #[must_use]
    pub fn events(&self) -> EventManager {
        EventManager::new(self.clone())
    }

    /// Starts an issue query.
    #[must_use]
    pub fn query(&self) -> IssueQuery {
        IssueQuery::new(self.clone())
    }

    /// A lazily-fetched handle on one issue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `number` is zero.
    pub fn issue(&self, number: u64) -> Result<IssueHandle> {
        let number = validation::id("issue_number", number)?;
        Ok(IssueHandle::new(self.issues(), number))
    }

    /// `/repos/{owner}/{repo}` followed by `tail`.
    pub(crate) fn path(&self, tail: &str) -> String {
        format!(
            "/repos/{}/{}{tail}",
            encode_segment(&self.owner),
            encode_segment(&self.repo)
        )
    }

    pub(crate) fn scope(&self, issue_number: Option<u64>) -> RequestScope {
        RequestScope::repository(&*self.owner, &*self.repo).with_issue(issue_number)
    }

    /// Sends `request` and classifies the response.
    ///
    /// `issue_number` decides whether a 404 means the issue or the
    /// repository is missing.
    #[instrument(
        level = "debug",
        skip(self, request),
        fields(method = %request.method, path = %request.path)
    )]
    pub(crate) async fn execute(&self, request: Request, issue_number: Option<u64>) -> Result<Response> {
        let response = self.connector.send(request).await.map_err(|e| {
            warn!(error = %e, "request failed before a response arrived");
            Error::from(e)
        })?;
        debug!(status = response.status, "received response");

        classify(response, &self.scope(issue_number)).inspect_err(|e| {
            warn!(code = e.code(), error = %e, "API request failed");
        })
    }

    /// Like [`execute`](Self::execute), decoding the body.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        request: Request,
        issue_number: Option<u64>,
    ) -> Result<T> {
        self.execute(request, issue_number)
            .await?
            .json()
            .map_err(Error::Decode)
    }

    /// For deletions: any 2xx is `true`, 404 is `false`, every other
    /// status is classified.
    pub(crate) async fn execute_bool(&self, request: Request, issue_number: Option<u64>) -> Result<bool> {
        match self.execute(request, issue_number).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => {
                debug!("target not found, reporting false");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }
}

impl fmt::Debug for RepoContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoContext")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::HttpMethod;
    use crate::mock::MockConnector;
    use serde_json::json;

    #[test]
    fn repository_trims_and_validates() {
        let kit = IssueKit::new(MockConnector::new());
        let repo = kit.repository(" octocat ", " hello-world ").unwrap();
        assert_eq!(repo.owner(), "octocat");
        assert_eq!(repo.repo(), "hello-world");
        assert_eq!(repo.path("/issues"), "/repos/octocat/hello-world/issues");

        assert!(matches!(
            kit.repository("octocat", "bad/name"),
            Err(Error::InvalidInput { field, .. }) if field == "repository"
        ));
    }

    #[test]
    fn default_repository_requires_configuration() {
        let kit = IssueKit::new(MockConnector::new());
        let err = kit.default_repository().unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "repository"));

        let kit = kit.with_default_repository(Some(Repository::new("rust-lang", "rust")));
        assert_eq!(kit.default_repository().unwrap().full_name(), "rust-lang/rust");
    }

    #[test]
    fn issue_handle_rejects_zero() {
        let kit = IssueKit::new(MockConnector::new());
        let repo = kit.repository("o", "r").unwrap();
        assert!(repo.issue(0).is_err());
        assert_eq!(repo.issue(3).unwrap().number(), 3);
    }

    #[tokio::test]
    async fn execute_bool_policy() {
        let mock = MockConnector::new();
        let repo = IssueKit::new(mock.clone()).repository("o", "r").unwrap();

        mock.push_status(HttpMethod::Delete, "/x", 204);
        mock.push_json(HttpMethod::Delete, "/x", 200, json!([]));
        mock.push_status(HttpMethod::Delete, "/x", 404);
        mock.push_json(HttpMethod::Delete, "/x", 403, json!({"message": "Forbidden"}));

        assert!(repo.execute_bool(Request::delete("/x"), None).await.unwrap());
        assert!(repo.execute_bool(Request::delete("/x"), None).await.unwrap());
        assert!(!repo.execute_bool(Request::delete("/x"), Some(1)).await.unwrap());
        let err = repo.execute_bool(Request::delete("/x"), None).await.unwrap_err();
        assert!(matches!(err, Error::Api(_)));
    }

    #[tokio::test]
    async fn transport_failures_surface_as_transport_errors() {
        let mock = MockConnector::new();
        let repo = IssueKit::new(mock).repository("o", "r").unwrap();
        let err = repo.execute(Request::get("/nothing"), None).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert_eq!(err.code(), 0);
    }

    #[tokio::test]
    async fn fetch_reports_decode_errors() {
        let mock = MockConnector::new();
        mock.push_json(HttpMethod::Get, "/n", 200, json!({"not": "a number"}));
        let repo = IssueKit::new(mock).repository("o", "r").unwrap();

        let err = repo.fetch::<u64>(Request::get("/n"), None).await.unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
