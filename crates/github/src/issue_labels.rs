//! Labels applied to individual issues.
//!
//! | Operation | Request | Repeating it |
//! |-----------|---------|--------------|
//! | [`add`](IssueLabelManager::add) | `POST .../labels` | safe, merges |
//! | [`replace`](IssueLabelManager::replace) | `PUT .../labels` | same result |
//! | [`clear`](IssueLabelManager::clear) | `DELETE .../labels` | idempotent |

use issuekit_model::Label;
use serde_json::json;
use tracing::{debug, instrument};

use crate::connector::{Request, encode_segment};
use crate::context::RepoContext;
use crate::error::Result;
use crate::validation;

#[derive(Debug, Clone)]
pub struct IssueLabelManager {
    ctx: RepoContext,
}

impl IssueLabelManager {
    pub(crate) fn new(ctx: RepoContext) -> Self {
        Self { ctx }
    }

    fn labels_path(&self, number: u64) -> String {
        self.ctx.path(&format!("/issues/{number}/labels"))
    }

    /// Labels on an issue.
    ///
    /// # Errors
    ///
    /// Returns the classified API error.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn list(&self, number: u64) -> Result<Vec<Label>> {
        let number = validation::id("issue_number", number)?;
        self.ctx
            .fetch(Request::get(self.labels_path(number)), Some(number))
            .await
    }

    /// Adds labels and returns the issue's full label set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) for blank
    /// names, or the classified API error.
    #[instrument(skip(self, labels), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn add<S: AsRef<str>>(&self, number: u64, labels: &[S]) -> Result<Vec<Label>> {
        let number = validation::id("issue_number", number)?;
        let labels = validation::string_list("labels", labels)?;
        let request = Request::post(self.labels_path(number)).with_json(json!({ "labels": labels }));
        self.ctx.fetch(request, Some(number)).await
    }

    /// Replaces the issue's labels.
    ///
    /// # Errors
    ///
    /// See [`add`](Self::add).
    #[instrument(skip(self, labels), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn replace<S: AsRef<str>>(&self, number: u64, labels: &[S]) -> Result<Vec<Label>> {
        let number = validation::id("issue_number", number)?;
        let labels = validation::string_list("labels", labels)?;
        let request = Request::put(self.labels_path(number)).with_json(json!({ "labels": labels }));
        self.ctx.fetch(request, Some(number)).await
    }

    /// Removes one label. Returns `false` if the issue did not carry it.
    ///
    /// # Errors
    ///
    /// Returns the classified API error for failures other than 404.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn remove(&self, number: u64, label: &str) -> Result<bool> {
        let number = validation::id("issue_number", number)?;
        let label = validation::string_list("label", &[label])?.remove(0);
        let path = format!("{}/{}", self.labels_path(number), encode_segment(&label));
        self.ctx.execute_bool(Request::delete(path), Some(number)).await
    }

    /// Removes several labels, one request each, in order. Returns how many
    /// were actually removed.
    ///
    /// # Errors
    ///
    /// Stops at the first failure other than 404.
    pub async fn remove_many<S: AsRef<str>>(&self, number: u64, labels: &[S]) -> Result<usize> {
        let labels = validation::string_list("labels", labels)?;
        let mut removed = 0;
        for label in &labels {
            if self.remove(number, label).await? {
                removed += 1;
            }
        }
        debug!(requested = labels.len(), removed, "removed labels");
        Ok(removed)
    }

    /// Removes every label.
    ///
    /// # Errors
    ///
    /// Returns the classified API error for failures other than 404.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn clear(&self, number: u64) -> Result<bool> {
        let number = validation::id("issue_number", number)?;
        self.ctx
            .execute_bool(Request::delete(self.labels_path(number)), Some(number))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::HttpMethod;
    use crate::mock::MockConnector;
    use crate::test_support::{label_json, repo_with};
    use serde_json::json;

    const LABELS: &str = "/repos/octocat/hello/issues/5/labels";

    #[tokio::test]
    async fn add_and_replace_use_distinct_verbs() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_json(HttpMethod::Post, LABELS, 200, json!([label_json("bug")]));
        mock.push_json(HttpMethod::Put, LABELS, 200, json!([label_json("docs")]));

        let labels = repo.labels();
        assert_eq!(labels.add(5, &["bug"]).await.unwrap()[0].name, "bug");
        assert_eq!(labels.replace(5, &["docs"]).await.unwrap()[0].name, "docs");

        let requests = mock.requests();
        assert_eq!(requests[0].body, Some(json!({"labels": ["bug"]})));
        assert_eq!(requests[1].method, HttpMethod::Put);
    }

    #[tokio::test]
    async fn remove_encodes_name_and_reports_missing() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_json(HttpMethod::Delete, format!("{LABELS}/good%20first%20issue"), 200, json!([]));
        mock.push_json(HttpMethod::Delete, format!("{LABELS}/gone"), 404, json!({"message": "Label does not exist"}));

        let labels = repo.labels();
        assert!(labels.remove(5, "good first issue").await.unwrap());
        assert!(!labels.remove(5, "gone").await.unwrap());
    }

    #[tokio::test]
    async fn remove_many_is_sequential() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_json(HttpMethod::Delete, format!("{LABELS}/a"), 200, json!([]));
        mock.push_status(HttpMethod::Delete, format!("{LABELS}/b"), 404);
        mock.push_json(HttpMethod::Delete, format!("{LABELS}/c"), 200, json!([]));

        let removed = repo.labels().remove_many(5, &["a", "b", "c"]).await.unwrap();
        assert_eq!(removed, 2);
        let paths: Vec<String> = mock.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(
            paths,
            vec![format!("{LABELS}/a"), format!("{LABELS}/b"), format!("{LABELS}/c")]
        );
    }

    #[tokio::test]
    async fn remove_many_stops_on_real_failures() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_json(HttpMethod::Delete, format!("{LABELS}/a"), 500, json!({}));

        assert!(repo.labels().remove_many(5, &["a", "b"]).await.is_err());
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn clear_and_blank_names() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_status(HttpMethod::Delete, LABELS, 204);

        assert!(repo.labels().clear(5).await.unwrap());
        assert!(repo.labels().add(5, &[" "]).await.is_err());
        assert_eq!(mock.requests().len(), 1);
    }
}
