//! Emoji reactions on comments and issues.

use issuekit_model::Reaction;
use serde_json::json;
use tracing::{debug, instrument};

use crate::connector::Request;
use crate::context::RepoContext;
use crate::error::Result;
use crate::validation;

#[derive(Debug, Clone)]
pub struct ReactionManager {
    ctx: RepoContext,
}

impl ReactionManager {
    pub(crate) fn new(ctx: RepoContext) -> Self {
        Self { ctx }
    }

    fn comment_path(&self, comment_id: u64) -> Result<String> {
        let comment_id = validation::id("comment_id", comment_id)?;
        Ok(self
            .ctx
            .path(&format!("/issues/comments/{comment_id}/reactions")))
    }

    fn issue_path(&self, number: u64) -> String {
        self.ctx.path(&format!("/issues/{number}/reactions"))
    }

    /// Reactions on a comment.
    ///
    /// # Errors
    ///
    /// Returns the classified API error.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn list(&self, comment_id: u64) -> Result<Vec<Reaction>> {
        let path = self.comment_path(comment_id)?;
        self.ctx.fetch(Request::get(path), None).await
    }

    /// Reacts to a comment. `content` must be one of
    /// [`ReactionContent::VALUES`](issuekit_model::ReactionContent::VALUES).
    ///
    /// Reacting twice with the same content returns the existing reaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) for an
    /// unknown token, or the classified API error.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn create(&self, comment_id: u64, content: &str) -> Result<Reaction> {
        let path = self.comment_path(comment_id)?;
        let content = validation::reaction_content(content)?;
        let request = Request::post(path).with_json(json!({ "content": content.as_str() }));
        let reaction: Reaction = self.ctx.fetch(request, None).await?;
        debug!(reaction_id = reaction.id, %content, "created reaction");
        Ok(reaction)
    }

    /// Removes a reaction from a comment. Returns `false` if it was already
    /// gone.
    ///
    /// # Errors
    ///
    /// Returns the classified API error for failures other than 404.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn delete(&self, comment_id: u64, reaction_id: u64) -> Result<bool> {
        let path = self.comment_path(comment_id)?;
        let reaction_id = validation::id("reaction_id", reaction_id)?;
        self.ctx
            .execute_bool(Request::delete(format!("{path}/{reaction_id}")), None)
            .await
    }

    /// Reactions on the issue itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IssueNotFound`](crate::Error::IssueNotFound) if the
    /// issue does not exist.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn list_for_issue(&self, number: u64) -> Result<Vec<Reaction>> {
        let number = validation::id("issue_number", number)?;
        self.ctx
            .fetch(Request::get(self.issue_path(number)), Some(number))
            .await
    }

    /// Reacts to the issue itself.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn create_for_issue(&self, number: u64, content: &str) -> Result<Reaction> {
        let number = validation::id("issue_number", number)?;
        let content = validation::reaction_content(content)?;
        let request = Request::post(self.issue_path(number))
            .with_json(json!({ "content": content.as_str() }));
        self.ctx.fetch(request, Some(number)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::HttpMethod;
    use crate::error::Error;
    use crate::mock::MockConnector;
    use crate::test_support::{reaction_json, repo_with};
    use issuekit_model::ReactionContent;

    const COMMENT_REACTIONS: &str = "/repos/octocat/hello/issues/comments/77/reactions";

    #[tokio::test]
    async fn create_sends_wire_token() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_json(HttpMethod::Post, COMMENT_REACTIONS, 201, reaction_json(1, "+1"));

        let reaction = repo.reactions().create(77, " +1 ").await.unwrap();
        assert_eq!(reaction.content, ReactionContent::PlusOne);
        assert_eq!(mock.last_request().unwrap().body, Some(json!({"content": "+1"})));
    }

    #[tokio::test]
    async fn unknown_content_is_rejected_locally() {
        let (mock, repo) = repo_with(MockConnector::new());
        let reactions = repo.reactions();

        let err = reactions.create(77, "thumbsup").await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput { ref field, .. } if field == "content"));
        assert!(reactions.create_for_issue(5, "").await.is_err());
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn delete_targets_reaction_id() {
        let (mock, repo) = repo_with(MockConnector::new());
        mock.push_status(HttpMethod::Delete, format!("{COMMENT_REACTIONS}/3"), 204);
        mock.push_status(HttpMethod::Delete, format!("{COMMENT_REACTIONS}/4"), 404);

        assert!(repo.reactions().delete(77, 3).await.unwrap());
        assert!(!repo.reactions().delete(77, 4).await.unwrap());
        assert!(repo.reactions().delete(77, 0).await.is_err());
    }

    #[tokio::test]
    async fn issue_level_reactions() {
        let (mock, repo) = repo_with(MockConnector::new());
        let path = "/repos/octocat/hello/issues/5/reactions";
        mock.push_json(HttpMethod::Post, path, 201, reaction_json(8, "rocket"));
        mock.push_json(HttpMethod::Get, path, 200, json!([reaction_json(8, "rocket")]));

        let reactions = repo.reactions();
        assert_eq!(
            reactions.create_for_issue(5, "rocket").await.unwrap().content,
            ReactionContent::Rocket
        );
        assert_eq!(reactions.list_for_issue(5).await.unwrap().len(), 1);
    }
}
