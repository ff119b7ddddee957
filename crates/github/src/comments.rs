//! Issue comments.
//!
//! Comments are listed and created through their issue but read, edited
//! and deleted by their own repository-wide ID.

use issuekit_model::Comment;
use serde_json::json;
use tracing::{debug, instrument};

use crate::connector::Request;
use crate::context::RepoContext;
use crate::error::Result;
use crate::validation;

#[derive(Debug, Clone)]
pub struct CommentManager {
    ctx: RepoContext,
}

impl CommentManager {
    pub(crate) fn new(ctx: RepoContext) -> Self {
        Self { ctx }
    }

    fn comment_path(&self, id: u64) -> Result<String> {
        let id = validation::id("comment_id", id)?;
        Ok(self.ctx.path(&format!("/issues/comments/{id}")))
    }

    /// Comments on an issue, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IssueNotFound`](crate::Error::IssueNotFound) if the
    /// issue does not exist.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn list(&self, number: u64) -> Result<Vec<Comment>> {
        let number = validation::id("issue_number", number)?;
        let request = Request::get(self.ctx.path(&format!("/issues/{number}/comments")));
        let comments: Vec<Comment> = self.ctx.fetch(request, Some(number)).await?;
        debug!(count = comments.len(), "listed comments");
        Ok(comments)
    }

    /// Fetches one comment.
    ///
    /// # Errors
    ///
    /// Returns the classified API error.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn get(&self, id: u64) -> Result<Comment> {
        let path = self.comment_path(id)?;
        self.ctx.fetch(Request::get(path), None).await
    }

    /// Posts a comment on an issue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`](crate::Error::InvalidInput) for a
    /// blank or oversized body.
    #[instrument(skip(self, body), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn create(&self, number: u64, body: &str) -> Result<Comment> {
        let number = validation::id("issue_number", number)?;
        let body = validation::comment_body(body)?;
        let request = Request::post(self.ctx.path(&format!("/issues/{number}/comments")))
            .with_json(json!({ "body": body }));
        let comment: Comment = self.ctx.fetch(request, Some(number)).await?;
        debug!(comment_id = comment.id, "created comment");
        Ok(comment)
    }

    /// Replaces a comment's body.
    ///
    /// # Errors
    ///
    /// See [`create`](Self::create).
    #[instrument(skip(self, body), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn update(&self, id: u64, body: &str) -> Result<Comment> {
        let path = self.comment_path(id)?;
        let body = validation::comment_body(body)?;
        let request = Request::patch(path).with_json(json!({ "body": body }));
        self.ctx.fetch(request, None).await
    }

    /// Deletes a comment. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns the classified API error for failures other than 404.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn delete(&self, id: u64) -> Result<bool> {
        let path = self.comment_path(id)?;
        self.ctx.execute_bool(Request::delete(path), None).await
    }
}
