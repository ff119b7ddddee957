//! Repository milestones.

use issuekit_model::{Milestone, State};
use tracing::{debug, instrument};

use crate::connector::Request;
use crate::context::RepoContext;
use crate::error::{Error, Result};
use crate::payload::MilestonePayload;
use crate::validation;

#[derive(Debug, Clone)]
pub struct MilestoneManager {
    ctx: RepoContext,
}

impl MilestoneManager {
    pub(crate) fn new(ctx: RepoContext) -> Self {
        Self { ctx }
    }

    fn milestone_path(&self, number: u64) -> Result<String> {
        let number = validation::id("milestone_number", number)?;
        Ok(self.ctx.path(&format!("/milestones/{number}")))
    }

    /// Lists milestones in `state`, or all of them when `None`.
    ///
    /// # Errors
    ///
    /// Returns the classified API error.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn list(&self, state: Option<State>) -> Result<Vec<Milestone>> {
        let state = state.map_or("all", State::as_str);
        let request = Request::get(self.ctx.path("/milestones"))
            .with_query("state", state)
            .with_query("per_page", "100");
        let milestones: Vec<Milestone> = self.ctx.fetch(request, None).await?;
        debug!(count = milestones.len(), state, "listed milestones");
        Ok(milestones)
    }

    /// Fetches one milestone by number.
    ///
    /// # Errors
    ///
    /// Returns the classified API error.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn get(&self, number: u64) -> Result<Milestone> {
        let path = self.milestone_path(number)?;
        self.ctx.fetch(Request::get(path), None).await
    }

    /// Creates a milestone. A title is required.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a missing title or a malformed
    /// field, [`Error::Validation`] if the title is already taken.
    #[instrument(skip(self, milestone), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn create(&self, milestone: MilestonePayload) -> Result<Milestone> {
        let milestone = milestone.sanitized()?;
        if milestone.title.as_deref().is_none_or(str::is_empty) {
            return Err(Error::invalid("title", "is required to create a milestone"));
        }

        let request = Request::post(self.ctx.path("/milestones")).with_json(milestone.to_value());
        let created: Milestone = self.ctx.fetch(request, None).await?;
        debug!(number = created.number, "created milestone");
        Ok(created)
    }

    /// Updates the fields present in `milestone`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for malformed fields, or the
    /// classified API error.
    #[instrument(skip(self, milestone), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn update(&self, number: u64, milestone: MilestonePayload) -> Result<Milestone> {
        let path = self.milestone_path(number)?;
        let milestone = milestone.sanitized()?;
        let request = Request::patch(path).with_json(milestone.to_value());
        self.ctx.fetch(request, None).await
    }

    /// Deletes a milestone. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns the classified API error for failures other than 404.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn delete(&self, number: u64) -> Result<bool> {
        let path = self.milestone_path(number)?;
        self.ctx.execute_bool(Request::delete(path), None).await
    }

    /// Closes a milestone.
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn close(&self, number: u64) -> Result<Milestone> {
        self.update(number, MilestonePayload::default().state(State::Closed))
            .await
    }

    /// Reopens a milestone.
    ///
    /// # Errors
    ///
    /// See [`update`](Self::update).
    pub async fn reopen(&self, number: u64) -> Result<Milestone> {
        self.update(number, MilestonePayload::default().state(State::Open))
            .await
    }
}
