//! Issue events and timelines.
//!
//! Events are the structured history GitHub records (labeled, closed,
//! renamed...). The timeline adds comments and cross-references, and is
//! only served with the `mockingbird` preview media type.

use issuekit_model::{IssueEvent, TimelineEvent};
use tracing::{debug, instrument};

use crate::connector::Request;
use crate::context::RepoContext;
use crate::error::Result;
use crate::validation;

/// Media type the timeline endpoint requires.
pub const TIMELINE_MEDIA_TYPE: &str = "application/vnd.github.mockingbird-preview+json";

#[derive(Debug, Clone)]
pub struct EventManager {
    ctx: RepoContext,
}

impl EventManager {
    pub(crate) fn new(ctx: RepoContext) -> Self {
        Self { ctx }
    }

    /// Events on one issue.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IssueNotFound`](crate::Error::IssueNotFound) if the
    /// issue does not exist.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn for_issue(&self, number: u64) -> Result<Vec<IssueEvent>> {
        let number = validation::id("issue_number", number)?;
        let request = Request::get(self.ctx.path(&format!("/issues/{number}/events")));
        let events: Vec<IssueEvent> = self.ctx.fetch(request, Some(number)).await?;
        debug!(count = events.len(), "listed issue events");
        Ok(events)
    }

    /// The issue's full timeline.
    ///
    /// # Errors
    ///
    /// See [`for_issue`](Self::for_issue).
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn timeline(&self, number: u64) -> Result<Vec<TimelineEvent>> {
        let number = validation::id("issue_number", number)?;
        let request = Request::get(self.ctx.path(&format!("/issues/{number}/timeline")))
            .with_header("Accept", TIMELINE_MEDIA_TYPE);
        let events: Vec<TimelineEvent> = self.ctx.fetch(request, Some(number)).await?;
        debug!(count = events.len(), "listed timeline");
        Ok(events)
    }

    /// Recent events across every issue in the repository.
    ///
    /// # Errors
    ///
    /// Returns the classified API error.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn for_repository(&self) -> Result<Vec<IssueEvent>> {
        let request = Request::get(self.ctx.path("/issues/events")).with_query("per_page", "100");
        self.ctx.fetch(request, None).await
    }

    /// Fetches one event by ID.
    ///
    /// # Errors
    ///
    /// Returns the classified API error.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn get(&self, event_id: u64) -> Result<IssueEvent> {
        let event_id = validation::id("event_id", event_id)?;
        let request = Request::get(self.ctx.path(&format!("/issues/events/{event_id}")));
        self.ctx.fetch(request, None).await
    }
}
