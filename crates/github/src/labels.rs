//! Repository label management.
//!
//! Label names are percent-encoded in paths since they may contain spaces,
//! slashes or emoji.
//!
//! # Example
//!
//! ```no_run
//! use issuekit_github::{IssueKit, LabelPayload};
//!
//! # async fn example(kit: IssueKit) -> issuekit_github::Result<()> {
//! let labels = kit.repository("owner", "repo")?.repo_labels();
//!
//! for label in labels.list().await? {
//!     println!("{}: #{}", label.name, label.color);
//! }
//!
//! labels
//!     .create(LabelPayload::new("needs triage", "#fbca04").description("Not yet looked at"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

use issuekit_model::Label;
use tracing::{debug, instrument};

use crate::connector::{Request, encode_segment};
use crate::context::RepoContext;
use crate::error::{Error, Result};
use crate::payload::LabelPayload;
use crate::validation;

/// Labels defined on a repository.
#[derive(Debug, Clone)]
pub struct LabelManager {
    ctx: RepoContext,
}

impl LabelManager {
    pub(crate) fn new(ctx: RepoContext) -> Self {
        Self { ctx }
    }

    fn label_path(&self, name: &str) -> Result<String> {
        let name = validation::label_name(name)?;
        Ok(self.ctx.path(&format!("/labels/{}", encode_segment(&name))))
    }

    /// Lists the first 100 labels.
    ///
    /// # Errors
    ///
    /// Returns the classified API error (e.g. repository not found, rate
    /// limit exceeded).
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn list(&self) -> Result<Vec<Label>> {
        debug!("listing labels");
        let request = Request::get(self.ctx.path("/labels")).with_query("per_page", "100");
        let labels: Vec<Label> = self.ctx.fetch(request, None).await?;
        debug!(count = labels.len(), "listed labels");
        Ok(labels)
    }

    /// Fetches a label by name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RepositoryNotFound`] if the label does not exist.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn get(&self, name: &str) -> Result<Label> {
        let path = self.label_path(name)?;
        self.ctx.fetch(Request::get(path), None).await
    }

    /// Creates a label. Name and color are required.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a missing or malformed field,
    /// [`Error::Validation`] if the label already exists.
    #[instrument(skip(self, label), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn create(&self, label: LabelPayload) -> Result<Label> {
        let label = label.sanitized()?;
        if label.name.is_none() {
            return Err(Error::invalid("name", "is required to create a label"));
        }
        if label.color.is_none() {
            return Err(Error::invalid("color", "is required to create a label"));
        }

        let request = Request::post(self.ctx.path("/labels")).with_json(label.to_create_value());
        let created: Label = self.ctx.fetch(request, None).await?;
        debug!(label = %created.name, "created label");
        Ok(created)
    }

    /// Updates a label; `label.name` renames it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for malformed fields, or the
    /// classified API error.
    #[instrument(skip(self, label), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn update(&self, name: &str, label: LabelPayload) -> Result<Label> {
        let path = self.label_path(name)?;
        let label = label.sanitized()?;
        let request = Request::patch(path).with_json(label.to_update_value());
        self.ctx.fetch(request, None).await
    }

    /// Deletes a label. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns the classified API error for failures other than 404.
    #[instrument(skip(self), fields(owner = %self.ctx.owner(), repo = %self.ctx.repo()))]
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let path = self.label_path(name)?;
        self.ctx.execute_bool(Request::delete(path), None).await
    }
}
