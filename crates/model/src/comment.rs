//! Issue comments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::JsonRecord;
use crate::user::User;

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Numeric comment ID.
    pub id: u64,
    /// Markdown body.
    #[serde(default)]
    pub body: String,
    /// Who wrote the comment.
    #[serde(rename = "user")]
    pub author: User,
    /// When the comment was posted.
    pub created_at: DateTime<Utc>,
    /// When the comment was last edited.
    pub updated_at: DateTime<Utc>,
    /// Web page URL.
    #[serde(default)]
    pub html_url: String,
}

impl Comment {
    /// Returns `true` if the comment was edited after posting.
    #[must_use]
    pub fn is_edited(&self) -> bool {
        self.updated_at > self.created_at
    }
}

impl JsonRecord for Comment {}
