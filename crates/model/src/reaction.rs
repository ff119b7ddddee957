//! Reactions and the fixed set of reaction tokens.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::record::JsonRecord;
use crate::user::User;

/// One of the eight reaction tokens GitHub accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReactionContent {
    /// 👍
    #[serde(rename = "+1")]
    PlusOne,
    /// 👎
    #[serde(rename = "-1")]
    MinusOne,
    /// 😄
    #[serde(rename = "laugh")]
    Laugh,
    /// 😕
    #[serde(rename = "confused")]
    Confused,
    /// ❤️
    #[serde(rename = "heart")]
    Heart,
    /// 🎉
    #[serde(rename = "hooray")]
    Hooray,
    /// 🚀
    #[serde(rename = "rocket")]
    Rocket,
    /// 👀
    #[serde(rename = "eyes")]
    Eyes,
}

impl ReactionContent {
    /// Every accepted token, in API documentation order.
    pub const VALUES: [&'static str; 8] = [
        "+1", "-1", "laugh", "confused", "heart", "hooray", "rocket", "eyes",
    ];

    /// The wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PlusOne => "+1",
            Self::MinusOne => "-1",
            Self::Laugh => "laugh",
            Self::Confused => "confused",
            Self::Heart => "heart",
            Self::Hooray => "hooray",
            Self::Rocket => "rocket",
            Self::Eyes => "eyes",
        }
    }
}

impl fmt::Display for ReactionContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionContent {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+1" => Ok(Self::PlusOne),
            "-1" => Ok(Self::MinusOne),
            "laugh" => Ok(Self::Laugh),
            "confused" => Ok(Self::Confused),
            "heart" => Ok(Self::Heart),
            "hooray" => Ok(Self::Hooray),
            "rocket" => Ok(Self::Rocket),
            "eyes" => Ok(Self::Eyes),
            other => Err(ModelError::invalid("reaction content", other, &Self::VALUES)),
        }
    }
}

/// A reaction left on an issue or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Numeric reaction ID.
    pub id: u64,
    /// The reaction token.
    pub content: ReactionContent,
    /// Who reacted.
    #[serde(rename = "user")]
    pub author: User,
    /// When the reaction was added.
    pub created_at: DateTime<Utc>,
}

impl JsonRecord for Reaction {}
