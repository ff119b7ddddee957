//! Milestones and the shared open/closed state.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::record::JsonRecord;
use crate::user::User;

/// Open/closed state of an issue or milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    /// Accepting work.
    #[default]
    Open,
    /// Done or abandoned.
    Closed,
}

impl State {
    /// The wire representation (`"open"` or `"closed"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for State {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            other => Err(ModelError::invalid("state", other, &["open", "closed"])),
        }
    }
}

/// A repository milestone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Numeric milestone ID.
    pub id: u64,
    /// Repository-scoped milestone number.
    pub number: u64,
    /// Milestone title.
    pub title: String,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Open or closed.
    pub state: State,
    /// Number of open issues attached.
    #[serde(default)]
    pub open_issues: u64,
    /// Number of closed issues attached.
    #[serde(default)]
    pub closed_issues: u64,
    /// When the milestone was created.
    pub created_at: DateTime<Utc>,
    /// When the milestone was last modified.
    pub updated_at: DateTime<Utc>,
    /// When the milestone was closed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
    /// Due date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_on: Option<DateTime<Utc>>,
    /// Web page URL.
    #[serde(default)]
    pub html_url: String,
    /// Who created the milestone.
    pub creator: User,
}

impl Milestone {
    /// Returns `true` if the milestone is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == State::Open
    }

    /// Returns `true` if the milestone is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.state == State::Closed
    }

    /// Percentage of attached issues that are closed, or `0.0` when empty.
    #[must_use]
    pub fn progress(&self) -> f64 {
        let total = self.open_issues + self.closed_issues;
        if total == 0 {
            return 0.0;
        }
        self.closed_issues as f64 * 100.0 / total as f64
    }

    /// Returns `true` if the milestone is open and its due date has passed.
    #[must_use]
    pub fn is_overdue_at(&self, now: DateTime<Utc>) -> bool {
        self.is_open() && self.due_on.is_some_and(|due| due < now)
    }
}

impl JsonRecord for Milestone {}

/// Serde adapter for the milestone title embedded in issues and events.
///
/// The API embeds a full milestone object; only its title is kept. Writing
/// back produces `{ "title": ... }` so the round trip is stable.
pub(crate) mod title_ref {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    struct TitleRefOut<'a> {
        title: &'a str,
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TitleRefIn {
        Object { title: String },
        Title(String),
    }

    pub fn serialize<S>(title: &Option<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        title
            .as_deref()
            .map(|title| TitleRefOut { title })
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(
            Option::<TitleRefIn>::deserialize(deserializer)?.map(|raw| match raw {
                TitleRefIn::Object { title } | TitleRefIn::Title(title) => title,
            }),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Milestone {
        Milestone::from_value(serde_json::json!({
            "id": 10,
            "number": 3,
            "title": "v1.0",
            "state": "open",
            "open_issues": 3,
            "closed_issues": 1,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-05T00:00:00Z",
            "due_on": "2024-02-01T00:00:00Z",
            "html_url": "https://github.com/o/r/milestone/3",
            "creator": { "id": 1, "login": "octocat" }
        }))
        .unwrap()
    }

    #[test]
    fn state_from_str() {
        assert_eq!("open".parse::<State>().unwrap(), State::Open);
        assert_eq!("closed".parse::<State>().unwrap(), State::Closed);
        assert!("Open".parse::<State>().is_err());
        assert!("all".parse::<State>().is_err());
    }

    #[test]
    fn parses_and_round_trips() {
        let milestone = sample();
        assert!(milestone.is_open());
        assert!(!milestone.is_closed());
        assert!(milestone.closed_at.is_none());
        let again = Milestone::from_value(milestone.to_value().unwrap()).unwrap();
        assert_eq!(again, milestone);
    }

    #[test]
    fn progress_percentage() {
        let milestone = sample();
        assert!((milestone.progress() - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn overdue_only_when_open_and_past_due() {
        let milestone = sample();
        let before = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert!(!milestone.is_overdue_at(before));
        assert!(milestone.is_overdue_at(after));
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::strategies::{arb_text, arb_timestamp, arb_user};
    use proptest::prelude::*;

    prop_compose! {
        fn arb_milestone()(
            number in 1u64..10_000,
            title in "v[0-9]{1,2}\\.[0-9]{1,2}",
            description in proptest::option::of(arb_text()),
            state in any::<State>(),
            open_issues in 0u64..1_000,
            closed_issues in 0u64..1_000,
            created_at in arb_timestamp(),
            updated_at in arb_timestamp(),
            closed_at in proptest::option::of(arb_timestamp()),
            due_on in proptest::option::of(arb_timestamp()),
            creator in arb_user(),
        ) -> Milestone {
            Milestone {
                id: number + 500,
                number,
                title,
                description,
                state,
                open_issues,
                closed_issues,
                created_at,
                updated_at,
                closed_at,
                due_on,
                html_url: format!("https://github.com/o/r/milestone/{number}"),
                creator,
            }
        }
    }

    proptest! {
        #[test]
        fn milestone_roundtrip(milestone in arb_milestone()) {
            let parsed = Milestone::from_value(milestone.to_value().expect("serialize")).expect("deserialize");
            prop_assert_eq!(parsed, milestone);
        }

        #[test]
        fn progress_is_a_percentage(milestone in arb_milestone()) {
            let progress = milestone.progress();
            prop_assert!((0.0..=100.0).contains(&progress));
        }
    }
}
