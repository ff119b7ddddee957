//! Issue events and timeline entries.
//!
//! Both record types share the event-kind predicates through
//! [`EventKind`]; the kind is decided by membership of the event type
//! string in a fixed set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::JsonRecord;
use crate::user::User;

/// Event types that add or remove a label.
pub const LABEL_EVENTS: &[&str] = &["labeled", "unlabeled"];

/// Event types that add or remove an assignee.
pub const ASSIGNEE_EVENTS: &[&str] = &["assigned", "unassigned"];

/// Event types that attach or detach a milestone.
pub const MILESTONE_EVENTS: &[&str] = &["milestoned", "demilestoned"];

/// Event types that change open/closed state.
pub const STATE_EVENTS: &[&str] = &["closed", "reopened"];

/// Classification shared by [`IssueEvent`] and [`TimelineEvent`].
pub trait EventKind {
    /// The raw event type (e.g. `"labeled"`).
    fn event_type(&self) -> &str;

    /// `labeled` or `unlabeled`.
    fn is_label_event(&self) -> bool {
        LABEL_EVENTS.contains(&self.event_type())
    }

    /// `assigned` or `unassigned`.
    fn is_assignee_event(&self) -> bool {
        ASSIGNEE_EVENTS.contains(&self.event_type())
    }

    /// `milestoned` or `demilestoned`.
    fn is_milestone_event(&self) -> bool {
        MILESTONE_EVENTS.contains(&self.event_type())
    }

    /// `closed` or `reopened`.
    fn is_state_event(&self) -> bool {
        STATE_EVENTS.contains(&self.event_type())
    }
}

/// The label carried by `labeled`/`unlabeled` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLabel {
    /// Label name.
    pub name: String,
    /// Hex color without `#`.
    #[serde(default, deserialize_with = "crate::label::deserialize_color")]
    pub color: String,
}

/// Title change carried by `renamed` events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rename {
    /// Previous title.
    pub from: String,
    /// New title.
    pub to: String,
}

/// Issue referenced from a cross-reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueReference {
    /// Issue number in its own repository.
    pub number: u64,
    /// Issue title.
    #[serde(default)]
    pub title: String,
    /// Web page URL.
    #[serde(default)]
    pub html_url: String,
}

/// Source of a `cross-referenced` timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    /// Source type (usually `"issue"`).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// The referencing issue or pull request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue: Option<IssueReference>,
}

/// An entry from `/issues/{n}/events` or `/issues/events`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueEvent {
    /// Numeric event ID.
    pub id: u64,
    /// Event type (e.g. `"closed"`).
    pub event: String,
    /// Who triggered the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<User>,
    /// When it happened.
    pub created_at: DateTime<Utc>,
    /// Label for label events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<EventLabel>,
    /// Assignee for assignee events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    /// Milestone title for milestone events.
    #[serde(
        default,
        with = "crate::milestone::title_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub milestone: Option<String>,
    /// Commit SHA for events caused by a commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    /// Commit URL for events caused by a commit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_url: Option<String>,
    /// Title change for `renamed` events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<Rename>,
    /// Close/reopen reason for state events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<String>,
}

impl EventKind for IssueEvent {
    fn event_type(&self) -> &str {
        &self.event
    }
}

impl JsonRecord for IssueEvent {}

/// An entry from `/issues/{n}/timeline`.
///
/// Timeline entries are heterogeneous: `commented` entries carry a body and
/// author, `committed` entries lack an ID and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    /// Numeric event ID, absent for commits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Event type (e.g. `"commented"`).
    pub event: String,
    /// Who triggered the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<User>,
    /// When it happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Label for label events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<EventLabel>,
    /// Assignee for assignee events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<User>,
    /// Milestone title for milestone events.
    #[serde(
        default,
        with = "crate::milestone::title_ref",
        skip_serializing_if = "Option::is_none"
    )]
    pub milestone: Option<String>,
    /// Commit SHA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<String>,
    /// Commit URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_url: Option<String>,
    /// Title change for `renamed` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<Rename>,
    /// Comment body for `commented` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Comment author for `commented` entries.
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
    /// Referencing issue for `cross-referenced` entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<CrossReference>,
    /// New state for state entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Close/reopen reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_reason: Option<String>,
}

impl TimelineEvent {
    /// Returns `true` for `commented` entries.
    #[must_use]
    pub fn is_comment(&self) -> bool {
        self.event == "commented"
    }

    /// Returns `true` for `cross-referenced` entries.
    #[must_use]
    pub fn is_cross_reference(&self) -> bool {
        self.event == "cross-referenced"
    }
}

impl EventKind for TimelineEvent {
    fn event_type(&self) -> &str {
        &self.event
    }
}

impl JsonRecord for TimelineEvent {}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::strategies::{arb_text, arb_timestamp, arb_user};
    use proptest::prelude::*;

    prop_compose! {
        fn arb_event_label()(name in "[a-z][a-z -]{0,20}", color in "[0-9a-f]{6}") -> EventLabel {
            EventLabel { name, color }
        }
    }

    prop_compose! {
        fn arb_rename()(from in "[A-Za-z ]{1,30}", to in "[A-Za-z ]{1,30}") -> Rename {
            Rename { from, to }
        }
    }

    prop_compose! {
        fn arb_cross_reference()(
            number in 1u64..100_000,
            title in "[A-Za-z ]{0,30}",
            has_issue in any::<bool>(),
        ) -> CrossReference {
            CrossReference {
                kind: "issue".to_string(),
                issue: has_issue.then(|| IssueReference {
                    number,
                    title,
                    html_url: format!("https://github.com/o/r/issues/{number}"),
                }),
            }
        }
    }

    fn arb_event_type() -> impl Strategy<Value = String> {
        prop::sample::select(vec![
            "labeled", "unlabeled", "assigned", "closed", "reopened", "renamed", "milestoned",
            "commented", "committed", "cross-referenced",
        ])
        .prop_map(str::to_string)
    }

    prop_compose! {
        fn arb_issue_event()(
            id in 1u64..1_000_000_000,
            event in arb_event_type(),
            actor in proptest::option::of(arb_user()),
            created_at in arb_timestamp(),
            label in proptest::option::of(arb_event_label()),
            assignee in proptest::option::of(arb_user()),
            milestone in proptest::option::of("v[0-9]\\.[0-9]"),
            commit_id in proptest::option::of("[0-9a-f]{40}"),
            rename in proptest::option::of(arb_rename()),
            state_reason in proptest::option::of("completed|not_planned|duplicate"),
        ) -> IssueEvent {
            IssueEvent {
                id,
                event,
                actor,
                created_at,
                label,
                assignee,
                milestone,
                commit_url: commit_id
                    .as_ref()
                    .map(|sha| format!("https://api.github.com/repos/o/r/commits/{sha}")),
                commit_id,
                rename,
                state_reason,
            }
        }
    }

    prop_compose! {
        fn arb_timeline_event()(
            id in proptest::option::of(1u64..1_000_000_000),
            event in arb_event_type(),
            actor in proptest::option::of(arb_user()),
            created_at in proptest::option::of(arb_timestamp()),
            label in proptest::option::of(arb_event_label()),
            milestone in proptest::option::of("v[0-9]\\.[0-9]"),
            rename in proptest::option::of(arb_rename()),
            body in proptest::option::of(arb_text()),
            author in proptest::option::of(arb_user()),
            source in proptest::option::of(arb_cross_reference()),
            state in proptest::option::of("open|closed"),
        ) -> TimelineEvent {
            TimelineEvent {
                id,
                event,
                actor,
                created_at,
                label,
                assignee: None,
                milestone,
                commit_id: None,
                commit_url: None,
                rename,
                body,
                author,
                source,
                state,
                state_reason: None,
            }
        }
    }

    proptest! {
        #[test]
        fn issue_event_roundtrip(event in arb_issue_event()) {
            let parsed = IssueEvent::from_value(event.to_value().expect("serialize")).expect("deserialize");
            prop_assert_eq!(parsed, event);
        }

        #[test]
        fn timeline_event_roundtrip(entry in arb_timeline_event()) {
            let parsed = TimelineEvent::from_value(entry.to_value().expect("serialize")).expect("deserialize");
            prop_assert_eq!(parsed, entry);
        }

        /// Tests that at most one kind predicate holds for any event type.
        #[test]
        fn kind_predicates_are_disjoint(event in arb_issue_event()) {
            let hits = [
                event.is_label_event(),
                event.is_assignee_event(),
                event.is_milestone_event(),
                event.is_state_event(),
            ]
            .into_iter()
            .filter(|hit| *hit)
            .count();
            prop_assert!(hits <= 1);
        }
    }
}
