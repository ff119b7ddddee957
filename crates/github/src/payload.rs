//! Typed request payloads.
//!
//! Payloads are plain builders. Nothing is checked while building;
//! [`IssueUpdate::sanitized`] (and its siblings) apply the rules from
//! [`validation`](crate::validation) and are called by the managers before
//! anything is sent. Loosely-typed input enters through
//! [`IssueUpdate::sanitize`].

use issuekit_model::{State, StateReason};
use serde_json::{Map, Value, json};

use crate::error::{Error, Result};
use crate::validation;

/// How an update touches the issue's milestone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneChange {
    /// Remove the milestone (`"milestone": null`).
    Clear,
    /// Assign the milestone with this number.
    Set(u64),
}

/// A partial issue update. Absent fields are left untouched by the server.
///
/// ```
/// use issuekit_github::payload::IssueUpdate;
/// use serde_json::json;
///
/// let update = IssueUpdate::sanitize(&json!({
///     "title": "  Crash on start  ",
///     "labels": ["bug", " p1 "],
///     "milestone": null,
/// }))
/// .unwrap();
///
/// assert_eq!(
///     update.to_value(),
///     json!({"title": "Crash on start", "labels": ["bug", "p1"], "milestone": null})
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueUpdate {
    pub title: Option<String>,
    pub body: Option<String>,
    pub state: Option<State>,
    pub state_reason: Option<StateReason>,
    pub labels: Option<Vec<String>>,
    pub assignees: Option<Vec<String>>,
    pub milestone: Option<MilestoneChange>,
}

impl IssueUpdate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn state_reason(mut self, reason: StateReason) -> Self {
        self.state_reason = Some(reason);
        self
    }

    #[must_use]
    pub fn labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = Some(labels.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn assignees<I, S>(mut self, assignees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assignees = Some(assignees.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn milestone(mut self, number: u64) -> Self {
        self.milestone = Some(MilestoneChange::Set(number));
        self
    }

    #[must_use]
    pub fn clear_milestone(mut self) -> Self {
        self.milestone = Some(MilestoneChange::Clear);
        self
    }

    /// Returns `true` if no field is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Parses and checks a loosely-typed update map.
    ///
    /// Recognized keys are `title`, `body`, `state`, `state_reason`,
    /// `labels`, `assignees` and `milestone`; other keys are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] when the input is not an object, a
    /// field has the wrong JSON type, or a value breaks its rule.
    pub fn sanitize(input: &Value) -> Result<Self> {
        let map = input
            .as_object()
            .ok_or_else(|| Error::invalid("issue", "update data must be a JSON object"))?;

        let mut update = Self::new();
        if let Some(value) = map.get("title") {
            update.title = Some(expect_str("title", value)?.to_string());
        }
        if let Some(value) = map.get("body") {
            update.body = Some(expect_str("body", value)?.to_string());
        }
        if let Some(value) = map.get("state") {
            let raw = expect_str("state", value)?;
            update.state = Some(raw.parse().map_err(|_| {
                Error::invalid("state", format!("'{raw}' must be either 'open' or 'closed'"))
            })?);
        }
        if let Some(value) = map.get("state_reason") {
            let raw = expect_str("state_reason", value)?;
            update.state_reason = Some(raw.parse().map_err(|_| {
                Error::invalid(
                    "state_reason",
                    format!(
                        "'{raw}' must be one of: {}",
                        StateReason::VALUES.join(", ")
                    ),
                )
            })?);
        }
        if let Some(value) = map.get("labels") {
            update.labels = Some(expect_strings("labels", value)?);
        }
        if let Some(value) = map.get("assignees") {
            update.assignees = Some(expect_strings("assignees", value)?);
        }
        if let Some(value) = map.get("milestone") {
            update.milestone = Some(match value {
                Value::Null => MilestoneChange::Clear,
                other => MilestoneChange::Set(other.as_u64().ok_or_else(|| {
                    Error::invalid("milestone", "must be null or a positive integer")
                })?),
            });
        }

        update.sanitized()
    }

    /// Applies the field rules to a typed update.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for the first rule that fails.
    pub fn sanitized(self) -> Result<Self> {
        Ok(Self {
            title: self.title.as_deref().map(validation::title).transpose()?,
            body: self.body.as_deref().map(validation::body).transpose()?,
            state: self.state,
            state_reason: self.state_reason,
            labels: self
                .labels
                .as_deref()
                .map(|l| validation::string_list("labels", l))
                .transpose()?,
            assignees: self
                .assignees
                .as_deref()
                .map(|a| validation::string_list("assignees", a))
                .transpose()?,
            milestone: match self.milestone {
                Some(MilestoneChange::Set(number)) => {
                    Some(MilestoneChange::Set(validation::id("milestone", number)?))
                }
                other => other,
            },
        })
    }

    /// The request body: only the fields that are set.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(title) = &self.title {
            map.insert("title".into(), json!(title));
        }
        if let Some(body) = &self.body {
            map.insert("body".into(), json!(body));
        }
        if let Some(state) = self.state {
            map.insert("state".into(), json!(state.as_str()));
        }
        if let Some(reason) = self.state_reason {
            map.insert("state_reason".into(), json!(reason.as_str()));
        }
        if let Some(labels) = &self.labels {
            map.insert("labels".into(), json!(labels));
        }
        if let Some(assignees) = &self.assignees {
            map.insert("assignees".into(), json!(assignees));
        }
        match self.milestone {
            Some(MilestoneChange::Clear) => {
                map.insert("milestone".into(), Value::Null);
            }
            Some(MilestoneChange::Set(number)) => {
                map.insert("milestone".into(), json!(number));
            }
            None => {}
        }
        Value::Object(map)
    }
}

/// A composite change set for [`IssueManager::apply`](crate::IssueManager::apply).
///
/// Steps run in a fixed order: state, fields, labels added, labels removed,
/// labels replaced, assignees added, assignees removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueChanges {
    pub state: Option<State>,
    /// Only used when closing.
    pub state_reason: Option<StateReason>,
    pub fields: IssueUpdate,
    pub add_labels: Option<Vec<String>>,
    pub remove_labels: Option<Vec<String>>,
    pub set_labels: Option<Vec<String>>,
    pub add_assignees: Option<Vec<String>>,
    pub remove_assignees: Option<Vec<String>>,
}

fn owned<I, S>(items: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Some(items.into_iter().map(Into::into).collect())
}

impl IssueChanges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn close(mut self, reason: Option<StateReason>) -> Self {
        self.state = Some(State::Closed);
        self.state_reason = reason;
        self
    }

    #[must_use]
    pub fn reopen(mut self) -> Self {
        self.state = Some(State::Open);
        self.state_reason = None;
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: IssueUpdate) -> Self {
        self.fields = fields;
        self
    }

    #[must_use]
    pub fn add_labels<I: IntoIterator<Item = S>, S: Into<String>>(mut self, labels: I) -> Self {
        self.add_labels = owned(labels);
        self
    }

    #[must_use]
    pub fn remove_labels<I: IntoIterator<Item = S>, S: Into<String>>(mut self, labels: I) -> Self {
        self.remove_labels = owned(labels);
        self
    }

    #[must_use]
    pub fn set_labels<I: IntoIterator<Item = S>, S: Into<String>>(mut self, labels: I) -> Self {
        self.set_labels = owned(labels);
        self
    }

    #[must_use]
    pub fn add_assignees<I: IntoIterator<Item = S>, S: Into<String>>(mut self, users: I) -> Self {
        self.add_assignees = owned(users);
        self
    }

    #[must_use]
    pub fn remove_assignees<I: IntoIterator<Item = S>, S: Into<String>>(mut self, users: I) -> Self {
        self.remove_assignees = owned(users);
        self
    }

    /// Parses the loosely-typed change map accepted by the composite
    /// update: `state`, `state_reason` and the `labels`/`assignees`
    /// sub-maps (`{"add": [..], "remove": [..], "set": [..]}`); every other
    /// key is an [`IssueUpdate`] field.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for malformed values.
    pub fn from_value(input: &Value) -> Result<Self> {
        let map = input
            .as_object()
            .ok_or_else(|| Error::invalid("changes", "must be a JSON object"))?;

        let mut fields = map.clone();
        let mut changes = Self::new();

        if let Some(value) = fields.remove("state") {
            let raw = expect_str("state", &value)?;
            changes.state = Some(raw.parse().map_err(|_| {
                Error::invalid("state", format!("'{raw}' must be either 'open' or 'closed'"))
            })?);
        }
        if let Some(value) = fields.remove("state_reason") {
            let parsed = IssueUpdate::sanitize(&json!({ "state_reason": value }))?;
            changes.state_reason = parsed.state_reason;
        }
        if let Some(Value::Object(labels)) = fields.get("labels").cloned() {
            fields.remove("labels");
            changes.add_labels = optional_strings("labels.add", labels.get("add"))?;
            changes.remove_labels = optional_strings("labels.remove", labels.get("remove"))?;
            changes.set_labels = optional_strings("labels.set", labels.get("set"))?;
        }
        if let Some(Value::Object(assignees)) = fields.get("assignees").cloned() {
            fields.remove("assignees");
            changes.add_assignees = optional_strings("assignees.add", assignees.get("add"))?;
            changes.remove_assignees =
                optional_strings("assignees.remove", assignees.get("remove"))?;
        }

        changes.fields = IssueUpdate::sanitize(&Value::Object(fields))?;
        Ok(changes)
    }
}

/// Milestone create/update body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MilestonePayload {
    pub title: Option<String>,
    pub state: Option<State>,
    pub description: Option<String>,
    /// Raw due date; normalized to RFC 3339 UTC by [`sanitized`](Self::sanitized).
    pub due_on: Option<String>,
}

impl MilestonePayload {
    /// A payload with a title, as required for creation.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: State) -> Self {
        self.state = Some(state);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn due_on(mut self, due_on: impl Into<String>) -> Self {
        self.due_on = Some(due_on.into());
        self
    }

    /// Checks every field and normalizes `due_on`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for the first rule that fails.
    pub fn sanitized(self) -> Result<Self> {
        Ok(Self {
            title: self.title.as_deref().map(validation::title).transpose()?,
            state: self.state,
            description: self
                .description
                .as_deref()
                .map(validation::body)
                .transpose()?,
            due_on: self
                .due_on
                .as_deref()
                .map(|raw| {
                    validation::due_on(raw)
                        .map(|at| at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
                })
                .transpose()?,
        })
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        if let Some(title) = &self.title {
            map.insert("title".into(), json!(title));
        }
        if let Some(state) = self.state {
            map.insert("state".into(), json!(state.as_str()));
        }
        if let Some(description) = &self.description {
            map.insert("description".into(), json!(description));
        }
        if let Some(due_on) = &self.due_on {
            map.insert("due_on".into(), json!(due_on));
        }
        Value::Object(map)
    }
}

/// Repository label create/update body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelPayload {
    /// The label name; sent as `new_name` on update.
    pub name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
}

impl LabelPayload {
    /// A payload with the two fields creation requires.
    #[must_use]
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            color: Some(color.into()),
            description: None,
        }
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks every field and strips a leading `#` from the color.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for the first rule that fails.
    pub fn sanitized(self) -> Result<Self> {
        Ok(Self {
            name: self.name.as_deref().map(validation::label_name).transpose()?,
            color: self.color.as_deref().map(validation::label_color).transpose()?,
            description: self
                .description
                .as_deref()
                .map(validation::label_description)
                .transpose()?,
        })
    }

    /// Body for `POST /labels`.
    #[must_use]
    pub fn to_create_value(&self) -> Value {
        self.to_value("name")
    }

    /// Body for `PATCH /labels/{name}`.
    #[must_use]
    pub fn to_update_value(&self) -> Value {
        self.to_value("new_name")
    }

    fn to_value(&self, name_key: &str) -> Value {
        let mut map = Map::new();
        if let Some(name) = &self.name {
            map.insert(name_key.into(), json!(name));
        }
        if let Some(color) = &self.color {
            map.insert("color".into(), json!(color));
        }
        if let Some(description) = &self.description {
            map.insert("description".into(), json!(description));
        }
        Value::Object(map)
    }
}

fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str> {
    value
        .as_str()
        .ok_or_else(|| Error::invalid(field, "must be a string"))
}

fn expect_strings(field: &str, value: &Value) -> Result<Vec<String>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::invalid(field, "must be an array of strings"))?;
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                Error::invalid(field, format!("element {i} must be a non-empty string"))
            })
        })
        .collect()
}

fn optional_strings(field: &str, value: Option<&Value>) -> Result<Option<Vec<String>>> {
    value.map(|v| expect_strings(field, v)).transpose()
}
