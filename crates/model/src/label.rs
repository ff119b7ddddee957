//! Repository labels.
//!
//! Colors are stored as six hex digits without the leading `#`, whatever
//! form the server (or a caller) supplied.

use serde::{Deserialize, Deserializer, Serialize};

use crate::record::JsonRecord;

/// A label defined on a repository.
///
/// # Examples
///
/// ```
/// use issuekit_model::{JsonRecord, Label};
///
/// let label = Label::from_value(serde_json::json!({
///     "id": 1,
///     "name": "bug",
///     "color": "#d73a4a"
/// }))
/// .unwrap();
///
/// assert_eq!(label.color, "d73a4a");
/// assert!(label.description.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    /// Numeric label ID.
    pub id: u64,
    /// The label name.
    pub name: String,
    /// The hex color code (without `#`).
    #[serde(deserialize_with = "deserialize_color")]
    pub color: String,
    /// The label description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl JsonRecord for Label {}

/// Strips surrounding whitespace and a leading `#` from a color code.
#[must_use]
pub fn normalize_color(raw: &str) -> String {
    raw.trim().trim_start_matches('#').to_string()
}

/// Returns `true` if `color` is exactly six hex digits.
#[must_use]
pub fn is_valid_color(color: &str) -> bool {
    color.len() == 6 && color.chars().all(|c| c.is_ascii_hexdigit())
}

pub(crate) fn deserialize_color<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_color(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_color_strips_hash() {
        assert_eq!(normalize_color("#FF0000"), "FF0000");
        assert_eq!(normalize_color(" 00ff00 "), "00ff00");
    }

    #[test]
    fn valid_colors() {
        assert!(is_valid_color("0052CC"));
        assert!(is_valid_color("abcdef"));
        assert!(!is_valid_color("#0052CC"));
        assert!(!is_valid_color("12345"));
        assert!(!is_valid_color("GGGGGG"));
    }

    #[test]
    fn description_omitted_when_none() {
        let label = Label {
            id: 3,
            name: "enhancement".to_string(),
            color: "a2eeef".to_string(),
            description: None,
        };
        let value = label.to_value().unwrap();
        assert!(value.get("description").is_none());
        assert_eq!(Label::from_value(value).unwrap(), label);
    }
}
