//! GitHub users as embedded in issues, comments and events.

use serde::{Deserialize, Serialize};

use crate::record::JsonRecord;

/// A GitHub account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Numeric account ID.
    pub id: u64,
    /// Login name (e.g. "octocat").
    pub login: String,
    /// Avatar image URL.
    #[serde(default)]
    pub avatar_url: String,
    /// Profile page URL.
    #[serde(default)]
    pub html_url: String,
    /// Account type ("User", "Organization", "Bot").
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
}

fn default_kind() -> String {
    "User".to_string()
}

impl User {
    /// Returns `true` if the account is a bot (e.g. `dependabot[bot]`).
    #[must_use]
    pub fn is_bot(&self) -> bool {
        self.kind == "Bot"
    }
}

impl JsonRecord for User {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_user() {
        let user = User::from_value(serde_json::json!({ "id": 1, "login": "octocat" })).unwrap();
        assert_eq!(user.login, "octocat");
        assert_eq!(user.kind, "User");
        assert!(user.avatar_url.is_empty());
        assert!(!user.is_bot());
    }

    #[test]
    fn type_field_maps_to_kind() {
        let user = User::from_value(serde_json::json!({
            "id": 2,
            "login": "dependabot[bot]",
            "type": "Bot"
        }))
        .unwrap();
        assert!(user.is_bot());
        assert_eq!(user.to_value().unwrap()["type"], "Bot");
    }
}

#[cfg(test)]
mod proptest_tests {
    use super::*;
    use crate::strategies::arb_user;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn user_roundtrip(user in arb_user()) {
            let parsed = User::from_value(user.to_value().expect("serialize")).expect("deserialize");
            prop_assert_eq!(parsed, user);
        }
    }
}
