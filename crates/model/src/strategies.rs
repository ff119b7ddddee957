//! Proptest strategies shared by the record round-trip tests.

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use crate::label::Label;
use crate::milestone::State;
use crate::reaction::ReactionContent;
use crate::user::User;

impl Arbitrary for State {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![Just(State::Open), Just(State::Closed)].boxed()
    }
}

impl Arbitrary for ReactionContent {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop::sample::select(ReactionContent::VALUES.to_vec())
            .prop_map(|token| token.parse().expect("token comes from VALUES"))
            .boxed()
    }
}

prop_compose! {
    pub fn arb_user()(
        id in 1u64..1_000_000,
        login in "[a-z][a-z0-9-]{0,20}",
        kind in prop::sample::select(vec!["User", "Bot", "Organization"]),
    ) -> User {
        User {
            id,
            avatar_url: format!("https://avatars.githubusercontent.com/u/{id}"),
            html_url: format!("https://github.com/{login}"),
            login,
            kind: kind.to_string(),
        }
    }
}

prop_compose! {
    pub fn arb_label()(
        id in 1u64..10_000,
        name in "[a-z][a-z /-]{0,20}",
        color in "[0-9a-f]{6}",
        description in proptest::option::of("[A-Za-z ]{1,40}"),
    ) -> Label {
        Label { id, name, color, description }
    }
}

prop_compose! {
    pub fn arb_timestamp()(secs in 1_000_000_000i64..2_000_000_000) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }
}

/// Free text as found in titles and bodies, including unicode and newlines.
pub fn arb_text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 .,!?\n\u{e9}\u{1f680}]{0,120}"
}
