//! Identifier newtypes and shared domain enumerations.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifies a user account.
    UserId
);

numeric_id!(
    /// Identifies an article (content node).
    ArticleId
);

numeric_id!(
    /// Opaque reference to a taxonomy term expressing a content preference.
    InterestId
);

/// Content type that preference and latest-article blocks select.
pub const ARTICLE_BUNDLE: &str = "article";

/// Who may view an article when access control is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    #[default]
    Public,
    Authenticated,
}

impl Audience {
    pub fn visible_to(self, viewer: Option<UserId>) -> bool {
        match self {
            Audience::Public => true,
            Audience::Authenticated => viewer.is_some(),
        }
    }
}
