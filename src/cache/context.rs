//! Cache-context key derivation from interest sets.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::interests::InterestSet;

/// Key returned for users without preferences.
pub const NO_PREFERENCES_KEY: &str = "none";

const SEPARATOR: &str = "_";

/// How identifiers are arranged before joining.
///
/// `Ordered` keeps stored order, so reordering a user's preferences yields
/// a different key. `Sorted` sorts and deduplicates first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum KeyMode {
    #[default]
    Ordered,
    Sorted,
}

impl KeyMode {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyMode::Ordered => "ordered",
            KeyMode::Sorted => "sorted",
        }
    }
}

impl FromStr for KeyMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ordered" => Ok(KeyMode::Ordered),
            "sorted" => Ok(KeyMode::Sorted),
            other => Err(format!(
                "unknown cache key mode `{other}` (expected `ordered` or `sorted`)"
            )),
        }
    }
}

/// Derived cache-partitioning value for an interest set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct CacheContextKey(String);

impl CacheContextKey {
    pub fn none() -> Self {
        Self(NO_PREFERENCES_KEY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_none(&self) -> bool {
        self.0 == NO_PREFERENCES_KEY
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CacheContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CacheKeyDeriver {
    mode: KeyMode,
}

impl CacheKeyDeriver {
    pub fn new(mode: KeyMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    pub fn derive(&self, interests: &InterestSet) -> CacheContextKey {
        if interests.is_empty() {
            return CacheContextKey::none();
        }

        let parts: Vec<String> = match self.mode {
            KeyMode::Ordered => interests.iter().map(ToString::to_string).collect(),
            KeyMode::Sorted => interests
                .iter()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .map(ToString::to_string)
                .collect(),
        };

        CacheContextKey(parts.join(SEPARATOR))
    }
}
