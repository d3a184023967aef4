use serde::Serialize;

use crate::domain::types::InterestId;

/// Ordered interest identifiers taken from a user at request time.
///
/// Order follows the stored field order and duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct InterestSet(Vec<InterestId>);

impl InterestSet {
    pub fn new(ids: Vec<InterestId>) -> Self {
        Self(ids)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[InterestId] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &InterestId> {
        self.0.iter()
    }
}

impl From<Vec<InterestId>> for InterestSet {
    fn from(ids: Vec<InterestId>) -> Self {
        Self(ids)
    }
}

impl FromIterator<InterestId> for InterestSet {
    fn from_iter<I: IntoIterator<Item = InterestId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
