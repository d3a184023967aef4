//! Interest extraction from user records.

use tracing::debug;

use crate::application::repos::{RepoError, UsersRepo};
use crate::domain::entities::UserRecord;
use crate::domain::interests::InterestSet;
use crate::domain::types::UserId;

#[derive(Debug, Clone, Copy, Default)]
pub struct PreferenceExtractor;

impl PreferenceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Interest identifiers of `user` in stored order.
    ///
    /// An absent user, or one without an interest field, yields an empty set.
    pub fn extract(&self, user: Option<&UserRecord>) -> InterestSet {
        user.and_then(|user| user.interest_ids.as_ref())
            .map(|ids| InterestSet::new(ids.clone()))
            .unwrap_or_default()
    }

    /// Loads `viewer` and extracts its interests. Anonymous viewers skip the lookup.
    pub async fn extract_for(
        &self,
        users: &dyn UsersRepo,
        viewer: Option<UserId>,
    ) -> Result<InterestSet, RepoError> {
        let Some(id) = viewer else {
            return Ok(InterestSet::empty());
        };

        let user = users.find_by_id(id).await?;
        if user.is_none() {
            debug!(
                target = "curated::preferences",
                viewer = %id,
                "viewer not found; treating as having no preferences"
            );
        }

        Ok(self.extract(user.as_ref()))
    }
}
