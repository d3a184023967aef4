//! Repository traits describing content storage adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{ArticleRecord, UserRecord};
use crate::domain::types::{ArticleId, InterestId, UserId};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("storage unavailable")]
    Unavailable,
}

/// Whether storage applies viewer access checks to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessCheck {
    Bypass,
    Enforce { viewer: Option<UserId> },
}

/// Article selection predicate. Results are always ordered by creation
/// time, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleQuery {
    pub bundle: String,
    pub published: bool,
    /// Restricts results to articles tagged with at least one of these ids.
    pub interests: Option<Vec<InterestId>>,
    pub limit: Option<u32>,
    pub access: AccessCheck,
}

#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, RepoError>;
}

#[async_trait]
pub trait ArticlesRepo: Send + Sync {
    async fn query_ids(&self, query: &ArticleQuery) -> Result<Vec<ArticleId>, RepoError>;

    /// Loads records for `ids`, preserving their order. Unknown ids are skipped.
    async fn load_many(&self, ids: &[ArticleId]) -> Result<Vec<ArticleRecord>, RepoError>;
}
