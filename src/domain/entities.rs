//! Domain entities mirrored from content storage.

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::types::{ARTICLE_BUNDLE, ArticleId, Audience, InterestId, UserId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRecord {
    pub id: UserId,
    pub name: String,
    pub email: Option<String>,
    /// `None` when the account carries no interest field at all.
    pub interest_ids: Option<Vec<InterestId>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleRecord {
    pub id: ArticleId,
    pub title: String,
    pub bundle: String,
    pub published: bool,
    pub created_at: OffsetDateTime,
    pub interest_ids: Vec<InterestId>,
    pub path_alias: Option<String>,
    pub audience: Audience,
}

impl ArticleRecord {
    /// Canonical link target: the path alias when set, otherwise `/node/{id}`.
    pub fn href(&self) -> String {
        match self.path_alias.as_deref() {
            Some(alias) if !alias.trim().is_empty() => alias.to_string(),
            _ => format!("/node/{}", self.id),
        }
    }

    pub fn is_published_article(&self) -> bool {
        self.published && self.bundle == ARTICLE_BUNDLE
    }

    pub fn matches_any(&self, interests: &[InterestId]) -> bool {
        self.interest_ids.iter().any(|id| interests.contains(id))
    }
}
