//! Cache metadata attached to block output.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::domain::types::ArticleId;

/// Invalidation key attached to cached output.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheTag {
    /// Any article list; cleared whenever an article is created or removed.
    ArticleList,
    /// A single article.
    Article(ArticleId),
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheTag::ArticleList => f.write_str("node_list"),
            CacheTag::Article(id) => write!(f, "node:{id}"),
        }
    }
}

impl Serialize for CacheTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Dimension along which cached output varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheContext {
    Url,
    User,
    /// Whether the viewer is signed in. Varies output filtered by audience.
    #[serde(rename = "user.roles")]
    UserRoles,
    PreferredTaxonomy,
}

impl CacheContext {
    pub fn name(self) -> &'static str {
        match self {
            CacheContext::Url => "url",
            CacheContext::User => "user",
            CacheContext::UserRoles => "user.roles",
            CacheContext::PreferredTaxonomy => "preferred_taxonomy",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheableMetadata {
    pub tags: Vec<CacheTag>,
    pub contexts: Vec<CacheContext>,
}

impl CacheableMetadata {
    pub fn with_contexts(contexts: &[CacheContext]) -> Self {
        Self {
            tags: Vec::new(),
            contexts: contexts.to_vec(),
        }
    }

    /// List tag followed by one tag per article, in the given order.
    pub fn for_article_list(ids: &[ArticleId], contexts: &[CacheContext]) -> Self {
        let mut tags = Vec::with_capacity(ids.len() + 1);
        tags.push(CacheTag::ArticleList);
        tags.extend(ids.iter().copied().map(CacheTag::Article));
        Self {
            tags,
            contexts: contexts.to_vec(),
        }
    }
}
