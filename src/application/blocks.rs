//! Display blocks built from article selections and viewer details.
//!
//! Each block declares the cache contexts its output varies by. The
//! [`BlockService`] resolves those contexts for a request, serves cached
//! variants when present, and records the cache tags of freshly built
//! output so they can be invalidated when articles change.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::application::articles::{ArticleQueryEngine, ResultLimit};
use crate::application::preferences::PreferenceExtractor;
use crate::application::repos::{RepoError, UsersRepo};
use crate::cache::{
    BlockCache, BlockCacheKey, CacheConfig, CacheContext, CacheContextKey, CacheKeyDeriver,
    CacheRegistry, CacheTag, CacheableMetadata, ResolvedContext,
};
use crate::domain::entities::ArticleRecord;
use crate::domain::types::{ArticleId, UserId};

const ARTICLE_LIST_CLASS: &str = "last-three-articles";
const NO_EMAIL: &str = "No email available";
const ANONYMOUS_CONTEXT_VALUE: &str = "anonymous";
const AUTHENTICATED_ROLE: &str = "authenticated";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    LatestArticles,
    PreferredArticles,
    UserEmail,
}

impl BlockKind {
    pub fn id(self) -> &'static str {
        match self {
            BlockKind::LatestArticles => "latest_articles",
            BlockKind::PreferredArticles => "preferred_category",
            BlockKind::UserEmail => "user_email",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BlockKind::LatestArticles => "Last Three Articles",
            BlockKind::PreferredArticles => "Preferred Category Block",
            BlockKind::UserEmail => "User Email",
        }
    }

    pub fn contexts(self) -> &'static [CacheContext] {
        match self {
            BlockKind::LatestArticles => &[CacheContext::Url],
            BlockKind::PreferredArticles => &[CacheContext::PreferredTaxonomy],
            BlockKind::UserEmail => &[CacheContext::User],
        }
    }

    pub fn lists_articles(self) -> bool {
        matches!(
            self,
            BlockKind::LatestArticles | BlockKind::PreferredArticles
        )
    }
}

/// Request-scoped inputs a block may vary by.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub path: String,
    pub viewer: Option<UserId>,
}

impl RequestContext {
    pub fn new(path: impl Into<String>, viewer: Option<UserId>) -> Self {
        Self {
            path: path.into(),
            viewer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArticleLink {
    pub id: ArticleId,
    pub title: String,
    pub href: String,
}

impl From<&ArticleRecord> for ArticleLink {
    fn from(record: &ArticleRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            href: record.href(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockContent {
    ItemList {
        items: Vec<ArticleLink>,
        class: &'static str,
    },
    Markup {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockOutput {
    pub block: &'static str,
    pub label: &'static str,
    pub content: BlockContent,
    pub cache: CacheableMetadata,
}

/// Per-block result limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockLimits {
    pub latest: ResultLimit,
    pub preferred: ResultLimit,
}

#[derive(Clone)]
pub struct BlockService {
    users: Arc<dyn UsersRepo>,
    engine: ArticleQueryEngine,
    extractor: PreferenceExtractor,
    deriver: CacheKeyDeriver,
    limits: BlockLimits,
    cache: Option<Arc<BlockCache<BlockOutput>>>,
    registry: Arc<CacheRegistry>,
}

impl BlockService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        engine: ArticleQueryEngine,
        deriver: CacheKeyDeriver,
        limits: BlockLimits,
        cache_config: &CacheConfig,
    ) -> Self {
        let cache = cache_config
            .enabled
            .then(|| Arc::new(BlockCache::new(cache_config)));

        Self {
            users,
            engine,
            extractor: PreferenceExtractor::new(),
            deriver,
            limits,
            cache,
            registry: Arc::new(CacheRegistry::new()),
        }
    }

    /// Cache-context key for the viewer's interests.
    pub async fn preference_key(
        &self,
        viewer: Option<UserId>,
    ) -> Result<CacheContextKey, RepoError> {
        let interests = self
            .extractor
            .extract_for(self.users.as_ref(), viewer)
            .await?;
        Ok(self.deriver.derive(&interests))
    }

    /// Render `kind`, serving a cached variant when one matches the request.
    pub async fn render(
        &self,
        kind: BlockKind,
        request: &RequestContext,
    ) -> Result<BlockOutput, RepoError> {
        let Some(cache) = self.cache.as_ref() else {
            return self.build(kind, request).await;
        };

        let key = self.cache_key(kind, request).await?;
        if let Some(output) = cache.get(&key) {
            debug!(target = "curated::blocks", key = %key, "block cache hit");
            return Ok(output);
        }

        let output = self.build(kind, request).await?;
        let tags: HashSet<CacheTag> = output.cache.tags.iter().cloned().collect();
        self.registry.register(key.clone(), tags);
        if let Some(evicted) = cache.set(key, output.clone()) {
            self.registry.unregister(&evicted);
        }

        Ok(output)
    }

    /// Build `kind` without consulting the cache.
    pub async fn build(
        &self,
        kind: BlockKind,
        request: &RequestContext,
    ) -> Result<BlockOutput, RepoError> {
        let contexts = self.contexts_for(kind);
        let (content, cache) = match kind {
            BlockKind::LatestArticles => {
                let selection = self
                    .engine
                    .latest(request.viewer, self.limits.latest)
                    .await?;
                article_list(&selection.records, &selection.ids, &contexts)
            }
            BlockKind::PreferredArticles => {
                let interests = self
                    .extractor
                    .extract_for(self.users.as_ref(), request.viewer)
                    .await?;
                let selection = self
                    .engine
                    .preferred(request.viewer, &interests, self.limits.preferred)
                    .await?;
                article_list(&selection.records, &selection.ids, &contexts)
            }
            BlockKind::UserEmail => {
                let email = match request.viewer {
                    Some(id) => self.users.find_by_id(id).await?.and_then(|user| user.email),
                    None => None,
                };
                let email = email.unwrap_or_else(|| NO_EMAIL.to_string());
                (
                    BlockContent::Markup {
                        text: format!("Current user email: {email}"),
                    },
                    CacheableMetadata::with_contexts(&contexts),
                )
            }
        };

        info!(
            target = "curated::blocks",
            block = kind.id(),
            viewer = request.viewer.map(|id| id.get()),
            tags = cache.tags.len(),
            access_checked = self.engine.enforces_access_control(),
            "built block"
        );

        Ok(BlockOutput {
            block: kind.id(),
            label: kind.label(),
            content,
            cache,
        })
    }

    /// Drop every cached block carrying any of `tags`. Returns the number
    /// of cached variants removed.
    pub fn invalidate_tags(&self, tags: &[CacheTag]) -> usize {
        let affected = self.registry.take_keys_for_tags(tags);
        let remaining = self.cache.as_ref().map_or(0, |cache| {
            for key in &affected {
                cache.invalidate(key);
            }
            cache.entry_count()
        });

        debug!(
            target = "curated::blocks",
            tags = tags.len(),
            invalidated = affected.len(),
            remaining,
            registered_keys = self.registry.key_count(),
            registered_tags = self.registry.tag_count(),
            "invalidated cached blocks"
        );

        affected.len()
    }

    /// Contexts `kind` varies by. Article lists also vary by viewer role
    /// while audience checks are enforced.
    fn contexts_for(&self, kind: BlockKind) -> Vec<CacheContext> {
        let mut contexts = kind.contexts().to_vec();
        if kind.lists_articles() && self.engine.enforces_access_control() {
            contexts.push(CacheContext::UserRoles);
        }
        contexts
    }

    async fn cache_key(
        &self,
        kind: BlockKind,
        request: &RequestContext,
    ) -> Result<BlockCacheKey, RepoError> {
        let contexts = self.contexts_for(kind);
        let mut resolved = Vec::with_capacity(contexts.len());
        for context in contexts {
            let value = match context {
                CacheContext::Url => request.path.clone(),
                CacheContext::User => request
                    .viewer
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| ANONYMOUS_CONTEXT_VALUE.to_string()),
                CacheContext::UserRoles => match request.viewer {
                    Some(_) => AUTHENTICATED_ROLE.to_string(),
                    None => ANONYMOUS_CONTEXT_VALUE.to_string(),
                },
                CacheContext::PreferredTaxonomy => {
                    self.preference_key(request.viewer).await?.into_string()
                }
            };
            resolved.push(ResolvedContext::new(context, value));
        }
        Ok(BlockCacheKey::new(kind.id(), resolved))
    }
}

fn article_list(
    records: &[ArticleRecord],
    ids: &[ArticleId],
    contexts: &[CacheContext],
) -> (BlockContent, CacheableMetadata) {
    let items = records.iter().map(ArticleLink::from).collect();
    (
        BlockContent::ItemList {
            items,
            class: ARTICLE_LIST_CLASS,
        },
        CacheableMetadata::for_article_list(ids, contexts),
    )
}
