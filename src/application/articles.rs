//! Recency-ordered article selection, optionally filtered by interests.

use std::num::NonZeroU32;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::repos::{AccessCheck, ArticleQuery, ArticlesRepo, RepoError};
use crate::domain::entities::ArticleRecord;
use crate::domain::interests::InterestSet;
use crate::domain::types::{ARTICLE_BUNDLE, ArticleId, InterestId, UserId};

const DEFAULT_RESULT_LIMIT: NonZeroU32 = NonZeroU32::MIN.saturating_add(2);

/// Maximum number of articles a selection may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultLimit {
    Bounded(NonZeroU32),
    Unbounded,
}

impl Default for ResultLimit {
    fn default() -> Self {
        ResultLimit::Bounded(DEFAULT_RESULT_LIMIT)
    }
}

impl ResultLimit {
    pub fn as_option(self) -> Option<u32> {
        match self {
            ResultLimit::Bounded(limit) => Some(limit.get()),
            ResultLimit::Unbounded => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleSelection {
    pub ids: Vec<ArticleId>,
    pub records: Vec<ArticleRecord>,
}

impl ArticleSelection {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn from_records(records: Vec<ArticleRecord>) -> Self {
        Self {
            ids: records.iter().map(|record| record.id).collect(),
            records,
        }
    }
}

#[derive(Clone)]
pub struct ArticleQueryEngine {
    articles: Arc<dyn ArticlesRepo>,
    enforce_access_control: bool,
}

impl ArticleQueryEngine {
    pub fn new(articles: Arc<dyn ArticlesRepo>, enforce_access_control: bool) -> Self {
        Self {
            articles,
            enforce_access_control,
        }
    }

    pub fn enforces_access_control(&self) -> bool {
        self.enforce_access_control
    }

    /// Most recent published articles, newest first.
    pub async fn latest(
        &self,
        viewer: Option<UserId>,
        limit: ResultLimit,
    ) -> Result<ArticleSelection, RepoError> {
        let query = self.base_query(viewer, limit, None);
        self.run(query).await
    }

    /// Most recent published articles sharing at least one interest with
    /// `interests`. An empty set selects nothing and skips storage.
    pub async fn preferred(
        &self,
        viewer: Option<UserId>,
        interests: &InterestSet,
        limit: ResultLimit,
    ) -> Result<ArticleSelection, RepoError> {
        if interests.is_empty() {
            debug!(
                target = "curated::articles",
                "no interests supplied; skipping preferred query"
            );
            return Ok(ArticleSelection::default());
        }

        let query = self.base_query(viewer, limit, Some(interests.as_slice().to_vec()));
        self.run(query).await
    }

    fn base_query(
        &self,
        viewer: Option<UserId>,
        limit: ResultLimit,
        interests: Option<Vec<InterestId>>,
    ) -> ArticleQuery {
        let access = if self.enforce_access_control {
            AccessCheck::Enforce { viewer }
        } else {
            AccessCheck::Bypass
        };

        ArticleQuery {
            bundle: ARTICLE_BUNDLE.to_string(),
            published: true,
            interests,
            limit: limit.as_option(),
            access,
        }
    }

    async fn run(&self, query: ArticleQuery) -> Result<ArticleSelection, RepoError> {
        let ids = self.articles.query_ids(&query).await?;
        if ids.is_empty() {
            return Ok(ArticleSelection::default());
        }

        let loaded = self.articles.load_many(&ids).await?;
        let loaded_count = loaded.len();

        let mut records: Vec<ArticleRecord> = loaded
            .into_iter()
            .filter(|record| satisfies(&query, record))
            .collect();

        if records.len() != loaded_count {
            warn!(
                target = "curated::articles",
                dropped = loaded_count - records.len(),
                "storage returned articles outside the query predicate"
            );
        }

        if let Some(limit) = query.limit {
            records.truncate(limit as usize);
        }

        debug!(
            target = "curated::articles",
            count = records.len(),
            filtered = query.interests.is_some(),
            "selected articles"
        );

        Ok(ArticleSelection::from_records(records))
    }
}

fn satisfies(query: &ArticleQuery, record: &ArticleRecord) -> bool {
    if record.published != query.published || record.bundle != query.bundle {
        return false;
    }
    if let Some(interests) = query.interests.as_deref() {
        if !record.matches_any(interests) {
            return false;
        }
    }
    match query.access {
        AccessCheck::Bypass => true,
        AccessCheck::Enforce { viewer } => record.audience.visible_to(viewer),
    }
}
