//! In-memory repository implementations backed by loaded content.

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::repos::{
    AccessCheck, ArticleQuery, ArticlesRepo, RepoError, UsersRepo,
};
use crate::domain::entities::{ArticleRecord, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::types::{ArticleId, UserId};

#[derive(Clone, Default)]
pub struct InMemoryRepositories {
    inner: Arc<Inner>,
}

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, UserRecord>,
    articles: BTreeMap<ArticleId, ArticleRecord>,
}

impl InMemoryRepositories {
    pub fn new(users: Vec<UserRecord>, articles: Vec<ArticleRecord>) -> Result<Self, DomainError> {
        let mut user_map = HashMap::with_capacity(users.len());
        for user in users {
            let id = user.id;
            if user_map.insert(id, user).is_some() {
                return Err(DomainError::validation(format!("duplicate user id {id}")));
            }
        }

        let mut article_map = BTreeMap::new();
        for article in articles {
            let id = article.id;
            if article_map.insert(id, article).is_some() {
                return Err(DomainError::validation(format!("duplicate article id {id}")));
            }
        }

        Ok(Self {
            inner: Arc::new(Inner {
                users: user_map,
                articles: article_map,
            }),
        })
    }

    pub fn user_count(&self) -> usize {
        self.inner.users.len()
    }

    pub fn article_count(&self) -> usize {
        self.inner.articles.len()
    }
}

fn matches(query: &ArticleQuery, article: &ArticleRecord) -> bool {
    let interests_match = query
        .interests
        .as_deref()
        .is_none_or(|interests| article.matches_any(interests));
    let visible = match query.access {
        AccessCheck::Bypass => true,
        AccessCheck::Enforce { viewer } => article.audience.visible_to(viewer),
    };

    article.bundle == query.bundle
        && article.published == query.published
        && interests_match
        && visible
}

#[async_trait]
impl UsersRepo for InMemoryRepositories {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.inner.users.get(&id).cloned())
    }
}

#[async_trait]
impl ArticlesRepo for InMemoryRepositories {
    async fn query_ids(&self, query: &ArticleQuery) -> Result<Vec<ArticleId>, RepoError> {
        let mut selected: Vec<&ArticleRecord> = self
            .inner
            .articles
            .values()
            .filter(|article| matches(query, article))
            .collect();

        // Ties on creation time fall back to the higher id first.
        selected.sort_by_key(|article| Reverse((article.created_at, article.id)));

        let limit = query
            .limit
            .map(|limit| limit as usize)
            .unwrap_or(selected.len());

        Ok(selected
            .into_iter()
            .take(limit)
            .map(|article| article.id)
            .collect())
    }

    async fn load_many(&self, ids: &[ArticleId]) -> Result<Vec<ArticleRecord>, RepoError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.inner.articles.get(id))
            .cloned()
            .collect())
    }
}
