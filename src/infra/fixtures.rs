//! TOML content fixtures.
//!
//! ```toml
//! [[users]]
//! id = 1
//! name = "ada"
//! email = "ada@example.com"
//! preferences = [7, 3]
//!
//! [[articles]]
//! id = 10
//! title = "Rust in production"
//! created = 1700000000
//! interests = [7]
//! alias = "/news/rust-in-production"
//! ```

use std::path::Path;

use serde::Deserialize;
use time::OffsetDateTime;
use tracing::info;

use crate::domain::entities::{ArticleRecord, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::types::{ARTICLE_BUNDLE, ArticleId, Audience, InterestId, UserId};

use super::error::InfraError;
use super::memory::InMemoryRepositories;

#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
struct RawContent {
    users: Vec<RawUser>,
    articles: Vec<RawArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawUser {
    id: u64,
    name: String,
    email: Option<String>,
    preferences: Option<Vec<u64>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArticle {
    id: u64,
    title: String,
    #[serde(default = "default_bundle")]
    bundle: String,
    #[serde(default = "default_published")]
    published: bool,
    created: i64,
    #[serde(default)]
    interests: Vec<u64>,
    alias: Option<String>,
    #[serde(default)]
    audience: Audience,
}

fn default_bundle() -> String {
    ARTICLE_BUNDLE.to_string()
}

fn default_published() -> bool {
    true
}

impl From<RawUser> for UserRecord {
    fn from(raw: RawUser) -> Self {
        Self {
            id: UserId::new(raw.id),
            name: raw.name,
            email: raw.email.filter(|email| !email.trim().is_empty()),
            interest_ids: raw
                .preferences
                .map(|ids| ids.into_iter().map(InterestId::new).collect()),
        }
    }
}

impl TryFrom<RawArticle> for ArticleRecord {
    type Error = DomainError;

    fn try_from(raw: RawArticle) -> Result<Self, Self::Error> {
        if raw.title.trim().is_empty() {
            return Err(DomainError::validation(format!(
                "article {} has an empty title",
                raw.id
            )));
        }

        let created_at = OffsetDateTime::from_unix_timestamp(raw.created).map_err(|err| {
            DomainError::validation(format!(
                "article {} has an invalid creation timestamp: {err}",
                raw.id
            ))
        })?;

        Ok(Self {
            id: ArticleId::new(raw.id),
            title: raw.title,
            bundle: raw.bundle,
            published: raw.published,
            created_at,
            interest_ids: raw.interests.into_iter().map(InterestId::new).collect(),
            path_alias: raw.alias,
            audience: raw.audience,
        })
    }
}

/// Parse fixture text into repositories. `origin` names the source in errors.
pub fn parse_content(text: &str, origin: &Path) -> Result<InMemoryRepositories, InfraError> {
    let raw: RawContent =
        toml::from_str(text).map_err(|err| InfraError::fixture(origin, err.to_string()))?;

    let users = raw.users.into_iter().map(UserRecord::from).collect();
    let articles = raw
        .articles
        .into_iter()
        .map(ArticleRecord::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(InMemoryRepositories::new(users, articles)?)
}

/// Read and parse a fixture file.
pub async fn load_content(path: &Path) -> Result<InMemoryRepositories, InfraError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| InfraError::read(path, err))?;
    let repos = parse_content(&text, path)?;

    info!(
        target = "curated::fixtures",
        path = %path.display(),
        users = repos.user_count(),
        articles = repos.article_count(),
        "loaded content fixture"
    );

    Ok(repos)
}
