use std::io::Write;
use std::sync::Arc;

use curated::application::articles::{ArticleQueryEngine, ResultLimit};
use curated::application::blocks::{
    BlockContent, BlockKind, BlockLimits, BlockOutput, BlockService, RequestContext,
};
use curated::application::preferences::PreferenceExtractor;
use curated::application::repos::{ArticlesRepo, UsersRepo};
use curated::cache::{CacheConfig, CacheKeyDeriver, CacheTag, KeyMode};
use curated::domain::interests::InterestSet;
use curated::domain::types::{ArticleId, InterestId, UserId};
use curated::infra::fixtures::load_content;
use curated::infra::memory::InMemoryRepositories;
use tempfile::NamedTempFile;

const CONTENT: &str = r#"
[[users]]
id = 1
name = "ada"
email = "ada@example.com"
preferences = [7, 3]

[[users]]
id = 2
name = "grace"

[[users]]
id = 3
name = "linus"
preferences = []

[[articles]]
id = 10
title = "Oldest"
created = 1700000000
interests = [7]
alias = "/articles/oldest"

[[articles]]
id = 11
title = "Second"
created = 1700000100
interests = [3, 4]

[[articles]]
id = 12
title = "Third"
created = 1700000200
interests = [4]

[[articles]]
id = 13
title = "Fourth"
created = 1700000300
interests = [9]

[[articles]]
id = 14
title = "Newest"
created = 1700000400
interests = [7]

[[articles]]
id = 20
title = "Draft"
created = 1800000000
interests = [7]
published = false

[[articles]]
id = 21
title = "About"
bundle = "page"
created = 1800000000
interests = [7]

[[articles]]
id = 22
title = "Members only"
created = 1800000000
interests = [3]
audience = "authenticated"
"#;

async fn load_fixture() -> InMemoryRepositories {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(CONTENT.as_bytes()).expect("write fixture");
    load_content(file.path()).await.expect("fixture loads")
}

fn service_with(repos: InMemoryRepositories, enforce_access: bool, cache: bool) -> BlockService {
    let repos = Arc::new(repos);
    let users: Arc<dyn UsersRepo> = repos.clone();
    let articles: Arc<dyn ArticlesRepo> = repos;
    BlockService::new(
        users,
        ArticleQueryEngine::new(articles, enforce_access),
        CacheKeyDeriver::new(KeyMode::Ordered),
        BlockLimits::default(),
        &CacheConfig {
            enabled: cache,
            ..Default::default()
        },
    )
}

fn item_ids(output: &BlockOutput) -> Vec<u64> {
    match &output.content {
        BlockContent::ItemList { items, .. } => items.iter().map(|item| item.id.get()).collect(),
        BlockContent::Markup { .. } => panic!("expected item list"),
    }
}

fn ids(values: &[u64]) -> Vec<ArticleId> {
    values.iter().copied().map(ArticleId::new).collect()
}

#[tokio::test]
async fn latest_block_returns_three_newest_published_articles() {
    let repos = load_fixture().await;
    let service = service_with(repos, true, false);

    let output = service
        .render(BlockKind::LatestArticles, &RequestContext::new("/", None))
        .await
        .expect("block renders");

    assert_eq!(item_ids(&output), [14, 13, 12]);
    let tags: Vec<String> = output.cache.tags.iter().map(ToString::to_string).collect();
    assert_eq!(tags, ["node_list", "node:14", "node:13", "node:12"]);
}

#[tokio::test]
async fn bypassed_access_includes_members_only_articles() {
    let repos = load_fixture().await;
    let engine = ArticleQueryEngine::new(Arc::new(repos), false);

    let selection = engine
        .latest(None, ResultLimit::default())
        .await
        .expect("query succeeds");

    assert_eq!(selection.ids, ids(&[22, 14, 13]));
    assert!(selection.records.iter().all(|record| record.published));
    assert!(selection.records.iter().all(|record| record.bundle == "article"));
}

#[tokio::test]
async fn preferred_block_lists_articles_sharing_an_interest() {
    let repos = load_fixture().await;
    let service = service_with(repos, true, false);

    let output = service
        .render(
            BlockKind::PreferredArticles,
            &RequestContext::new("/", Some(UserId::new(1))),
        )
        .await
        .expect("block renders");

    // Members-only article 22 is visible to a signed-in viewer.
    assert_eq!(item_ids(&output), [22, 14, 11]);
}

#[tokio::test]
async fn unbounded_preferred_limit_returns_every_match() {
    let repos = Arc::new(load_fixture().await);
    let users: Arc<dyn UsersRepo> = repos.clone();
    let engine = ArticleQueryEngine::new(repos, true);

    let interests = PreferenceExtractor::new()
        .extract_for(users.as_ref(), Some(UserId::new(1)))
        .await
        .expect("lookup succeeds");
    let selection = engine
        .preferred(Some(UserId::new(1)), &interests, ResultLimit::Unbounded)
        .await
        .expect("query succeeds");

    assert_eq!(selection.ids, ids(&[22, 14, 11, 10]));
}

#[tokio::test]
async fn preference_keys_follow_stored_interest_order() {
    let repos = load_fixture().await;
    let service = service_with(repos, false, false);

    let cases = [
        (Some(1), "7_3"),
        (Some(2), "none"),
        (Some(3), "none"),
        (Some(404), "none"),
        (None, "none"),
    ];

    for (viewer, expected) in cases {
        let key = service
            .preference_key(viewer.map(UserId::new))
            .await
            .expect("lookup succeeds");
        assert_eq!(key.as_str(), expected, "viewer {viewer:?}");
    }
}

#[tokio::test]
async fn users_without_interests_get_an_empty_preferred_block() {
    let repos = load_fixture().await;
    let service = service_with(repos, false, false);

    for viewer in [Some(2), Some(3), Some(404), None] {
        let output = service
            .render(
                BlockKind::PreferredArticles,
                &RequestContext::new("/", viewer.map(UserId::new)),
            )
            .await
            .expect("block renders");
        assert!(item_ids(&output).is_empty(), "viewer {viewer:?}");
    }
}

#[tokio::test]
async fn article_links_prefer_path_aliases() {
    let repos = load_fixture().await;
    let engine = ArticleQueryEngine::new(Arc::new(repos), false);
    let interests: InterestSet = vec![InterestId::new(7)].into();

    let selection = engine
        .preferred(None, &interests, ResultLimit::Unbounded)
        .await
        .expect("query succeeds");

    let hrefs: Vec<String> = selection.records.iter().map(|record| record.href()).collect();
    assert_eq!(hrefs, ["/node/14", "/articles/oldest"]);
}

#[tokio::test]
async fn invalidating_an_article_tag_drops_cached_lists() {
    let repos = load_fixture().await;
    let service = service_with(repos, false, true);
    let front = RequestContext::new("/", None);
    let other = RequestContext::new("/other", None);

    service
        .render(BlockKind::LatestArticles, &front)
        .await
        .expect("block renders");
    service
        .render(BlockKind::LatestArticles, &other)
        .await
        .expect("block renders");
    service
        .render(BlockKind::UserEmail, &front)
        .await
        .expect("block renders");

    assert_eq!(service.invalidate_tags(&[CacheTag::Article(ArticleId::new(14))]), 2);
    assert_eq!(service.invalidate_tags(&[CacheTag::ArticleList]), 0);
}

#[tokio::test]
async fn email_block_reports_viewer_email() {
    let repos = load_fixture().await;
    let service = service_with(repos, false, false);

    let output = service
        .render(
            BlockKind::UserEmail,
            &RequestContext::new("/", Some(UserId::new(1))),
        )
        .await
        .expect("block renders");

    assert_eq!(
        output.content,
        BlockContent::Markup {
            text: "Current user email: ada@example.com".into()
        }
    );
}

#[tokio::test]
async fn cached_lists_do_not_cross_viewer_roles_when_access_is_enforced() {
    let repos = load_fixture().await;
    let service = service_with(repos, true, true);

    let signed_in = service
        .render(
            BlockKind::LatestArticles,
            &RequestContext::new("/", Some(UserId::new(1))),
        )
        .await
        .expect("block renders");
    let anonymous = service
        .render(BlockKind::LatestArticles, &RequestContext::new("/", None))
        .await
        .expect("block renders");
    let signed_in_again = service
        .render(
            BlockKind::LatestArticles,
            &RequestContext::new("/", Some(UserId::new(2))),
        )
        .await
        .expect("block renders");

    assert_eq!(item_ids(&signed_in), [22, 14, 13]);
    assert_eq!(item_ids(&anonymous), [14, 13, 12]);
    assert_eq!(item_ids(&signed_in_again), [22, 14, 13]);

    // Anonymous first, then signed in, on a fresh path.
    let anonymous_first = service
        .render(BlockKind::LatestArticles, &RequestContext::new("/news", None))
        .await
        .expect("block renders");
    let signed_in_after = service
        .render(
            BlockKind::LatestArticles,
            &RequestContext::new("/news", Some(UserId::new(1))),
        )
        .await
        .expect("block renders");

    assert_eq!(item_ids(&anonymous_first), [14, 13, 12]);
    assert_eq!(item_ids(&signed_in_after), [22, 14, 13]);
}
