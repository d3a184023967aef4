use std::{process, sync::Arc};

use curated::{
    application::{
        articles::ArticleQueryEngine,
        blocks::{BlockKind, BlockLimits, BlockService, RequestContext},
        error::AppError,
        repos::{ArticlesRepo, UsersRepo},
    },
    cache::{CacheConfig, CacheKeyDeriver},
    config,
    domain::types::UserId,
    infra::{fixtures, telemetry},
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, chain = ?error.messages(), "application error");
        return;
    }

    let subscriber = tracing_fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::ERROR)
        .finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, chain = ?error.messages(), "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    telemetry::init(&settings.logging)?;

    let service = build_block_service(&settings).await?;

    match cli_args.command {
        config::Command::Render(args) => {
            run_render(&service, args.block.into(), args.user, args.path).await
        }
        config::Command::Context(args) => run_context(&service, args.user).await,
    }
}

async fn build_block_service(settings: &config::Settings) -> Result<BlockService, AppError> {
    let repositories = Arc::new(fixtures::load_content(&settings.content.file).await?);
    let users: Arc<dyn UsersRepo> = repositories.clone();
    let articles: Arc<dyn ArticlesRepo> = repositories;

    let engine = ArticleQueryEngine::new(articles, settings.blocks.enforce_access_control);
    let deriver = CacheKeyDeriver::new(settings.blocks.cache_key_mode);
    let limits = BlockLimits {
        latest: settings.blocks.latest_limit,
        preferred: settings.blocks.preferred_limit,
    };

    info!(
        target = "curated::main",
        content = %settings.content.file.display(),
        key_mode = deriver.mode().as_str(),
        access_checked = settings.blocks.enforce_access_control,
        cache_enabled = settings.cache.enabled,
        "block service ready"
    );

    Ok(BlockService::new(
        users,
        engine,
        deriver,
        limits,
        &CacheConfig::from(&settings.cache),
    ))
}

async fn run_render(
    service: &BlockService,
    kind: BlockKind,
    user: Option<u64>,
    path: String,
) -> Result<(), AppError> {
    let request = RequestContext::new(path, user.map(UserId::new));
    let output = service.render(kind, &request).await?;
    let rendered = serde_json::to_string_pretty(&output)
        .map_err(|err| AppError::unexpected(format!("failed to encode block output: {err}")))?;
    println!("{rendered}");
    Ok(())
}

async fn run_context(service: &BlockService, user: Option<u64>) -> Result<(), AppError> {
    let key = service.preference_key(user.map(UserId::new)).await?;
    println!("{key}");
    Ok(())
}
