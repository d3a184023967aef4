//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroU32, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::application::articles::ResultLimit;
use crate::application::blocks::BlockKind;
use crate::cache::KeyMode;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "curated";
const DEFAULT_CONTENT_FILE: &str = "content.toml";
const DEFAULT_LATEST_LIMIT: u32 = 3;
const DEFAULT_PREFERRED_LIMIT: u32 = 3;
const DEFAULT_CACHE_BLOCK_LIMIT: usize = 256;

/// Command-line arguments for the curated binary.
#[derive(Debug, Parser)]
#[command(
    name = "curated",
    version,
    about = "Render preference-aware article blocks"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "CURATED_CONFIG_FILE",
        value_name = "PATH",
        global = true
    )]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: GlobalOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args, Default, Clone)]
pub struct GlobalOverrides {
    /// Override the content fixture file.
    #[arg(long = "content-file", value_name = "PATH", value_hint = ValueHint::FilePath, global = true)]
    pub content_file: Option<PathBuf>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render a block for a viewer and print it as JSON.
    Render(RenderArgs),
    /// Print the preferred-taxonomy cache context for a viewer.
    Context(ContextArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Block to render.
    #[arg(value_enum, value_name = "BLOCK")]
    pub block: BlockArg,

    /// Viewer user id; omit for an anonymous viewer.
    #[arg(long = "user", value_name = "ID")]
    pub user: Option<u64>,

    /// Request path used for URL-varying blocks.
    #[arg(long = "path", value_name = "PATH", default_value = "/")]
    pub path: String,
}

#[derive(Debug, Args, Clone)]
pub struct ContextArgs {
    /// Viewer user id; omit for an anonymous viewer.
    #[arg(long = "user", value_name = "ID")]
    pub user: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BlockArg {
    Latest,
    Preferred,
    UserEmail,
}

impl From<BlockArg> for BlockKind {
    fn from(arg: BlockArg) -> Self {
        match arg {
            BlockArg::Latest => BlockKind::LatestArticles,
            BlockArg::Preferred => BlockKind::PreferredArticles,
            BlockArg::UserEmail => BlockKind::UserEmail,
        }
    }
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub content: ContentSettings,
    pub blocks: BlockSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ContentSettings {
    pub file: PathBuf,
}

#[derive(Debug, Clone)]
pub struct BlockSettings {
    pub latest_limit: ResultLimit,
    pub preferred_limit: ResultLimit,
    pub enforce_access_control: bool,
    pub cache_key_mode: KeyMode,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub block_limit: usize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    pub(crate) fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("CURATED").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_overrides(&cli.overrides);

    Settings::from_raw(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    content: RawContentSettings,
    blocks: RawBlockSettings,
    cache: RawCacheSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, overrides: &GlobalOverrides) {
        if let Some(file) = overrides.content_file.as_ref() {
            self.content.file = Some(file.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            content,
            blocks,
            cache,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            content: build_content_settings(content)?,
            blocks: build_block_settings(blocks)?,
            cache: build_cache_settings(cache),
        })
    }
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_content_settings(content: RawContentSettings) -> Result<ContentSettings, LoadError> {
    let file = content
        .file
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_FILE));
    if file.as_os_str().is_empty() {
        return Err(LoadError::invalid("content.file", "path must not be empty"));
    }
    Ok(ContentSettings { file })
}

fn build_block_settings(blocks: RawBlockSettings) -> Result<BlockSettings, LoadError> {
    let latest = blocks.latest_limit.unwrap_or(DEFAULT_LATEST_LIMIT);
    let latest_limit = ResultLimit::Bounded(non_zero_u32(latest, "blocks.latest_limit")?);

    let preferred_limit = if blocks.preferred_unbounded.unwrap_or(false) {
        ResultLimit::Unbounded
    } else {
        let preferred = blocks.preferred_limit.unwrap_or(DEFAULT_PREFERRED_LIMIT);
        ResultLimit::Bounded(non_zero_u32(preferred, "blocks.preferred_limit")?)
    };

    let cache_key_mode = match blocks.cache_key_mode {
        Some(mode) => KeyMode::from_str(&mode)
            .map_err(|reason| LoadError::invalid("blocks.cache_key_mode", reason))?,
        None => KeyMode::default(),
    };

    Ok(BlockSettings {
        latest_limit,
        preferred_limit,
        enforce_access_control: blocks.enforce_access_control.unwrap_or(false),
        cache_key_mode,
    })
}

fn build_cache_settings(cache: RawCacheSettings) -> CacheSettings {
    CacheSettings {
        enabled: cache.enabled.unwrap_or(true),
        block_limit: cache.block_limit.unwrap_or(DEFAULT_CACHE_BLOCK_LIMIT),
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContentSettings {
    file: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawBlockSettings {
    latest_limit: Option<u32>,
    preferred_limit: Option<u32>,
    preferred_unbounded: Option<bool>,
    enforce_access_control: Option<bool>,
    cache_key_mode: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    enabled: Option<bool>,
    block_limit: Option<usize>,
}

fn non_zero_u32(value: u32, key: &'static str) -> Result<NonZeroU32, LoadError> {
    NonZeroU32::new(value).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

#[cfg(test)]
mod tests;
