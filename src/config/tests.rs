use super::*;

#[test]
fn defaults_match_documented_values() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.content.file, PathBuf::from("content.toml"));
    assert_eq!(settings.blocks.latest_limit, ResultLimit::default());
    assert_eq!(settings.blocks.preferred_limit, ResultLimit::default());
    assert!(!settings.blocks.enforce_access_control);
    assert_eq!(settings.blocks.cache_key_mode, KeyMode::Ordered);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.block_limit, 256);
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("info".to_string());
    raw.content.file = Some(PathBuf::from("from-file.toml"));

    let overrides = GlobalOverrides {
        content_file: Some(PathBuf::from("from-cli.toml")),
        log_level: Some("debug".to_string()),
        log_json: Some(true),
    };

    raw.apply_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.content.file, PathBuf::from("from-cli.toml"));
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_limit_is_rejected() {
    let mut raw = RawSettings::default();
    raw.blocks.latest_limit = Some(0);

    match Settings::from_raw(raw) {
        Err(LoadError::Invalid { key, .. }) => assert_eq!(key, "blocks.latest_limit"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn preferred_query_can_be_unbounded() {
    let mut raw = RawSettings::default();
    raw.blocks.preferred_limit = Some(0);
    raw.blocks.preferred_unbounded = Some(true);

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.blocks.preferred_limit, ResultLimit::Unbounded);
}

#[test]
fn explicit_preferred_limit_is_honoured() {
    let mut raw = RawSettings::default();
    raw.blocks.preferred_limit = Some(10);

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.blocks.preferred_limit.as_option(),
        Some(10),
    );
}

#[test]
fn unknown_cache_key_mode_is_rejected() {
    let mut raw = RawSettings::default();
    raw.blocks.cache_key_mode = Some("shuffled".to_string());

    match Settings::from_raw(raw) {
        Err(LoadError::Invalid { key, reason }) => {
            assert_eq!(key, "blocks.cache_key_mode");
            assert!(reason.contains("shuffled"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn invalid_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    assert!(matches!(
        Settings::from_raw(raw),
        Err(LoadError::Invalid {
            key: "logging.level",
            ..
        })
    ));
}

#[test]
fn settings_deserialize_from_toml_source() {
    let source = r#"
        [blocks]
        latest_limit = 5
        cache_key_mode = "sorted"
        enforce_access_control = true

        [cache]
        enabled = false
    "#;

    let raw: RawSettings = Config::builder()
        .add_source(File::from_str(source, config::FileFormat::Toml))
        .build()
        .expect("config builds")
        .try_deserialize()
        .expect("raw settings deserialize");
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.blocks.latest_limit.as_option(), Some(5));
    assert_eq!(settings.blocks.cache_key_mode, KeyMode::Sorted);
    assert!(settings.blocks.enforce_access_control);
    assert!(!settings.cache.enabled);
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from([
        "curated",
        "render",
        "preferred",
        "--user",
        "7",
        "--content-file",
        "/tmp/site.toml",
    ]);

    assert_eq!(
        args.overrides.content_file.as_deref(),
        Some(std::path::Path::new("/tmp/site.toml"))
    );
    match args.command {
        Command::Render(render) => {
            assert_eq!(render.block, BlockArg::Preferred);
            assert_eq!(BlockKind::from(render.block), BlockKind::PreferredArticles);
            assert_eq!(render.user, Some(7));
            assert_eq!(render.path, "/");
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_context_arguments() {
    let args = CliArgs::parse_from(["curated", "--log-level", "warn", "context", "--user", "3"]);

    assert_eq!(args.overrides.log_level.as_deref(), Some("warn"));
    match args.command {
        Command::Context(context) => assert_eq!(context.user, Some(3)),
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn user_email_block_uses_kebab_case_name() {
    let args = CliArgs::parse_from(["curated", "render", "user-email"]);
    match args.command {
        Command::Render(render) => {
            assert_eq!(BlockKind::from(render.block), BlockKind::UserEmail);
            assert_eq!(render.user, None);
        }
        _ => panic!("wrong command parsed"),
    }
}
