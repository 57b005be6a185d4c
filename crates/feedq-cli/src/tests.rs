use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["feedq-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["feedq-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["feedq-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn ingest_defaults_to_manual_source() {
    let cli = Cli::try_parse_from(["feedq-cli", "ingest", "Sync is broken"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Ingest { ref text, ref source })
            if text == "Sync is broken" && source == "manual"
    ));
}

#[test]
fn ingest_requires_text() {
    assert!(Cli::try_parse_from(["feedq-cli", "ingest"]).is_err());
}

#[test]
fn parses_score_json() {
    let cli = Cli::try_parse_from(["feedq-cli", "score", "Would love a dark mode", "--json"])
        .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Score { json: true, .. })
    ));
}

#[test]
fn import_defaults() {
    let cli = Cli::try_parse_from(["feedq-cli", "import", "reviews.csv"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Import {
            ref file,
            source: None,
            concurrency: None,
            timeout_secs: None,
            dry_run: false,
        }) if file == Path::new("reviews.csv")
    ));
}

#[test]
fn import_with_all_flags() {
    let cli = Cli::try_parse_from([
        "feedq-cli",
        "import",
        "reviews.csv",
        "--source",
        "play_store",
        "--concurrency",
        "8",
        "--timeout-secs",
        "60",
        "--dry-run",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Import {
            source: Some(ref s),
            concurrency: Some(8),
            timeout_secs: Some(60),
            dry_run: true,
            ..
        }) if s == "play_store"
    ));
}

#[test]
fn list_and_prioritized_default_limit() {
    let list = Cli::try_parse_from(["feedq-cli", "list"]).unwrap();
    assert!(matches!(list.command, Some(Commands::List { limit: 20 })));

    let queue = Cli::try_parse_from(["feedq-cli", "prioritized", "--limit", "5"]).unwrap();
    assert!(matches!(queue.command, Some(Commands::Prioritized { limit: 5 })));
}

#[test]
fn kpis_default_window() {
    let cli = Cli::try_parse_from(["feedq-cli", "kpis"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Kpis {
            days: 30,
            json: false
        })
    ));
}

#[test]
fn rescore_by_id() {
    let cli = Cli::try_parse_from(["feedq-cli", "rescore", "--id", "42"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Rescore {
            id: Some(42),
            all: false,
            ..
        })
    ));
}

#[test]
fn rescore_all_with_limit() {
    let cli = Cli::try_parse_from(["feedq-cli", "rescore", "--all", "--limit", "250"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Rescore {
            id: None,
            all: true,
            limit: 250
        })
    ));
}

#[test]
fn rescore_needs_id_or_all_but_not_both() {
    assert!(Cli::try_parse_from(["feedq-cli", "rescore"]).is_err());
    assert!(Cli::try_parse_from(["feedq-cli", "rescore", "--id", "1", "--all"]).is_err());
}

#[test]
fn route_requires_id() {
    assert!(Cli::try_parse_from(["feedq-cli", "route"]).is_err());
    let cli = Cli::try_parse_from(["feedq-cli", "route", "--id", "7"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Route { id: 7 })));
}

#[test]
fn pipeline_config_flag_is_global() {
    let cli = Cli::try_parse_from([
        "feedq-cli",
        "score",
        "hello",
        "--pipeline-config",
        "config/pipeline.yaml",
    ])
    .unwrap();
    assert_eq!(
        cli.pipeline_config.as_deref(),
        Some(Path::new("config/pipeline.yaml"))
    );
}

#[test]
fn missing_config_is_reported_only_when_needed() {
    let missing: Result<AppConfig, ConfigError> =
        Err(ConfigError::MissingEnvVar("DATABASE_URL".to_string()));
    let err = require(&missing).unwrap_err();
    assert!(err.to_string().contains("DATABASE_URL"));

    let defaults = load_pipeline_config(None, &missing).unwrap();
    assert_eq!(*defaults, PipelineConfig::default());
}
