mod feedback;
mod import;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use feedq_core::{AppConfig, ConfigError, PipelineConfig};
use feedq_db::PgFeedbackStore;
use feedq_pipeline::FeedbackPipeline;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "feedq-cli")]
#[command(about = "Feedback intake and prioritization")]
struct Cli {
    /// YAML file overriding the built-in scoring configuration
    #[arg(long, global = true, env = "FEEDQ_PIPELINE_CONFIG")]
    pipeline_config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Score, deduplicate and store one piece of feedback
    Ingest {
        /// Raw feedback text
        text: String,
        /// Source tag stored with the item
        #[arg(long, default_value = "manual")]
        source: String,
    },
    /// Score text without storing it
    Score {
        /// Raw feedback text
        text: String,
        /// Print the full analysis as JSON
        #[arg(long)]
        json: bool,
    },
    /// Import a CSV file of reviews
    Import {
        /// Path to the CSV file
        file: PathBuf,
        /// Source tag for every imported row (defaults to `FEEDQ_IMPORT_SOURCE`)
        #[arg(long)]
        source: Option<String>,
        /// Rows processed concurrently (defaults to `FEEDQ_IMPORT_CONCURRENCY`)
        #[arg(long)]
        concurrency: Option<usize>,
        /// Stop taking new rows after this many seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
        /// Score rows in memory without touching the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the newest feedback
    List {
        #[arg(long, default_value = "20")]
        limit: u32,
    },
    /// Show scored feedback in priority order
    Prioritized {
        #[arg(long, default_value = "20")]
        limit: u32,
    },
    /// Show KPIs for a trailing window
    Kpis {
        /// Window length in days (1-180)
        #[arg(long, default_value = "30")]
        days: u32,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Recompute scores under the current scoring configuration
    Rescore {
        /// Re-score a single item
        #[arg(long, conflicts_with = "all", required_unless_present = "all")]
        id: Option<i64>,
        /// Re-score the newest items
        #[arg(long)]
        all: bool,
        /// How many items `--all` covers (1-500)
        #[arg(long, default_value = "100")]
        limit: u32,
    },
    /// Show the owning team and next step for a stored item
    Route {
        #[arg(long)]
        id: i64,
    },
    /// Show stored item counts per source
    Status,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = feedq_core::load_app_config();
    let log_level = config.as_ref().map_or("info", |c| c.log_level.as_str());
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("feedq-cli ready; run with --help for commands");
        return Ok(());
    };

    let pipeline_config = load_pipeline_config(cli.pipeline_config.as_deref(), &config)?;

    match command {
        Commands::Score { text, json } => {
            feedback::run_score(pipeline_config, &text, json)?;
        }
        Commands::Import {
            file,
            source,
            concurrency,
            timeout_secs,
            dry_run,
        } => {
            let settings = import::ImportSettings::resolve(
                config.as_ref().ok(),
                source,
                concurrency,
                timeout_secs,
            );
            if dry_run {
                import::run_import_dry_run(pipeline_config, &file, &settings).await?;
            } else {
                let pipeline = connect_pipeline(require(&config)?, pipeline_config).await?;
                import::run_import(&pipeline, &file, &settings).await?;
            }
        }
        Commands::Db { command } => {
            let pool = feedq_db::connect_pool_from_config(require(&config)?).await?;
            match command {
                DbCommands::Ping => {
                    feedq_db::health_check(&pool).await?;
                    println!("database ok");
                }
                DbCommands::Migrate => {
                    let applied = feedq_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
            }
        }
        command => {
            let pipeline = connect_pipeline(require(&config)?, pipeline_config).await?;
            run_stored(&pipeline, command).await?;
        }
    }

    Ok(())
}

/// Commands that read or write the feedback table.
async fn run_stored(
    pipeline: &FeedbackPipeline<PgFeedbackStore>,
    command: Commands,
) -> anyhow::Result<()> {
    match command {
        Commands::Ingest { text, source } => feedback::run_ingest(pipeline, &text, &source).await,
        Commands::List { limit } => feedback::run_list(pipeline, limit).await,
        Commands::Prioritized { limit } => feedback::run_prioritized(pipeline, limit).await,
        Commands::Kpis { days, json } => feedback::run_kpis(pipeline, days, json).await,
        Commands::Rescore { id: Some(id), .. } => feedback::run_rescore_one(pipeline, id).await,
        Commands::Rescore { limit, .. } => feedback::run_rescore_recent(pipeline, limit).await,
        Commands::Route { id } => feedback::run_route(pipeline, id).await,
        Commands::Status => feedback::run_status(pipeline).await,
        other @ (Commands::Db { .. } | Commands::Score { .. } | Commands::Import { .. }) => {
            anyhow::bail!("{other:?} does not run against the feedback store")
        }
    }
}

/// The app config, or the error that kept it from loading.
fn require(config: &Result<AppConfig, ConfigError>) -> anyhow::Result<&AppConfig> {
    config
        .as_ref()
        .map_err(|e| anyhow::anyhow!("configuration error: {e}"))
}

/// Pipeline config from `--pipeline-config`, else `FEEDQ_PIPELINE_CONFIG`
/// via the app config, else the built-in defaults.
fn load_pipeline_config(
    explicit: Option<&Path>,
    config: &Result<AppConfig, ConfigError>,
) -> anyhow::Result<Arc<PipelineConfig>> {
    let from_app = config
        .as_ref()
        .ok()
        .and_then(|c| c.pipeline_config_path.as_deref());
    match explicit.or(from_app) {
        Some(path) => {
            let pipeline_config = feedq_core::load_pipeline_config(path)?;
            tracing::info!(path = %path.display(), "loaded pipeline config");
            Ok(Arc::new(pipeline_config))
        }
        None => Ok(Arc::new(PipelineConfig::default())),
    }
}

async fn connect_pipeline(
    config: &AppConfig,
    pipeline_config: Arc<PipelineConfig>,
) -> anyhow::Result<FeedbackPipeline<PgFeedbackStore>> {
    let pool = feedq_db::connect_pool_from_config(config).await?;
    let store = PgFeedbackStore::new(pool);
    Ok(FeedbackPipeline::new(store, pipeline_config)?)
}

#[cfg(test)]
mod tests;
