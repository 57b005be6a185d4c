use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Deployment environment, read from `FEEDQ_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Test => "test",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Development, Self::Test, Self::Production]
            .into_iter()
            .find(|env| env.as_str() == s)
            .ok_or_else(|| {
                format!("unknown environment '{s}', expected development, test or production")
            })
    }
}

/// Process-level settings for the CLI and the database pool.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    /// Optional YAML file overriding the compiled-in pipeline defaults.
    pub pipeline_config_path: Option<PathBuf>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Maximum number of CSV rows in flight at once during an import.
    pub import_concurrency: usize,
    /// Wall-clock budget for a single import; the batch stops between rows
    /// once it is exceeded.
    pub import_timeout_secs: Option<u64>,
    /// Source tag stamped on every row of a CSV import.
    pub import_source: String,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"<redacted>")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("pipeline_config_path", &self.pipeline_config_path)
            .field(
                "db_pool",
                &(
                    self.db_min_connections,
                    self.db_max_connections,
                    self.db_acquire_timeout_secs,
                ),
            )
            .field("import_concurrency", &self.import_concurrency)
            .field("import_timeout_secs", &self.import_timeout_secs)
            .field("import_source", &self.import_source)
            .finish()
    }
}
