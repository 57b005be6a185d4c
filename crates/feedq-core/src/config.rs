use std::env::VarError;
use std::path::PathBuf;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Read [`AppConfig`] from the process environment after loading `.env`.
///
/// # Errors
///
/// Returns `ConfigError` if `DATABASE_URL` is missing or any variable holds
/// an invalid value.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// As [`load_app_config`], without touching `.env` files.
///
/// # Errors
///
/// See [`load_app_config`].
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Typed access to environment variables through an injectable lookup.
struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    fn required(&self, var: &str) -> Result<String, ConfigError> {
        (self.lookup)(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    }

    /// The trimmed value, or `None` when unset or blank.
    fn optional(&self, var: &str) -> Option<String> {
        (self.lookup)(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn text(&self, var: &str, default: &str) -> String {
        self.optional(var).unwrap_or_else(|| default.to_string())
    }

    /// Like [`Self::text`], but a variable that is set to whitespace is an error.
    fn non_blank(&self, var: &str, default: &str) -> Result<String, ConfigError> {
        match (self.lookup)(var) {
            Ok(raw) if raw.trim().is_empty() => Err(invalid(var, "must not be blank")),
            Ok(raw) => Ok(raw.trim().to_string()),
            Err(_) => Ok(default.to_string()),
        }
    }

    fn parsed<T>(&self, var: &str) -> Result<Option<T>, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        self.optional(var)
            .map(|raw| raw.parse::<T>().map_err(|e| invalid(var, e.to_string())))
            .transpose()
    }

    fn parsed_or<T>(&self, var: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        Ok(self.parsed(var)?.unwrap_or(default))
    }
}

fn invalid(var: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: reason.into(),
    }
}

/// Assemble an [`AppConfig`] from `lookup`, so tests can pass a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let env = EnvReader { lookup };

    let config = AppConfig {
        database_url: env.required("DATABASE_URL")?,
        env: env.parsed_or("FEEDQ_ENV", Environment::Development)?,
        log_level: env.text("FEEDQ_LOG_LEVEL", "info"),
        pipeline_config_path: env.optional("FEEDQ_PIPELINE_CONFIG").map(PathBuf::from),
        db_max_connections: env.parsed_or("FEEDQ_DB_MAX_CONNECTIONS", 10)?,
        db_min_connections: env.parsed_or("FEEDQ_DB_MIN_CONNECTIONS", 1)?,
        db_acquire_timeout_secs: env.parsed_or("FEEDQ_DB_ACQUIRE_TIMEOUT_SECS", 10)?,
        import_concurrency: env.parsed_or("FEEDQ_IMPORT_CONCURRENCY", 4)?,
        import_timeout_secs: env.parsed("FEEDQ_IMPORT_TIMEOUT_SECS")?,
        import_source: env.non_blank("FEEDQ_IMPORT_SOURCE", "app_store_csv")?,
    };

    if config.import_concurrency == 0 {
        return Err(invalid("FEEDQ_IMPORT_CONCURRENCY", "must be at least 1"));
    }
    if config.db_min_connections > config.db_max_connections {
        return Err(invalid(
            "FEEDQ_DB_MIN_CONNECTIONS",
            format!(
                "{} exceeds FEEDQ_DB_MAX_CONNECTIONS ({})",
                config.db_min_connections, config.db_max_connections
            ),
        ));
    }
    Ok(config)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
