//! Environment configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use mainote_db::{pool, PoolConfig};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub db_pool: PoolConfig,
    /// Per-call Store timeout.
    pub db_query_timeout: Duration,
    /// Whole-request timeout applied by the HTTP stack.
    pub request_timeout: Duration,
    pub run_migrations: bool,
    pub log: LogConfig,
}

/// Logging output settings.
#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    /// "json" or "text".
    pub format: String,
    /// Enables daily-rotated file output when set.
    pub file: Option<String>,
    /// ANSI color override; auto-detected when unset.
    pub ansi: Option<bool>,
}

impl LogConfig {
    pub fn from_env() -> Self {
        Self {
            format: env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string()),
            file: env::var("LOG_FILE").ok(),
            ansi: env::var("LOG_ANSI").ok().map(|v| v == "true" || v == "1"),
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == "json"
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenvy::dotenv();

        // GO_PORT is honored for deployments that predate PORT.
        let port = match env::var("PORT").or_else(|_| env::var("GO_PORT")) {
            Ok(raw) => raw.parse().context("PORT must be a valid port number")?,
            Err(_) => 8081,
        };

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/mainote".to_string()),
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            db_pool: pool_config_from_env()?,
            db_query_timeout: Duration::from_millis(parse_var(
                "DB_QUERY_TIMEOUT_MS",
                mainote_core::defaults::QUERY_TIMEOUT_MS,
            )?),
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30)?),
            run_migrations: env::var("RUN_MIGRATIONS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(true),
            log: LogConfig::from_env(),
        })
    }

    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Pool settings from `DB_*` variables. A zero idle timeout or lifetime
/// disables that limit.
fn pool_config_from_env() -> Result<PoolConfig> {
    Ok(PoolConfig::new()
        .max_connections(parse_var("DB_MAX_CONNECTIONS", pool::DEFAULT_MAX_CONNECTIONS)?)
        .min_connections(parse_var("DB_MIN_CONNECTIONS", pool::DEFAULT_MIN_CONNECTIONS)?)
        .acquire_timeout(Duration::from_secs(parse_var(
            "DB_ACQUIRE_TIMEOUT_SECS",
            pool::DEFAULT_ACQUIRE_TIMEOUT.as_secs(),
        )?))
        .idle_timeout(optional_secs(
            "DB_IDLE_TIMEOUT_SECS",
            pool::DEFAULT_IDLE_TIMEOUT.as_secs(),
        )?)
        .max_lifetime(optional_secs(
            "DB_MAX_LIFETIME_SECS",
            pool::DEFAULT_MAX_LIFETIME.as_secs(),
        )?))
}

fn optional_secs(name: &str, default: u64) -> Result<Option<Duration>> {
    let secs: u64 = parse_var(name, default)?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a valid number, got {:?}", name, raw)),
        Err(_) => Ok(default),
    }
}
