use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a positive integer, got {value:?}")]
    InvalidNumber { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    pub pool_size: u32,
    pub connection_timeout: Duration,
    pub busy_timeout: Duration,
    pub session_inactivity_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "srs.db".to_string(),
            bind_addr: "127.0.0.1:5000".to_string(),
            pool_size: 8,
            connection_timeout: Duration::from_millis(5000),
            busy_timeout: Duration::from_millis(5000),
            session_inactivity_days: 1,
        }
    }
}

impl AppConfig {
    /// Reads configuration from the environment, falling back to defaults
    /// for unset keys. Call `dotenv::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            pool_size: env_number("DB_POOL_SIZE", u64::from(defaults.pool_size))? as u32,
            connection_timeout: Duration::from_millis(env_number(
                "DB_CONNECTION_TIMEOUT_MS",
                defaults.connection_timeout.as_millis() as u64,
            )?),
            busy_timeout: Duration::from_millis(env_number(
                "SQLITE_BUSY_TIMEOUT_MS",
                defaults.busy_timeout.as_millis() as u64,
            )?),
            session_inactivity_days: env_number(
                "SESSION_INACTIVITY_DAYS",
                defaults.session_inactivity_days as u64,
            )? as i64,
        })
    }
}

fn env_number(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(value) => parse_positive(key, &value),
        Err(_) => Ok(default),
    }
}

fn parse_positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 && n <= u64::from(u32::MAX) => Ok(n),
        _ => Err(ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        }),
    }
}
