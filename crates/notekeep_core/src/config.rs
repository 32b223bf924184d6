//! Runtime configuration for notekeep core.
//!
//! # Responsibility
//! - Group storage, query, auth and logging settings into typed structs.
//! - Load settings from the process environment (optionally seeded by `.env`).
//!
//! # Invariants
//! - `0 < default_limit <= max_limit` for list pagination.
//! - An auth secret is always present; there is no built-in fallback key.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const ENV_DATABASE_PATH: &str = "NOTEKEEP_DATABASE_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "NOTEKEEP_BUSY_TIMEOUT_MS";
pub const ENV_DEFAULT_PAGE_SIZE: &str = "NOTEKEEP_DEFAULT_PAGE_SIZE";
pub const ENV_MAX_PAGE_SIZE: &str = "NOTEKEEP_MAX_PAGE_SIZE";
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";
pub const ENV_TOKEN_TTL_MINUTES: &str = "ACCESS_TOKEN_EXPIRE_MINUTES";
pub const ENV_LOG_LEVEL: &str = "NOTEKEEP_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "NOTEKEEP_LOG_DIR";

const DEFAULT_DATABASE_FILE: &str = "notekeep.sqlite3";
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting `{0}`")]
    Missing(&'static str),
    #[error("setting `{key}` has invalid value `{value}`: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Storage settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    /// Database file path (ignored for in-memory connections).
    pub path: PathBuf,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }
}

impl Default for DbConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_FILE)
    }
}

/// Pagination bounds shared by every list-shaped read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Limit applied when the caller passes none (or zero).
    pub default_limit: u32,
    /// Upper bound every requested limit is clamped to.
    pub max_limit: u32,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_PAGE_SIZE,
            max_limit: MAX_PAGE_SIZE,
        }
    }
}

/// Token issuance settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub secret_key: String,
    pub access_token_ttl: chrono::Duration,
}

impl AuthConfig {
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            access_token_ttl: chrono::Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES),
        }
    }
}

/// File logging settings. Logging stays off when `log_dir` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: crate::logging::default_log_level().to_string(),
            log_dir: None,
        }
    }
}

/// Complete core configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db: DbConfig,
    pub query: QueryConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

impl CoreConfig {
    /// Builds a configuration with defaults and the given auth secret.
    pub fn with_secret(secret_key: impl Into<String>) -> Self {
        Self {
            db: DbConfig::default(),
            query: QueryConfig::default(),
            auth: AuthConfig::new(secret_key),
            logging: LoggingConfig::default(),
        }
    }

    /// Loads configuration from the process environment.
    ///
    /// A `.env` file in the working directory (or its parents) is read first
    /// when present; variables already set in the environment win.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Parses configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let secret_key = read(ENV_SECRET_KEY).ok_or(ConfigError::Missing(ENV_SECRET_KEY))?;
        let mut config = Self::with_secret(secret_key);

        if let Some(path) = read(ENV_DATABASE_PATH) {
            config.db.path = PathBuf::from(path);
        }
        if let Some(value) = read(ENV_BUSY_TIMEOUT_MS) {
            config.db.busy_timeout = Duration::from_millis(parse_number(ENV_BUSY_TIMEOUT_MS, &value)?);
        }
        if let Some(value) = read(ENV_DEFAULT_PAGE_SIZE) {
            config.query.default_limit = parse_number(ENV_DEFAULT_PAGE_SIZE, &value)?;
        }
        if let Some(value) = read(ENV_MAX_PAGE_SIZE) {
            config.query.max_limit = parse_number(ENV_MAX_PAGE_SIZE, &value)?;
        }
        if let Some(value) = read(ENV_TOKEN_TTL_MINUTES) {
            let minutes: i64 = parse_number(ENV_TOKEN_TTL_MINUTES, &value)?;
            if minutes <= 0 {
                return Err(ConfigError::Invalid {
                    key: ENV_TOKEN_TTL_MINUTES,
                    value,
                    reason: "must be positive".to_string(),
                });
            }
            config.auth.access_token_ttl = chrono::Duration::minutes(minutes);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.logging.level = level;
        }
        if let Some(dir) = read(ENV_LOG_DIR) {
            config.logging.log_dir = Some(PathBuf::from(dir));
        }

        config.query.validate()?;
        Ok(config)
    }
}

impl QueryConfig {
    /// Checks `0 < default_limit <= max_limit`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_limit == 0 {
            return Err(ConfigError::Invalid {
                key: ENV_MAX_PAGE_SIZE,
                value: self.max_limit.to_string(),
                reason: "must be positive".to_string(),
            });
        }
        if self.default_limit == 0 || self.default_limit > self.max_limit {
            return Err(ConfigError::Invalid {
                key: ENV_DEFAULT_PAGE_SIZE,
                value: self.default_limit.to_string(),
                reason: format!("must be between 1 and {}", self.max_limit),
            });
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|err| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: err.to_string(),
    })
}
