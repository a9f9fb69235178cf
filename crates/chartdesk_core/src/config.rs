//! Runtime configuration for the core.
//!
//! # Responsibility
//! - Resolve database path and logging options from the host environment.
//!
//! # Invariants
//! - `db_path` is always set; an unset or blank value is a configuration error.
//! - `log_level` is normalized to one of `trace|debug|info|warn|error`.

use crate::logging::{default_log_level, normalize_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "CHARTDESK_DB_PATH";
pub const ENV_LOG_DIR: &str = "CHARTDESK_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "CHARTDESK_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidValue { var: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingVar(var) => write!(f, "required environment variable `{var}` is not set"),
            Self::InvalidValue { var, message } => write!(f, "invalid `{var}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Core configuration shared by the store context and logging bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite database file holding records, attachments and markers.
    pub db_path: PathBuf,
    /// Directory for rolling log files. Logging stays off when `None`.
    pub log_dir: Option<PathBuf>,
    pub log_level: &'static str,
}

impl CoreConfig {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            log_dir: None,
            log_level: default_log_level(),
        }
    }

    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = non_blank(lookup(ENV_DB_PATH)).ok_or(ConfigError::MissingVar(ENV_DB_PATH))?;
        let mut config = Self::new(db_path);

        config.log_dir = non_blank(lookup(ENV_LOG_DIR)).map(PathBuf::from);
        if let Some(level) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = normalize_level(&level).map_err(|err| {
                ConfigError::InvalidValue {
                    var: ENV_LOG_LEVEL,
                    message: err.to_string(),
                }
            })?;
        }

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|trimmed| !trimmed.is_empty())
}
