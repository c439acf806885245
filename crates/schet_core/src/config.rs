//! Runtime configuration.
//!
//! # Responsibility
//! - Collect log and database settings from the process environment.
//!
//! # Invariants
//! - `log_level` is always one of trace|debug|info|warn|error.
//! - Empty environment values count as unset.

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "SCHET_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "SCHET_LOG_DIR";
pub const ENV_DB_PATH: &str = "SCHET_DB_PATH";

/// Settings shared by every front end of the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logging.
    pub log_dir: Option<PathBuf>,
    /// SQLite database file. `None` means an in-memory database.
    pub db_path: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: None,
        }
    }
}

impl CoreConfig {
    /// Reads `SCHET_LOG_LEVEL`, `SCHET_LOG_DIR` and `SCHET_DB_PATH`.
    ///
    /// # Errors
    /// Returns a readable message when the log level is unsupported.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let log_level = match non_empty(ENV_LOG_LEVEL) {
            Some(level) => normalize_level(&level)?.to_string(),
            None => default_log_level().to_string(),
        };

        Ok(Self {
            log_level,
            log_dir: non_empty(ENV_LOG_DIR).map(PathBuf::from),
            db_path: non_empty(ENV_DB_PATH).map(PathBuf::from),
        })
    }
}
