//! Layered configuration for the task store, rollover, and logging.
//!
//! Sources, lowest to highest priority:
//!
//! 1. Built-in defaults
//! 2. `weekplan.toml` in the working directory
//! 3. `WEEKPLAN_*` environment variables, with `__` separating sections
//!
//! `WEEKPLAN_DATABASE__URL` maps to `database.url`,
//! `WEEKPLAN_ROLLOVER__FALLBACK_REASON` to `rollover.fallback_reason`.

use crate::task::{domain::MAX_REASON_CHARS, services::DEFAULT_FALLBACK_REASON};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// File consulted in the working directory.
pub const CONFIG_FILE: &str = "weekplan.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "WEEKPLAN_";

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider could not be read or extracted.
    #[error("configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A value was read but is unusable.
    #[error("invalid configuration value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

/// Task store connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Upper bound on pooled connections.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/weekplan".to_owned(),
            max_connections: 8,
        }
    }
}

/// Rollover settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloverConfig {
    /// Reason recorded on reviews synthesised for unreviewed tasks.
    pub fallback_reason: String,
}

impl Default for RolloverConfig {
    fn default() -> Self {
        Self {
            fallback_reason: DEFAULT_FALLBACK_REASON.to_owned(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directives; `RUST_LOG` takes precedence.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            json: false,
        }
    }
}

/// Process-wide settings, constructed once at startup and passed by
/// reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekplanConfig {
    /// Task store connection.
    pub database: DatabaseConfig,
    /// Rollover behaviour.
    pub rollover: RolloverConfig,
    /// Logging.
    pub log: LogConfig,
}

impl WeekplanConfig {
    /// Loads configuration from defaults, [`CONFIG_FILE`], and the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source is malformed and
    /// [`ConfigError::InvalidValue`] when a value fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Loads configuration using `path` in place of [`CONFIG_FILE`].
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::load`].
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment(path).extract().map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the provider chain.
    #[must_use]
    pub fn figment(path: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.url",
                reason: "must not be empty",
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                field: "database.max_connections",
                reason: "must be at least 1",
            });
        }
        if self.rollover.fallback_reason.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "rollover.fallback_reason",
                reason: "must not be blank",
            });
        }
        if self.rollover.fallback_reason.trim().chars().count() > MAX_REASON_CHARS {
            return Err(ConfigError::InvalidValue {
                field: "rollover.fallback_reason",
                reason: "must fit in 500 characters",
            });
        }
        Ok(())
    }
}
