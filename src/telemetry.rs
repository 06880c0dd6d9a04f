//! Structured logging setup.

use crate::config::LogConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured filter directives do not parse.
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    /// A global subscriber is already installed.
    #[error("failed to install tracing subscriber: {0}")]
    Install(String),
}

/// Installs the process-wide `tracing` subscriber.
///
/// `RUST_LOG` overrides [`LogConfig::filter`] when set. Events go to stderr so
/// command output on stdout stays machine-readable.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for unparsable directives and
/// [`TelemetryError::Install`] when called more than once.
pub fn init(config: &LogConfig) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.filter))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|err| TelemetryError::Install(err.to_string()))
}
