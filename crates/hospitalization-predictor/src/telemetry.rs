//! Log output for the command line front end. Diagnostics go to stderr so that
//! stdout only carries results (bundles, percentages, preference values).

use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    Filter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("log subscriber could not be installed: {0}")]
    Install(String),
}

/// Pick the active filter: a non-empty `RUST_LOG` directive beats the
/// configured level.
pub fn filter_for(
    rust_log: Option<&str>,
    config: &TelemetryConfig,
) -> Result<EnvFilter, TelemetryError> {
    let directive = rust_log
        .map(str::trim)
        .filter(|directive| !directive.is_empty())
        .unwrap_or(config.log_level.as_str());

    EnvFilter::try_new(directive).map_err(|source| TelemetryError::Filter {
        value: directive.to_string(),
        source,
    })
}

pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = filter_for(rust_log.as_deref(), config)?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(|err| TelemetryError::Install(err.to_string()))
}
