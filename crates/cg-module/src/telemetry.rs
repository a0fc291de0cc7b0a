//! Structured logging for one module invocation.
//!
//! Logs always go to standard error; standard output belongs to the protocol.
//! The subscriber is scoped to the returned [`TelemetryHandle`] rather than
//! installed globally, so tests and embedders can run invocations side by
//! side.

use std::io::{self, IsTerminal};

use cg_module_config::{Config, LogFormat};
use tracing::Subscriber;
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;

/// Keeps the invocation's subscriber active until dropped.
#[derive(Debug)]
pub struct TelemetryHandle {
    _guard: DefaultGuard,
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the configured log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
}

/// Installs the subscriber described by `config` for the current thread.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] if the filter expression is invalid.
///
/// # Examples
///
/// ```rust
/// use cg_module::telemetry;
/// use cg_module_config::Config;
///
/// # fn main() -> Result<(), cg_module::telemetry::TelemetryError> {
/// let handle = telemetry::initialise(&Config::default())?;
/// tracing::warn!("visible on stderr while `handle` is alive");
/// drop(handle);
/// # Ok(())
/// # }
/// ```
pub fn initialise(config: &Config) -> Result<TelemetryHandle, TelemetryError> {
    let subscriber = build_subscriber(config)?;
    Ok(TelemetryHandle {
        _guard: tracing::subscriber::set_default(subscriber),
    })
}

fn build_subscriber(
    config: &Config,
) -> Result<Box<dyn Subscriber + Send + Sync>, TelemetryError> {
    let filter = EnvFilter::try_new(config.log_filter())
        .map_err(|error| TelemetryError::Filter(error.to_string()))?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_timer(fmt::time::UtcTime::rfc_3339());

    let subscriber: Box<dyn Subscriber + Send + Sync> = match config.log_format() {
        LogFormat::Json => Box::new(
            builder
                .with_ansi(false)
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .finish(),
        ),
        LogFormat::Compact => Box::new(
            builder
                .with_ansi(io::stderr().is_terminal())
                .compact()
                .finish(),
        ),
    };
    Ok(subscriber)
}
