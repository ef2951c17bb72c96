//! Structured logging for the intake service.
//!
//! The submission pipeline and the review console emit `tracing` events;
//! this module installs the subscriber they land in. An explicit `RUST_LOG`
//! always takes priority over the configured level.

use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    /// The configured level is not a valid filter directive.
    BadDirective { directive: String, source: ParseError },
    /// A global subscriber was already installed.
    Install(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::BadDirective { directive, .. } => {
                write!(f, "log filter '{directive}' is not a valid directive")
            }
            TelemetryError::Install(err) => {
                write!(f, "could not install the tracing subscriber: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::BadDirective { source, .. } => Some(source),
            TelemetryError::Install(err) => Some(&**err),
        }
    }
}

/// Install the process-wide subscriber: compact, ANSI-free output.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::BadDirective {
            directive: config.log_level.clone(),
            source,
        })
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .compact()
        .try_init()
        .map_err(TelemetryError::Install)
}
