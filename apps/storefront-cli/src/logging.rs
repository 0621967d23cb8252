//! Tracing setup for the command line tool
//!
//! Logs go to stderr so command output on stdout stays pipeable.

use thiserror::Error;
use tracing::{debug, Level};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    #[error("Failed to install subscriber: {0}")]
    Init(String),
}

pub type Result<T> = std::result::Result<T, LoggingError>;

/// Install the global subscriber
///
/// `RUST_LOG` takes precedence over `level` when set.
///
/// # Errors
/// Returns an error for an unknown level or if a subscriber is already installed
pub fn init_logging(level: &str, json_format: bool) -> Result<()> {
    level
        .parse::<Level>()
        .map_err(|e| LoggingError::InvalidLevel(format!("{level}: {e}")))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    if json_format {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true);

        registry
            .with(json_layer)
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE);

        registry
            .with(fmt_layer)
            .try_init()
            .map_err(|e| LoggingError::Init(e.to_string()))?;
    }

    debug!(level, json = json_format, "logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_unknown_level() {
        assert!(matches!(
            init_logging("chatty", false),
            Err(LoggingError::InvalidLevel(_))
        ));
    }
}
