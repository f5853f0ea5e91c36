//! Tracing setup and structured logging helpers

use portico_domain::{LoggingConfig, PorticoError};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over the configured filter when it parses. Returns `false`
/// if a subscriber was already installed (tests, embedding hosts).
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(&config.filter));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    installed.is_ok()
}

/// Convert a `PorticoError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &PorticoError) -> &'static str {
    match error {
        PorticoError::Api(err) if err.status == 401 => "unauthorized",
        PorticoError::Api(_) => "api",
        PorticoError::Network(_) => "network",
        PorticoError::Decode(_) => "decode",
        PorticoError::Auth(_) => "auth",
        PorticoError::Storage(_) => "storage",
        PorticoError::Config(_) => "config",
        PorticoError::InvalidInput(_) => "invalid_input",
        PorticoError::Internal(_) => "internal",
    }
}
