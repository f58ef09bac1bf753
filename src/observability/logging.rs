//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Configure log level from RUST_LOG or config
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - JSON format for production, pretty format for development
//! - Secrets (API key, cookies, authorization) are never logged

use tracing::Subscriber;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::schema::{LogFormat, ObservabilityConfig};

/// Filter used when RUST_LOG is unset.
pub fn default_filter(config: &ObservabilityConfig) -> String {
    format!("risk_gate={},tower_http=info", config.log_level)
}

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(config: &ObservabilityConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(config).into());

    if subscriber(config, filter).try_init().is_err() {
        tracing::debug!("Logging already initialized");
    }
}

/// Build the subscriber for the configured format, writing to stderr.
fn subscriber(config: &ObservabilityConfig, filter: EnvFilter) -> Box<dyn Subscriber + Send + Sync> {
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => Box::new(
            registry.with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr)),
        ),
        LogFormat::Pretty => {
            Box::new(registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)))
        }
    }
}
