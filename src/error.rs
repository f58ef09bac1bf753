//! Crate-level error types.
//!
//! Only startup and adapter plumbing can fail with these. The request
//! pipeline itself always ends in a verdict.

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum GateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("No API key configured for the risk backend")]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Invalid edge event: {0}")]
    InvalidEvent(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GateResult<T> = Result<T, GateError>;
