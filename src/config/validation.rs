//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (threshold within [0, 1], timeouts > 0)
//! - Detect duplicate routes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use axum::http::uri::Authority;
use axum::http::Method;
use thiserror::Error;

use crate::config::schema::GateConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("backend.api_key is empty")]
    MissingApiKey,

    #[error("backend.base_url '{0}' is not a valid URL")]
    InvalidBaseUrl(String),

    #[error("backend.timeout_ms must be greater than zero")]
    ZeroTimeout,

    #[error("policy.risk_threshold {0} is outside [0, 1]")]
    ThresholdOutOfRange(f64),

    #[error("route #{index}: invalid method '{method}'")]
    InvalidMethod { index: usize, method: String },

    #[error("route #{index}: path '{path}' must start with '/'")]
    InvalidPath { index: usize, path: String },

    #[error("route #{index}: event name is empty")]
    EmptyEvent { index: usize },

    #[error("route #{index}: duplicates {method} {path}")]
    DuplicateRoute {
        index: usize,
        method: String,
        path: String,
    },

    #[error("page #{index}: path '{path}' must start with '/'")]
    InvalidPagePath { index: usize, path: String },

    #[error("origin.address '{0}' is not a valid host:port")]
    InvalidOrigin(String),
}

/// Check a loaded configuration, collecting every problem found.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backend.api_key.trim().is_empty() {
        errors.push(ValidationError::MissingApiKey);
    }

    if url::Url::parse(&config.backend.base_url).is_err() {
        errors.push(ValidationError::InvalidBaseUrl(config.backend.base_url.clone()));
    }

    if config.backend.timeout_ms == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let threshold = config.policy.risk_threshold;
    if !(0.0..=1.0).contains(&threshold) {
        errors.push(ValidationError::ThresholdOutOfRange(threshold));
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        if route.method.is_empty() || Method::from_bytes(route.method.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidMethod {
                index,
                method: route.method.clone(),
            });
        }
        if !route.path.starts_with('/') {
            errors.push(ValidationError::InvalidPath {
                index,
                path: route.path.clone(),
            });
        }
        if route.event.trim().is_empty() {
            errors.push(ValidationError::EmptyEvent { index });
        }
        if !seen.insert((route.method.as_str(), route.path.as_str())) {
            errors.push(ValidationError::DuplicateRoute {
                index,
                method: route.method.clone(),
                path: route.path.clone(),
            });
        }
    }

    for (index, page) in config.pages.iter().enumerate() {
        if !page.path.starts_with('/') {
            errors.push(ValidationError::InvalidPagePath {
                index,
                path: page.path.clone(),
            });
        }
    }

    if let Some(address) = config.origin.address.as_deref() {
        if address.parse::<Authority>().is_err() {
            errors.push(ValidationError::InvalidOrigin(address.to_string()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
