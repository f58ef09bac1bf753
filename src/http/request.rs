//! Inbound request representation.
//!
//! # Responsibilities
//! - Hold what the platform hands us: method, uri, headers, body, client IP
//! - Convert from an axum request for the local adapter
//!
//! # Design Decisions
//! - Read-only once built; every stage borrows it
//! - Body kept base64-encoded, the way edge platforms deliver it

use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

/// A request as seen by the gate.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub method: String,
    pub uri: String,
    pub headers: HeaderMap,
    pub body_base64: Option<String>,
    pub client_ip: String,
}

impl InboundRequest {
    pub fn new(method: impl Into<String>, uri: impl Into<String>, client_ip: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            client_ip: client_ip.into(),
            ..Default::default()
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Attach a raw body, base64-encoding it. Empty bodies are treated as absent.
    pub fn with_raw_body(mut self, body: &[u8]) -> Self {
        self.body_base64 = (!body.is_empty()).then(|| BASE64.encode(body));
        self
    }

    pub fn with_body_base64(mut self, body: impl Into<String>) -> Self {
        self.body_base64 = Some(body.into());
        self
    }

    /// Value of the `x-request-id` header, for log correlation.
    pub fn request_id(&self) -> &str {
        self.headers
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}
