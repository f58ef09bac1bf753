//! Response assembly.
//!
//! # Responsibilities
//! - Turn an `EdgeVerdict` into the edge response object
//! - Attach caching, content-type and CORS headers on every path
//! - Serialize the body for its kind
//!
//! # Design Decisions
//! - Headers kept in a sorted map: identical verdicts give identical bytes
//! - Status is serialized as a string, as edge platforms expect

use std::collections::BTreeMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize, Serializer};

use crate::decision::verdict::{EdgeVerdict, VerdictBody};

pub const CACHE_CONTROL: &str = "max-age=100";
pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, HEAD, POST";

/// One header value with its display-case name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub value: String,
}

impl HeaderEntry {
    pub fn new(key: &str, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.to_string()),
            value: value.into(),
        }
    }
}

/// Multi-valued headers keyed by lowercase name.
pub type EdgeHeaders = BTreeMap<String, Vec<HeaderEntry>>;

/// Response object handed back to the edge platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    #[serde(serialize_with = "status_as_string")]
    pub status: u16,
    pub status_description: String,
    pub headers: EdgeHeaders,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl EdgeResponse {
    /// First value of a header, looked up case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(|entry| entry.value.as_str())
    }
}

fn status_as_string<S: Serializer>(status: &u16, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(status)
}

/// Build the edge response for a verdict.
pub fn build(verdict: &EdgeVerdict) -> EdgeResponse {
    let mut headers = EdgeHeaders::new();
    let mut insert = |key: &str, value: &str| {
        headers.insert(key.to_ascii_lowercase(), vec![HeaderEntry::new(key, value)]);
    };

    insert("Cache-Control", CACHE_CONTROL);
    insert("Content-Type", verdict.body_kind().content_type());
    insert("Access-Control-Allow-Origin", ALLOW_ORIGIN);
    insert("Access-Control-Allow-Methods", ALLOW_METHODS);

    let body = match &verdict.body {
        VerdictBody::Json(value) => Some(value.to_string()),
        VerdictBody::Html(page) => Some(page.clone()),
        VerdictBody::Empty => None,
    };

    EdgeResponse {
        status: verdict.status,
        status_description: status_description(verdict.status).to_string(),
        headers,
        body,
    }
}

fn status_description(status: u16) -> &'static str {
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
}
