//! Viewer-request events.
//!
//! # Responsibilities
//! - Decode the platform's event shape
//! - Convert the embedded request into an `InboundRequest`
//! - Run the gate and produce the platform's expected output

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::assessment::AssessmentClient;
use crate::error::{GateError, GateResult};
use crate::http::request::InboundRequest;
use crate::http::response::{EdgeHeaders, EdgeResponse};
use crate::pipeline::{EdgeResult, Gate};

/// Top-level event delivered by the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewerRequestEvent {
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    pub cf: CfPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CfPayload {
    pub request: CfRequest,
}

/// Body encoding as delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyEncoding {
    #[default]
    Base64,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfBody {
    #[serde(default)]
    pub data: String,
    #[serde(default)]
    pub encoding: BodyEncoding,
    #[serde(default)]
    pub input_truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// The request embedded in a viewer-request event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfRequest {
    #[serde(default)]
    pub client_ip: String,
    pub method: String,
    pub uri: String,
    #[serde(default)]
    pub querystring: String,
    #[serde(default)]
    pub headers: EdgeHeaders,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<CfBody>,
}

impl CfRequest {
    /// Convert into the gate's request value.
    ///
    /// Header names or values the HTTP types reject are skipped.
    pub fn to_inbound(&self) -> InboundRequest {
        let mut headers = HeaderMap::new();
        for (name, entries) in &self.headers {
            let Ok(name) = HeaderName::from_bytes(name.as_bytes()) else {
                tracing::debug!(header = %name, "Skipping invalid header name");
                continue;
            };
            for entry in entries {
                match HeaderValue::from_str(&entry.value) {
                    Ok(value) => {
                        headers.append(name.clone(), value);
                    }
                    Err(_) => tracing::debug!(header = %name, "Skipping invalid header value"),
                }
            }
        }

        let uri = if self.querystring.is_empty() {
            self.uri.clone()
        } else {
            format!("{}?{}", self.uri, self.querystring)
        };

        let mut inbound =
            InboundRequest::new(self.method.as_str(), uri, self.client_ip.as_str()).with_headers(headers);

        if let Some(body) = self.body.as_ref().filter(|b| !b.data.is_empty()) {
            if body.input_truncated {
                tracing::debug!(uri = %self.uri, "Request body was truncated by the platform");
            }
            inbound = match body.encoding {
                BodyEncoding::Base64 => inbound.with_body_base64(body.data.as_str()),
                BodyEncoding::Text => inbound.with_body_base64(BASE64.encode(body.data.as_bytes())),
            };
        }

        inbound
    }
}

/// What the handler returns to the platform.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EdgeOutput {
    Response(EdgeResponse),
    Request(CfRequest),
}

/// Handle one viewer-request event.
pub async fn handle_event<C: AssessmentClient>(
    gate: &Gate<C>,
    event: ViewerRequestEvent,
) -> GateResult<EdgeOutput> {
    let request = event
        .records
        .into_iter()
        .next()
        .map(|record| record.cf.request)
        .ok_or_else(|| GateError::InvalidEvent("event has no records".into()))?;

    match gate.handle(&request.to_inbound()).await {
        EdgeResult::Respond(response) => Ok(EdgeOutput::Response(response)),
        EdgeResult::PassThrough => Ok(EdgeOutput::Request(request)),
    }
}
