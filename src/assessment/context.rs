//! Request context extraction.
//!
//! Recovers the identity signals a client posts alongside a protected form
//! (device token, one-time request token, username/email) and pairs them with
//! the client IP and scrubbed headers.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Serialize;

use crate::config::schema::ContextFieldsConfig;
use crate::http::request::InboundRequest;
use crate::security::HeaderScrubber;

/// Identity claimed by the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserIdentity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Request-scoped input to the assessment call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssessmentContext {
    pub client_token: Option<String>,
    pub request_token: Option<String>,
    pub user: Option<UserIdentity>,
    pub ip: String,
    pub headers: BTreeMap<String, String>,
}

impl AssessmentContext {
    /// True when no identity signal was recovered from the body.
    pub fn is_anonymous(&self) -> bool {
        self.client_token.is_none() && self.request_token.is_none() && self.user.is_none()
    }
}

/// Builds an [`AssessmentContext`] from an inbound request.
#[derive(Debug, Clone)]
pub struct ContextExtractor {
    fields: ContextFieldsConfig,
    scrubber: HeaderScrubber,
}

impl ContextExtractor {
    pub fn new(fields: ContextFieldsConfig, scrubber: HeaderScrubber) -> Self {
        Self { fields, scrubber }
    }

    /// Extract the context. Never fails: an undecodable body yields no identity.
    pub fn extract(&self, request: &InboundRequest) -> AssessmentContext {
        let mut context = AssessmentContext {
            ip: request.client_ip.clone(),
            headers: self.scrubber.scrub(&request.headers),
            ..Default::default()
        };

        let Some(encoded) = request.body_base64.as_deref() else {
            return context;
        };

        let body = match BASE64.decode(encoded.trim()) {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "Request body is not valid base64, continuing without identity");
                return context;
            }
        };

        let form = parse_form(&body);
        context.client_token = form.get(self.fields.client_token_field.as_str()).cloned();
        context.request_token = form.get(self.fields.request_token_field.as_str()).cloned();
        context.user = self
            .fields
            .identity_fields
            .iter()
            .find_map(|field| form.get(field.as_str()))
            .map(|email| UserIdentity {
                email: Some(email.clone()),
            });

        context
    }
}

/// Decode a urlencoded form, keeping the first non-empty value of each key.
fn parse_form(body: &[u8]) -> BTreeMap<String, String> {
    let mut form = BTreeMap::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        if value.is_empty() {
            continue;
        }
        form.entry(key.into_owned()).or_insert_with(|| value.into_owned());
    }
    form
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, HeaderValue};

    fn extractor() -> ContextExtractor {
        ContextExtractor::new(ContextFieldsConfig::default(), HeaderScrubber::default())
    }

    fn request() -> InboundRequest {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("secret123"));
        headers.insert("user-agent", HeaderValue::from_static("test-agent"));
        InboundRequest::new("POST", "/signup", "203.0.113.7").with_headers(headers)
    }

    #[test]
    fn test_no_body() {
        let ctx = extractor().extract(&request());
        assert!(ctx.is_anonymous());
        assert_eq!(ctx.ip, "203.0.113.7");
        assert_eq!(ctx.headers.get("user-agent").map(String::as_str), Some("test-agent"));
        assert!(!ctx.headers.contains_key("cookie"));
    }

    #[test]
    fn test_form_body() {
        // client_id=abc&username=a@b.com
        let req = request().with_body_base64("Y2xpZW50X2lkPWFiYyZ1c2VybmFtZT1hQGIuY29t");
        let ctx = extractor().extract(&req);

        assert_eq!(ctx.client_token.as_deref(), Some("abc"));
        assert_eq!(ctx.user.unwrap().email.as_deref(), Some("a@b.com"));
        assert!(ctx.request_token.is_none());
    }

    #[test]
    fn test_percent_decoding_and_request_token() {
        let req = request().with_raw_body(b"client_id=abc&username=a%40b.com&request_token=rt-1&other=x");
        let ctx = extractor().extract(&req);

        assert_eq!(ctx.request_token.as_deref(), Some("rt-1"));
        assert_eq!(ctx.user.unwrap().email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn test_email_field_fallback() {
        let req = request().with_raw_body(b"username=&email=c%2Bd%40e.com");
        let ctx = extractor().extract(&req);
        assert_eq!(ctx.user.unwrap().email.as_deref(), Some("c+d@e.com"));
    }

    #[test]
    fn test_first_occurrence_wins() {
        let req = request().with_raw_body(b"client_id=first&client_id=second");
        let ctx = extractor().extract(&req);
        assert_eq!(ctx.client_token.as_deref(), Some("first"));
    }

    #[test]
    fn test_malformed_body_degrades() {
        let req = request().with_body_base64("%%%not-base64%%%");
        let ctx = extractor().extract(&req);

        assert!(ctx.is_anonymous());
        assert_eq!(ctx.ip, "203.0.113.7");
        assert!(ctx.headers.contains_key("user-agent"));
    }

    #[test]
    fn test_non_form_body_ignored() {
        let req = request().with_raw_body(b"{\"client_id\":\"abc\"}");
        let ctx = extractor().extract(&req);
        assert!(ctx.is_anonymous());
    }
}
