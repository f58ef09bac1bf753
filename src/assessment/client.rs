//! Risk backend client with timeout and error handling.
//!
//! # Responsibilities
//! - Build the outbound body for the active mode
//! - Authenticate with Basic auth (empty user, API key as password)
//! - Send exactly one POST under a deadline
//! - Classify every failure as a `BackendFailure`

use std::future::Future;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use serde_json::Value;

use crate::assessment::context::AssessmentContext;
use crate::assessment::types::{
    AssessmentOutcome, BackendFailure, PolicyRequest, RequestContext, ScoreRequest,
};
use crate::config::{BackendConfig, PolicyMode};
use crate::error::GateError;
use crate::observability::metrics;
use crate::resilience::timeouts::{with_deadline, DeadlineExceeded};

/// Anything that can assess a protected request.
///
/// Implementations make at most one backend call per invocation.
pub trait AssessmentClient: Send + Sync {
    fn assess(
        &self,
        event: &str,
        context: &AssessmentContext,
    ) -> impl Future<Output = Result<AssessmentOutcome, BackendFailure>> + Send;
}

/// Build the `Authorization` header value for an API key.
pub fn basic_authorization(api_key: &str) -> String {
    format!("Basic {}", BASE64.encode(format!(":{}", api_key)))
}

/// Outbound JSON body, shaped by the active mode.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum OutboundBody<'a> {
    Score(ScoreRequest<'a>),
    Policy(PolicyRequest<'a>),
}

/// Client for the risk-assessment HTTP API.
#[derive(Clone)]
pub struct HttpAssessmentClient {
    http: reqwest::Client,
    endpoint: String,
    authorization: String,
    app_id: Option<String>,
    mode: PolicyMode,
    timeout: Duration,
}

impl HttpAssessmentClient {
    /// Create a client. Fails if the API key is missing.
    pub fn new(backend: &BackendConfig, mode: PolicyMode) -> Result<Self, GateError> {
        if backend.api_key.trim().is_empty() {
            return Err(GateError::MissingApiKey);
        }

        let timeout = Duration::from_millis(backend.timeout_ms);
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(GateError::HttpClient)?;

        let endpoint = format!(
            "{}{}",
            backend.base_url.trim_end_matches('/'),
            backend.endpoint_path(mode)
        );

        tracing::info!(
            endpoint = %endpoint,
            mode = mode.as_str(),
            timeout_ms = backend.timeout_ms,
            "Assessment client initialized"
        );

        Ok(Self {
            http,
            endpoint,
            authorization: basic_authorization(&backend.api_key),
            app_id: backend.app_id.clone(),
            mode,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build the outbound body for `event` and `context`.
    pub fn request_body<'a>(&'a self, event: &'a str, context: &'a AssessmentContext) -> OutboundBody<'a> {
        let user = context.user.clone().unwrap_or_default();
        let app_id = self.app_id.as_deref();
        match self.mode {
            PolicyMode::Score => OutboundBody::Score(ScoreRequest {
                event,
                app_id,
                user_traits: user,
                context: RequestContext {
                    client_id: context.client_token.as_deref(),
                    request_token: None,
                    ip: &context.ip,
                    headers: &context.headers,
                },
            }),
            PolicyMode::Policy => OutboundBody::Policy(PolicyRequest {
                event,
                app_id,
                user,
                context: RequestContext {
                    client_id: None,
                    request_token: context.request_token.as_deref(),
                    ip: &context.ip,
                    headers: &context.headers,
                },
            }),
        }
    }

    async fn send(&self, body: &OutboundBody<'_>) -> Result<Value, BackendFailure> {
        let response = self
            .http
            .post(&self.endpoint)
            .header(AUTHORIZATION, self.authorization.as_str())
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendFailure::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        serde_json::from_slice(&bytes).map_err(|e| BackendFailure::Malformed(e.to_string()))
    }

    fn classify(&self, error: reqwest::Error) -> BackendFailure {
        if error.is_timeout() {
            return BackendFailure::Timeout(self.timeout);
        }
        BackendFailure::Transport(error_chain(&error))
    }
}

impl AssessmentClient for HttpAssessmentClient {
    async fn assess(
        &self,
        event: &str,
        context: &AssessmentContext,
    ) -> Result<AssessmentOutcome, BackendFailure> {
        let body = self.request_body(event, context);
        let started = Instant::now();

        tracing::debug!(endpoint = %self.endpoint, event = %event, "Sending assessment request");

        let result = match with_deadline(self.timeout, self.send(&body)).await {
            Ok(result) => result,
            Err(DeadlineExceeded(after)) => Err(BackendFailure::Timeout(after)),
        };

        let outcome = result.and_then(|raw| match self.mode {
            PolicyMode::Score => Ok(AssessmentOutcome::from_score_payload(raw)),
            PolicyMode::Policy => AssessmentOutcome::from_policy_payload(raw),
        });

        match &outcome {
            Ok(_) => metrics::record_assessment(self.mode.as_str(), "ok", started),
            Err(failure) => {
                tracing::warn!(
                    event = %event,
                    kind = failure.kind(),
                    reason = %failure,
                    "Assessment failed"
                );
                metrics::record_assessment(self.mode.as_str(), failure.kind(), started);
            }
        }

        outcome
    }
}

impl std::fmt::Debug for HttpAssessmentClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpAssessmentClient")
            .field("endpoint", &self.endpoint)
            .field("mode", &self.mode)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Render an error and its sources as one line.
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
