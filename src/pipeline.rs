//! The access decision pipeline.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → pages (GET of an instrumented page → HTML)
//!     → routing (protected? else configured fallback)
//!     → assessment::context (identity + scrubbed headers)
//!     → assessment::client (one backend call, under a deadline)
//!     → decision::engine (verdict)
//!     → http::response (edge response)
//! ```
//!
//! # Design Decisions
//! - One linear pass per request; the backend call is the only suspension point
//! - No state survives the invocation
//! - Configuration is compiled into lookup tables once, at construction

use std::time::Instant;

use crate::assessment::{AssessmentClient, ContextExtractor, HttpAssessmentClient};
use crate::config::GateConfig;
use crate::decision::{Decision, DecisionEngine, EdgeVerdict};
use crate::error::GateResult;
use crate::http::page::PageTable;
use crate::http::request::InboundRequest;
use crate::http::response::{self, EdgeResponse};
use crate::observability::metrics;
use crate::routing::RouteTable;
use crate::security::HeaderScrubber;

/// What the platform adapter should do with the request.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeResult {
    /// Answer the client with this response.
    Respond(EdgeResponse),
    /// Forward the original request to the origin.
    PassThrough,
}

impl EdgeResult {
    pub fn response(&self) -> Option<&EdgeResponse> {
        match self {
            EdgeResult::Respond(response) => Some(response),
            EdgeResult::PassThrough => None,
        }
    }
}

/// The request interceptor.
#[derive(Debug)]
pub struct Gate<C> {
    routes: RouteTable,
    pages: PageTable,
    extractor: ContextExtractor,
    engine: DecisionEngine,
    client: C,
}

impl Gate<HttpAssessmentClient> {
    /// Build a gate talking to the configured HTTP backend.
    pub fn from_config(config: &GateConfig) -> GateResult<Self> {
        let client = HttpAssessmentClient::new(&config.backend, config.policy.mode)?;
        Ok(Self::with_client(config, client))
    }
}

impl<C: AssessmentClient> Gate<C> {
    /// Build a gate around any assessment client.
    pub fn with_client(config: &GateConfig, client: C) -> Self {
        let scrubber = HeaderScrubber::new(&config.scrub.deny);
        Self {
            routes: RouteTable::from_config(&config.routes),
            pages: PageTable::from_config(&config.pages, &config.backend),
            extractor: ContextExtractor::new(config.context.clone(), scrubber),
            engine: DecisionEngine::from_config(&config.policy),
            client,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Run the pipeline for one request.
    pub async fn handle(&self, request: &InboundRequest) -> EdgeResult {
        let started = Instant::now();
        let request_id = request.request_id();

        if let Some(page) = self.pages.lookup(&request.method, &request.uri) {
            tracing::debug!(request_id = %request_id, uri = %request.uri, "Serving instrumented page");
            metrics::record_request("page", 200, started);
            return EdgeResult::Respond(response::build(&EdgeVerdict::html(200, page)));
        }

        let Some(route) = self.routes.match_route(&request.method, &request.uri) else {
            return match self.engine.unmatched() {
                Decision::Respond(verdict) => {
                    tracing::info!(
                        request_id = %request_id,
                        method = %request.method,
                        uri = %request.uri,
                        status = verdict.status,
                        "Rejecting unprotected request"
                    );
                    metrics::record_request("none", verdict.status, started);
                    EdgeResult::Respond(response::build(&verdict))
                }
                Decision::PassThrough => {
                    tracing::debug!(request_id = %request_id, uri = %request.uri, "Passing request through");
                    metrics::record_pass_through();
                    EdgeResult::PassThrough
                }
            };
        };

        let context = self.extractor.extract(request);
        tracing::debug!(
            request_id = %request_id,
            event = %route.event,
            has_client_token = context.client_token.is_some(),
            has_request_token = context.request_token.is_some(),
            has_identity = context.user.is_some(),
            "Assessing protected request"
        );

        let result = self.client.assess(&route.event, &context).await;
        if let Err(failure) = &result {
            metrics::record_backend_failure(failure.kind());
        }

        let verdict = self.engine.decide(result);
        tracing::info!(
            request_id = %request_id,
            event = %route.event,
            status = verdict.status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Verdict"
        );
        metrics::record_request(&route.event, verdict.status, started);

        EdgeResult::Respond(response::build(&verdict))
    }
}
