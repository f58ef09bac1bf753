//! Local HTTP adapter.
//!
//! # Responsibilities
//! - Create Axum Router with a catch-all gate handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Turn each request into an `InboundRequest` and run the pipeline
//! - Write the edge response back, or forward pass-through requests to the origin
//!
//! # Design Decisions
//! - Bodies over the limit are truncated, never rejected; the pipeline runs on what was read
//! - The request deadline and adapter failures answer through the response builder,
//!   so every response carries the edge headers
//! - Origin responses are streamed back untouched

use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes, HttpBody},
    extract::{ConnectInfo, State},
    http::{
        request::Parts,
        uri::{Authority, PathAndQuery, Scheme},
        Request, StatusCode, Uri,
    },
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::assessment::HttpAssessmentClient;
use crate::config::GateConfig;
use crate::error::GateResult;
use crate::http::request::InboundRequest;
use crate::decision::EdgeVerdict;
use crate::http::response::{self, EdgeResponse};
use crate::lifecycle::shutdown::wait_for_signal;
use crate::pipeline::{EdgeResult, Gate};
use crate::resilience::timeouts::{with_deadline, DeadlineExceeded};

/// Upstream used for pass-through requests.
#[derive(Clone)]
struct Origin {
    authority: Authority,
    client: Client<HttpConnector, Body>,
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    gate: Arc<Gate<HttpAssessmentClient>>,
    origin: Option<Origin>,
    max_body_size: usize,
    request_timeout: Duration,
}

/// HTTP server fronting the gate.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: Arc<GateConfig>) -> GateResult<Self> {
        let gate = Arc::new(Gate::from_config(&config)?);

        let origin = config
            .origin
            .address
            .as_deref()
            .and_then(|address| match address.parse::<Authority>() {
                Ok(authority) => Some(Origin {
                    authority,
                    client: Client::builder(TokioExecutor::new()).build(HttpConnector::new()),
                }),
                Err(e) => {
                    tracing::error!(address = %address, error = %e, "Ignoring invalid origin address");
                    None
                }
            });

        let state = AppState {
            gate,
            origin,
            max_body_size: config.listener.max_body_size,
            request_timeout: Duration::from_secs(config.listener.request_timeout_secs),
        };

        let router = Self::build_router(state);
        Ok(Self { router })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(gate_handler))
            .route("/", any(gate_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until Ctrl+C or `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_signal(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Catch-all handler: every request goes through the gate under the request deadline.
async fn gate_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    match with_deadline(state.request_timeout, handle_request(&state, peer, request)).await {
        Ok(response) => response,
        Err(DeadlineExceeded(after)) => {
            tracing::warn!(peer = %peer, timeout_ms = after.as_millis() as u64, "Request deadline exceeded");
            adapter_response(StatusCode::GATEWAY_TIMEOUT)
        }
    }
}

async fn handle_request(state: &AppState, peer: SocketAddr, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();

    let (bytes, truncated) = read_body(body, state.max_body_size).await;
    if truncated {
        tracing::debug!(peer = %peer, limit = state.max_body_size, "Request body truncated");
    }

    let uri = parts
        .uri
        .path_and_query()
        .map(PathAndQuery::as_str)
        .unwrap_or("/");
    let inbound = InboundRequest::new(parts.method.as_str(), uri, peer.ip().to_string())
        .with_headers(parts.headers.clone())
        .with_raw_body(&bytes);

    match state.gate.handle(&inbound).await {
        EdgeResult::Respond(response) => into_http_response(&response),
        EdgeResult::PassThrough if truncated => {
            tracing::warn!(uri = %parts.uri, "Refusing to forward a truncated body");
            adapter_response(StatusCode::PAYLOAD_TOO_LARGE)
        }
        EdgeResult::PassThrough => forward_to_origin(state, parts, bytes).await,
    }
}

/// Read at most `limit` bytes of `body`. Returns the bytes and whether anything was cut.
///
/// A body that fails mid-stream keeps what was read so far and counts as cut.
async fn read_body(mut body: Body, limit: usize) -> (Bytes, bool) {
    let mut buf = Vec::new();
    while let Some(frame) = std::future::poll_fn(|cx| Pin::new(&mut body).poll_frame(cx)).await {
        let frame = match frame {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(error = %e, "Request body ended early");
                return (Bytes::from(buf), true);
            }
        };
        let Ok(data) = frame.into_data() else {
            continue;
        };
        let room = limit - buf.len();
        if data.len() > room {
            buf.extend_from_slice(&data[..room]);
            return (Bytes::from(buf), true);
        }
        buf.extend_from_slice(&data);
    }
    (Bytes::from(buf), false)
}

/// Empty edge response for failures of the adapter itself.
fn adapter_response(status: StatusCode) -> Response {
    into_http_response(&response::build(&EdgeVerdict::empty(status.as_u16())))
}

/// Convert the edge response object into an HTTP response.
pub fn into_http_response(edge: &EdgeResponse) -> Response {
    let mut builder = Response::builder()
        .status(StatusCode::from_u16(edge.status).unwrap_or(StatusCode::OK));
    for (name, entries) in &edge.headers {
        for entry in entries {
            builder = builder.header(name.as_str(), entry.value.as_str());
        }
    }

    builder
        .body(Body::from(edge.body.clone().unwrap_or_default()))
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to assemble response");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}

async fn forward_to_origin(state: &AppState, parts: Parts, body: Bytes) -> Response {
    let Some(origin) = &state.origin else {
        tracing::warn!(uri = %parts.uri, "Pass-through requested but no origin configured");
        return adapter_response(StatusCode::BAD_GATEWAY);
    };

    let mut uri_parts = parts.uri.clone().into_parts();
    uri_parts.scheme = Some(Scheme::HTTP);
    uri_parts.authority = Some(origin.authority.clone());
    if uri_parts.path_and_query.is_none() {
        uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    let uri = match Uri::from_parts(uri_parts) {
        Ok(uri) => uri,
        Err(e) => {
            tracing::error!(error = %e, "Failed to build origin URI");
            return adapter_response(StatusCode::BAD_GATEWAY);
        }
    };

    let mut request = Request::from_parts(parts, Body::from(body));
    *request.uri_mut() = uri;

    match origin.client.request(request).await {
        Ok(response) => {
            let (parts, body) = response.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(e) => {
            tracing::error!(origin = %origin.authority, error = %e, "Origin request failed");
            adapter_response(StatusCode::BAD_GATEWAY)
        }
    }
}
