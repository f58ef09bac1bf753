//! End-to-end tests through the local HTTP adapter.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use risk_gate::config::loader::parse_config;
use risk_gate::http::HttpServer;
use risk_gate::lifecycle::Shutdown;
use serde_json::Value;

mod common;
use common::{start_mock_backend, MockBackend, MockReply};

const FORM: &str = "client_id=abc&username=a%40b.com";

/// Start the gate with `toml` (the backend URL is appended) and return its address.
async fn start_gate(backend: &MockBackend, toml: &str) -> (SocketAddr, Shutdown) {
    let content = format!(
        "{toml}\n[backend]\nbase_url = \"{}\"\napp_id = \"app-7\"\npublishable_key = \"pk_123\"\ntimeout_ms = 200\n",
        backend.url()
    );
    let config = parse_config(&content, Some("secret".into())).unwrap();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(Arc::new(config)).unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    (addr, shutdown)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

async fn post_login(addr: SocketAddr) -> reqwest::Response {
    client()
        .post(format!("http://{}/login", addr))
        .header("content-type", "application/x-www-form-urlencoded")
        .header("cookie", "session=secret123")
        .header("x-custom", "ok")
        .body(FORM)
        .send()
        .await
        .expect("gate unreachable")
}

const SCORE_ROUTES: &str = r#"
[[routes]]
method = "POST"
path = "/login"
event = "$login.succeeded"
"#;

const POLICY_ROUTES: &str = r#"
[policy]
mode = "policy"

[[routes]]
method = "POST"
path = "/login"
event = "$login"
"#;

#[tokio::test]
async fn test_high_risk_denied() {
    let backend = start_mock_backend(MockReply::json(200, r#"{"risk":0.95}"#)).await;
    let (addr, shutdown) = start_gate(&backend, SCORE_ROUTES).await;

    let res = post_login(addr).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    assert_eq!(res.headers()["cache-control"], "max-age=100");
    assert_eq!(res.headers()["access-control-allow-origin"], "*");

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["verdict"], "deny");
    assert_eq!(body["riskThreshold"], 0.9);
    assert_eq!(body["riskScore"], 0.95);
    assert_eq!(backend.calls(), 1);

    let sent = backend.last_request().unwrap().json();
    assert_eq!(sent["event"], "$login.succeeded");
    assert_eq!(sent["user_traits"]["email"], "a@b.com");
    assert_eq!(sent["context"]["client_id"], "abc");
    assert_eq!(sent["context"]["ip"], "127.0.0.1");
    assert_eq!(sent["context"]["headers"]["x-custom"], "ok");
    assert!(sent["context"]["headers"].get("cookie").is_none());

    shutdown.trigger();
}

#[tokio::test]
async fn test_low_risk_allowed() {
    let backend = start_mock_backend(MockReply::json(200, r#"{"risk":0.2}"#)).await;
    let (addr, shutdown) = start_gate(&backend, SCORE_ROUTES).await;

    let res = post_login(addr).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["verdict"], "allow");
    assert_eq!(body["assessment"]["risk"], 0.2);

    shutdown.trigger();
}

#[tokio::test]
async fn test_backend_error_reported_not_5xx() {
    let backend = start_mock_backend(MockReply::json(500, r#"{"error":"boom"}"#)).await;
    let (addr, shutdown) = start_gate(&backend, SCORE_ROUTES).await;

    let res = post_login(addr).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "risk assessment unavailable");
    assert_eq!(body["failoverReason"], "backend responded with HTTP 500");

    shutdown.trigger();
}

#[tokio::test]
async fn test_policy_timeout_fails_open() {
    let backend = start_mock_backend(
        MockReply::json(200, r#"{"policy":{"action":"deny"}}"#).delayed(Duration::from_secs(3)),
    )
    .await;
    let (addr, shutdown) = start_gate(&backend, POLICY_ROUTES).await;

    let started = std::time::Instant::now();
    let res = post_login(addr).await;
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(res.status(), StatusCode::OK);

    let body: Value = res.json().await.unwrap();
    assert_eq!(body["policy"]["action"], "allow");
    assert_eq!(body["failover"], true);
    assert_eq!(body["failover_reason"], "timeout");

    shutdown.trigger();
}

#[tokio::test]
async fn test_policy_deny() {
    let backend = start_mock_backend(MockReply::json(200, r#"{"policy":{"action":"deny"}}"#)).await;
    let (addr, shutdown) = start_gate(&backend, POLICY_ROUTES).await;

    let res = post_login(addr).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["policy"]["action"], "deny");

    shutdown.trigger();
}

#[tokio::test]
async fn test_unprotected_request_never_reaches_backend() {
    let backend = start_mock_backend(MockReply::json(200, r#"{"risk":0.1}"#)).await;
    let (addr, shutdown) = start_gate(&backend, SCORE_ROUTES).await;

    let res = client()
        .get(format!("http://{}/login", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(backend.calls(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_instrumented_page() {
    let backend = start_mock_backend(MockReply::json(200, r#"{"risk":0.1}"#)).await;
    let toml = format!(
        "{SCORE_ROUTES}\n[[pages]]\npath = \"/login\"\ntemplate = \"<script data-app='{{{{app_id}}}}' data-pk='{{{{publishable_key}}}}'></script>\"\n"
    );
    let (addr, shutdown) = start_gate(&backend, &toml).await;

    let res = client()
        .get(format!("http://{}/login", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "text/html; charset=utf-8");
    let html = res.text().await.unwrap();
    assert!(html.contains("data-app='app-7'"));
    assert!(html.contains("data-pk='pk_123'"));
    assert_eq!(backend.calls(), 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_pass_through_to_origin() {
    let backend = start_mock_backend(MockReply::json(200, r#"{"risk":0.1}"#)).await;
    let origin = start_mock_backend(MockReply::json(200, r#"{"origin":true}"#)).await;
    let toml = format!(
        "[policy]\nunmatched = \"pass_through\"\n\n[origin]\naddress = \"{}\"\n{SCORE_ROUTES}",
        origin.addr
    );
    let (addr, shutdown) = start_gate(&backend, &toml).await;

    let res = client()
        .get(format!("http://{}/about?x=1", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["origin"], true);

    assert_eq!(backend.calls(), 0);
    assert!(origin.last_request().unwrap().head.starts_with("GET /about?x=1 "));

    shutdown.trigger();
}
