//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the risk gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration for the local HTTP adapter.
    pub listener: ListenerConfig,

    /// Risk-assessment backend settings.
    pub backend: BackendConfig,

    /// Decision policy (mode, threshold, fallbacks).
    pub policy: PolicyConfig,

    /// Protected routes, matched in declaration order.
    pub routes: Vec<RouteConfig>,

    /// Instrumented pages served on GET.
    pub pages: Vec<PageConfig>,

    /// Form field names read from the inbound body.
    pub context: ContextFieldsConfig,

    /// Header scrubbing settings.
    pub scrub: ScrubConfig,

    /// Origin used for pass-through forwarding by the HTTP adapter.
    pub origin: OriginConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,

    /// Total time allowed for one inbound request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 64 * 1024,
            request_timeout_secs: 10,
        }
    }
}

/// Risk-assessment backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend (scheme + host).
    pub base_url: String,

    /// Endpoint path. Defaults to the mode's endpoint when unset.
    pub path: Option<String>,

    /// Secret API key. Required.
    pub api_key: String,

    /// Optional application/site identifier.
    pub app_id: Option<String>,

    /// Publishable key substituted into instrumented pages.
    pub publishable_key: Option<String>,

    /// Deadline for the whole backend call, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.castle.io".to_string(),
            path: None,
            api_key: String::new(),
            app_id: None,
            publishable_key: None,
            timeout_ms: 1_000,
        }
    }
}

impl BackendConfig {
    /// Endpoint path for the given mode, honoring an explicit override.
    pub fn endpoint_path(&self, mode: PolicyMode) -> &str {
        self.path.as_deref().unwrap_or(mode.default_path())
    }
}

/// Which backend contract is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PolicyMode {
    /// Verdict derived locally from a numeric risk score.
    #[default]
    Score,
    /// Verdict is an explicit action chosen by the backend.
    Policy,
}

impl PolicyMode {
    pub fn default_path(self) -> &'static str {
        match self {
            PolicyMode::Score => "/v1/authenticate",
            PolicyMode::Policy => "/v1/filter",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PolicyMode::Score => "score",
            PolicyMode::Policy => "policy",
        }
    }
}

/// What to answer for a request no route protects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// 405 with an empty body.
    MethodNotAllowed,
    /// 403 with an empty body.
    Forbidden,
    /// Forward the request to the origin unchanged.
    PassThrough,
}

/// How a failed backend call is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// HTTP 200 whose JSON body describes the failure.
    Report,
    /// Allow the request, flagged as a failover.
    FailOpen,
}

/// Decision policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PolicyConfig {
    /// Active backend contract.
    pub mode: PolicyMode,

    /// Score above which a request is denied (score mode only).
    pub risk_threshold: f64,

    /// Fallback for unprotected requests. Mode default when unset.
    pub unmatched: Option<UnmatchedPolicy>,

    /// Failure handling. Mode default when unset.
    pub on_backend_failure: Option<FailurePolicy>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            mode: PolicyMode::Score,
            risk_threshold: 0.9,
            unmatched: None,
            on_backend_failure: None,
        }
    }
}

impl PolicyConfig {
    pub fn unmatched_policy(&self) -> UnmatchedPolicy {
        self.unmatched.unwrap_or(match self.mode {
            PolicyMode::Score => UnmatchedPolicy::MethodNotAllowed,
            PolicyMode::Policy => UnmatchedPolicy::Forbidden,
        })
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.on_backend_failure.unwrap_or(match self.mode {
            PolicyMode::Score => FailurePolicy::Report,
            PolicyMode::Policy => FailurePolicy::FailOpen,
        })
    }
}

/// A protected endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// HTTP method (e.g. "POST").
    pub method: String,

    /// Exact request path.
    pub path: String,

    /// Event name sent to the backend.
    pub event: String,
}

/// An instrumented HTML page served on GET.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageConfig {
    /// Exact request path.
    pub path: String,

    /// HTML template; `{{app_id}}` and `{{publishable_key}}` are substituted.
    pub template: String,
}

/// Names of the form fields carrying identity signals.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ContextFieldsConfig {
    pub client_token_field: String,
    pub request_token_field: String,
    /// Checked in order; the first non-empty value is used.
    pub identity_fields: Vec<String>,
}

impl Default for ContextFieldsConfig {
    fn default() -> Self {
        Self {
            client_token_field: "client_id".to_string(),
            request_token_field: "request_token".to_string(),
            identity_fields: vec!["username".to_string(), "email".to_string()],
        }
    }
}

/// Header scrubbing configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ScrubConfig {
    /// Extra header names to drop, on top of cookie and authorization.
    pub deny: Vec<String>,
}

/// Origin for pass-through forwarding.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct OriginConfig {
    /// Origin address (e.g., "127.0.0.1:3000"). Pass-through answers 502 when unset.
    pub address: Option<String>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level filter used when RUST_LOG is unset.
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_defaults() {
        let mut policy = PolicyConfig::default();
        assert_eq!(policy.unmatched_policy(), UnmatchedPolicy::MethodNotAllowed);
        assert_eq!(policy.failure_policy(), FailurePolicy::Report);

        policy.mode = PolicyMode::Policy;
        assert_eq!(policy.unmatched_policy(), UnmatchedPolicy::Forbidden);
        assert_eq!(policy.failure_policy(), FailurePolicy::FailOpen);

        policy.unmatched = Some(UnmatchedPolicy::PassThrough);
        assert_eq!(policy.unmatched_policy(), UnmatchedPolicy::PassThrough);
    }

    #[test]
    fn test_endpoint_path() {
        let mut backend = BackendConfig::default();
        assert_eq!(backend.endpoint_path(PolicyMode::Score), "/v1/authenticate");
        assert_eq!(backend.endpoint_path(PolicyMode::Policy), "/v1/filter");

        backend.path = Some("/v1/risk".to_string());
        assert_eq!(backend.endpoint_path(PolicyMode::Policy), "/v1/risk");
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config: GateConfig = toml::from_str(
            r#"
            [backend]
            api_key = "sk"

            [policy]
            mode = "policy"
            unmatched = "pass_through"

            [[routes]]
            method = "POST"
            path = "/signup"
            event = "$registration"
            "#,
        )
        .unwrap();

        assert_eq!(config.policy.mode, PolicyMode::Policy);
        assert_eq!(config.policy.unmatched, Some(UnmatchedPolicy::PassThrough));
        assert_eq!(config.routes.len(), 1);
        assert_eq!(config.routes[0].event, "$registration");
        assert_eq!(config.backend.timeout_ms, 1_000);
        assert_eq!(config.context.client_token_field, "client_id");
    }
}
