//! Assessment outcome types and error definitions.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::assessment::context::UserIdentity;

/// Action chosen by the backend in policy mode.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyAction {
    Allow,
    Deny,
    Challenge,
    /// Any action this gate does not know; treated as allow.
    #[serde(other)]
    Unknown,
}

/// Normalized result of a successful backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum AssessmentOutcome {
    /// Score mode: the verdict is derived locally from `risk_score`.
    Score {
        risk_score: Option<f64>,
        raw: Value,
    },
    /// Policy mode: the backend chose the action.
    Policy {
        action: PolicyAction,
        failover: bool,
        failover_reason: Option<String>,
        raw: Value,
    },
}

impl AssessmentOutcome {
    pub fn raw(&self) -> &Value {
        match self {
            AssessmentOutcome::Score { raw, .. } | AssessmentOutcome::Policy { raw, .. } => raw,
        }
    }

    /// Interpret a score-mode response body.
    pub fn from_score_payload(raw: Value) -> Self {
        let risk_score = raw.get("risk").and_then(Value::as_f64);
        AssessmentOutcome::Score { risk_score, raw }
    }

    /// Interpret a policy-mode response body. `policy.action` is required.
    pub fn from_policy_payload(raw: Value) -> Result<Self, BackendFailure> {
        let action = raw
            .pointer("/policy/action")
            .cloned()
            .ok_or_else(|| BackendFailure::Malformed("missing policy.action".to_string()))?;
        let action: PolicyAction = serde_json::from_value(action)
            .map_err(|e| BackendFailure::Malformed(format!("invalid policy.action: {}", e)))?;

        let failover = raw.get("failover").and_then(Value::as_bool).unwrap_or(false);
        let failover_reason = raw
            .get("failover_reason")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(AssessmentOutcome::Policy {
            action,
            failover,
            failover_reason,
            raw,
        })
    }

    /// The allow outcome substituted for an unreachable backend in policy mode.
    pub fn failover_allow(reason: &str) -> Self {
        let raw = serde_json::json!({
            "policy": { "action": "allow" },
            "failover": true,
            "failover_reason": reason,
        });
        AssessmentOutcome::Policy {
            action: PolicyAction::Allow,
            failover: true,
            failover_reason: Some(reason.to_string()),
            raw,
        }
    }
}

/// Classified failure of the backend call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendFailure {
    /// The call did not complete before its deadline.
    #[error("timeout")]
    Timeout(Duration),

    /// DNS, TLS, connect or reset errors.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend responded with HTTP {0}")]
    Status(u16),

    /// The body was not the JSON this mode expects.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl BackendFailure {
    /// Human-readable reason surfaced to callers as `failover_reason`.
    pub fn failover_reason(&self) -> String {
        self.to_string()
    }

    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendFailure::Timeout(_) => "timeout",
            BackendFailure::Transport(_) => "transport",
            BackendFailure::Status(_) => "status",
            BackendFailure::Malformed(_) => "malformed",
        }
    }
}

/// Outbound `context` object.
#[derive(Debug, Clone, Serialize)]
pub struct RequestContext<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_token: Option<&'a str>,
    pub ip: &'a str,
    pub headers: &'a BTreeMap<String, String>,
}

/// Outbound body for score mode.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreRequest<'a> {
    pub event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<&'a str>,
    pub user_traits: UserIdentity,
    pub context: RequestContext<'a>,
}

/// Outbound body for policy mode.
#[derive(Debug, Clone, Serialize)]
pub struct PolicyRequest<'a> {
    pub event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<&'a str>,
    pub user: UserIdentity,
    pub context: RequestContext<'a>,
}
