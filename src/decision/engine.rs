//! Verdict computation.
//!
//! # Responsibilities
//! - Map an assessment outcome (or its failure) to an `EdgeVerdict`
//! - Apply the configured failure policy (report or fail open)
//! - Provide the fallback for unprotected requests
//!
//! # Design Decisions
//! - Score mode denies only on `risk > threshold`; equality allows
//! - Scores are never clamped; out-of-range values pass through
//! - A failed backend never produces a 5xx

use serde_json::{json, Value};

use crate::assessment::types::{AssessmentOutcome, BackendFailure, PolicyAction};
use crate::config::{FailurePolicy, PolicyConfig, PolicyMode, UnmatchedPolicy};
use crate::decision::verdict::{Decision, EdgeVerdict};

pub const STATUS_ALLOW: u16 = 200;
pub const STATUS_DENY: u16 = 403;
pub const STATUS_METHOD_NOT_ALLOWED: u16 = 405;

/// Resolved decision policy for one deployment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionEngine {
    pub mode: PolicyMode,
    pub threshold: f64,
    pub on_failure: FailurePolicy,
    pub unmatched: UnmatchedPolicy,
}

impl DecisionEngine {
    pub fn from_config(config: &PolicyConfig) -> Self {
        Self {
            mode: config.mode,
            threshold: config.risk_threshold,
            on_failure: config.failure_policy(),
            unmatched: config.unmatched_policy(),
        }
    }

    /// Decide a protected request from the backend result.
    pub fn decide(&self, result: Result<AssessmentOutcome, BackendFailure>) -> EdgeVerdict {
        match result {
            Ok(outcome) => self.decide_outcome(outcome),
            Err(failure) => self.decide_failure(&failure),
        }
    }

    /// Fallback for requests no route protects.
    pub fn unmatched(&self) -> Decision {
        match self.unmatched {
            UnmatchedPolicy::MethodNotAllowed => {
                Decision::Respond(EdgeVerdict::empty(STATUS_METHOD_NOT_ALLOWED))
            }
            UnmatchedPolicy::Forbidden => Decision::Respond(EdgeVerdict::empty(STATUS_DENY)),
            UnmatchedPolicy::PassThrough => Decision::PassThrough,
        }
    }

    fn decide_outcome(&self, outcome: AssessmentOutcome) -> EdgeVerdict {
        match outcome {
            AssessmentOutcome::Score { risk_score, raw } => {
                // NaN and missing scores never exceed the threshold.
                let over = risk_score.is_some_and(|risk| risk > self.threshold);
                let status = if over || explicit_deny(&raw) {
                    STATUS_DENY
                } else {
                    STATUS_ALLOW
                };
                EdgeVerdict::json(
                    status,
                    json!({
                        "verdict": verdict_label(status),
                        "status": status,
                        "riskScore": risk_score,
                        "riskThreshold": self.threshold,
                        "assessment": raw,
                    }),
                )
            }
            AssessmentOutcome::Policy { action, raw, .. } => {
                let status = if action == PolicyAction::Deny {
                    STATUS_DENY
                } else {
                    STATUS_ALLOW
                };
                EdgeVerdict::json(status, raw)
            }
        }
    }

    fn decide_failure(&self, failure: &BackendFailure) -> EdgeVerdict {
        let reason = failure.failover_reason();
        match self.on_failure {
            FailurePolicy::FailOpen => {
                self.decide_outcome(AssessmentOutcome::failover_allow(&reason))
            }
            FailurePolicy::Report => EdgeVerdict::json(
                STATUS_ALLOW,
                json!({
                    "error": "risk assessment unavailable",
                    "failoverReason": reason,
                }),
            ),
        }
    }
}

fn explicit_deny(raw: &Value) -> bool {
    let action = raw
        .get("action")
        .or_else(|| raw.pointer("/policy/action"))
        .and_then(Value::as_str);
    action == Some("deny")
}

fn verdict_label(status: u16) -> &'static str {
    if status == STATUS_DENY {
        "deny"
    } else {
        "allow"
    }
}
