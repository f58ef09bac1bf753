//! Decision subsystem.
//!
//! # Data Flow
//! ```text
//! Result<AssessmentOutcome, BackendFailure>
//!     → engine.rs (mode + threshold + failure policy)
//!     → verdict.rs (EdgeVerdict: status + body)
//!
//! No route matched:
//!     → engine.rs (configured fallback or pass-through)
//! ```
//!
//! # Design Decisions
//! - Every terminal state is an enumerated verdict
//! - Failure handling is a named policy with per-mode defaults

pub mod engine;
pub mod verdict;

pub use engine::DecisionEngine;
pub use verdict::{BodyKind, Decision, EdgeVerdict, VerdictBody};
