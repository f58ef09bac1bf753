//! Risk assessment subsystem.
//!
//! # Data Flow
//! ```text
//! InboundRequest
//!     → context.rs (decode form body, scrub headers)
//!     → client.rs (one POST to the backend, under a deadline)
//!     → types.rs (AssessmentOutcome or BackendFailure)
//! ```
//!
//! # Design Decisions
//! - One outcome sum type; the configured mode picks the variant and endpoint
//! - Context extraction never fails; the backend call always happens
//! - Failures are classified values, never panics or raw errors

pub mod client;
pub mod context;
pub mod types;

pub use client::{AssessmentClient, HttpAssessmentClient};
pub use context::{AssessmentContext, ContextExtractor, UserIdentity};
pub use types::{AssessmentOutcome, BackendFailure, PolicyAction};
