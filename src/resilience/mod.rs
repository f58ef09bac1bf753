//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to risk backend:
//!     → timeouts.rs (enforce the call deadline)
//!     → On failure: classified BackendFailure, mapped by the decision engine
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every backend call has a deadline
//! - Single attempt: no retries, backoff or circuit breaker
//! - Added latency is bounded by the deadline

pub mod timeouts;
