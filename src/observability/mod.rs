//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline stages produce:
//!     → logging.rs (structured log events, request id attached)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stderr, plain or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through every pipeline log line
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;
