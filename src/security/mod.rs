//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Protected request:
//!     → headers.rs (drop credentials, flatten to first values)
//!     → scrubbed map handed to the assessment context
//! ```
//!
//! # Design Decisions
//! - Nothing credential-bearing crosses the trust boundary
//! - Deny-list is mandatory at minimum and extensible by configuration

pub mod headers;

pub use headers::HeaderScrubber;
