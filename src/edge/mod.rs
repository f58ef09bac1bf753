//! Edge platform adapter.
//!
//! # Data Flow
//! ```text
//! Viewer-request event (JSON)
//!     → event.rs (decode, first record's request)
//!     → InboundRequest
//!     → [pipeline decides]
//!     → EdgeOutput: response object, or the request echoed back for the origin
//! ```
//!
//! # Design Decisions
//! - The platform invokes once per request; nothing is kept between events
//! - Pass-through returns the untouched request, which is how the platform
//!   continues to the origin

pub mod event;

pub use event::{handle_event, CfRequest, EdgeOutput, ViewerRequestEvent};
