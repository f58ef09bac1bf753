//! HTTP handling subsystem.
//!
//! # Data Flow
//! ```text
//! Axum request (local adapter)
//!     → server.rs (body limit, request ID, InboundRequest)
//!     → request.rs (read-only request value)
//!     → [pipeline decides]
//!     → page.rs (instrumented page, if the verdict is HTML)
//!     → response.rs (edge response object)
//!     → Send to client, or forward to origin
//! ```

pub mod page;
pub mod request;
pub mod response;
pub mod server;

pub use request::InboundRequest;
pub use response::EdgeResponse;
pub use server::HttpServer;
