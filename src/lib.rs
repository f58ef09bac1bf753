//! Edge risk gate library.
//!
//! Intercepts requests at the edge, scores protected ones against a remote
//! risk backend and answers with an allow or deny response.

pub mod assessment;
pub mod config;
pub mod decision;
pub mod edge;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::schema::GateConfig;
pub use error::{GateError, GateResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{EdgeResult, Gate};
