//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML) + RISK_GATE_API_KEY
//!     → loader.rs (parse, deserialize, apply env override)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → shared via Arc to every pipeline stage
//! ```
//!
//! # Design Decisions
//! - Config is loaded once at startup and never reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackendConfig, FailurePolicy, GateConfig, PageConfig, PolicyConfig, PolicyMode, RouteConfig,
    UnmatchedPolicy,
};
