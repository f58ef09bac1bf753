//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build gate → Bind listener
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or trigger → Stop accepting → Drain in-flight → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds last (traffic only when ready)

pub mod shutdown;

pub use shutdown::Shutdown;
