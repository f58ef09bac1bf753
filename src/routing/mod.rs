//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, uri)
//!     → router.rs (ordered table lookup)
//!     → matcher.rs (exact method + path comparison)
//!     → Return: protected Route or None
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Route[] in declaration order
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No match is a normal outcome, never an error
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;

pub use matcher::Route;
pub use router::RouteTable;
