//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (route lookup by method)
//!     → matcher.rs (evaluate named-segment patterns)
//!     → Return: RouteMatch { target, path params } or NoMatch
//!
//! Route Compilation (at startup):
//!     HandlerConfig[]
//!     → RouteConfig (validated method, parsed pattern)
//!     → register (+ implicit OPTIONS preflight per path)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (segment comparison only)
//! - Deterministic: most static segments wins, then registration order

pub mod matcher;
pub mod router;

pub use matcher::{PathParams, PathPattern};
pub use router::{Route, RouteConfig, RouteMatch, RouteTable, RouteTarget, Verb};

/// Reasons a route cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("no settings found for handler")]
    MissingSettings,

    #[error("no method found for handler")]
    MissingMethod,

    #[error("unsupported method '{0}' (expected GET, POST, PUT, PATCH, DELETE or OPTIONS)")]
    InvalidMethod(String),

    #[error("path must not be empty")]
    EmptyPath,

    #[error("invalid path pattern '{path}': {reason}")]
    InvalidPattern { path: String, reason: &'static str },

    #[error("no action id found for handler")]
    MissingAction,

    #[error("duplicate route [{method}: {path}]")]
    Duplicate { method: String, path: String },
}
