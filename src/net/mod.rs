//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! host + port (validated config)
//!     → listener.rs (bind, fatal on failure)
//!     → Hand off to HTTP layer (axum accept loop)
//! ```
//!
//! # Design Decisions
//! - Binding happens after routes are built, so a bad route table never
//!   holds a port
//! - Bind errors are returned, never retried

pub mod listener;

pub use listener::{Listener, ListenerError};
