//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! OPTIONS request:
//!     → cors.rs handle_preflight (advertise capability, never reaches the runner)
//!
//! Any other routed request:
//!     → cors.rs annotate_actual (grant access on whatever response follows)
//!     → normalizer / runner
//! ```
//!
//! # Design Decisions
//! - Policy loaded once at startup and shared immutably
//! - Preflight and actual-request headers are separate operations
//! - No authentication or rate limiting at this layer

pub mod cors;

pub use cors::{apply_env_overrides, CorsError, CorsNegotiator, CorsPolicy, REST_CORS_PREFIX};
