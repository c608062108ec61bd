//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one span per request)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Components never hold a logger; the active subscriber is scoped by
//!   `tracing`, so tests can install or suppress their own
//! - Request ID and correlation ID appear as span/event fields

pub mod logging;
pub mod metrics;
