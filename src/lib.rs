//! REST trigger: an HTTP-to-action dispatch layer.
//!
//! Inbound requests are matched against a route table built once from
//! configuration, normalized into path/query parameters plus a decoded JSON
//! body, and handed to a [`Runner`](action::Runner). The runner's reply is
//! written back as the HTTP response. `OPTIONS` on any registered path is
//! answered by the CORS negotiator without touching the runner.

pub mod action;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;

pub use action::{ActionError, ActionRef, DispatchOutcome, RunContext, Runner};
pub use config::TriggerConfig;
pub use http::{Dispatcher, HttpServer, NormalizedRequest};
pub use lifecycle::Shutdown;
pub use routing::RouteTable;
