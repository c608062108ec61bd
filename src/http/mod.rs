//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, body limit)
//!     → dispatcher.rs (route lookup, CORS, runner invocation)
//!     → request.rs (path/query params + decoded body)
//!     → response.rs (outcome or rejection → HTTP response)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::Dispatcher;
pub use request::{DecodeError, NormalizedRequest, QueryParams};
pub use response::Rejection;
pub use server::HttpServer;
