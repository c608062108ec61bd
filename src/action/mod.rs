//! Action invocation boundary.
//!
//! # Data Flow
//! ```text
//! Dispatcher
//!     → Runner::run(RunContext, ActionRef, NormalizedRequest)
//!     → Ok(DispatchOutcome)  → response mapper
//!     → Err(ActionError)     → 400 with the error message
//! ```
//!
//! # Design Decisions
//! - The dispatcher holds an `Arc<dyn Runner>` handed to it at construction;
//!   actions are never looked up in a process-wide registry
//! - `ActionRef` is opaque to this crate; only the runner interprets it

pub mod echo;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::request::NormalizedRequest;

pub use echo::EchoRunner;

/// Opaque identifier of the action bound to a route.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionRef(String);

impl ActionRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Per-invocation context handed to the runner.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Id of the trigger that received the request.
    pub trigger_id: Arc<str>,
    /// Fresh id for this invocation.
    pub correlation_id: Uuid,
    /// `x-request-id` of the inbound request, if one was assigned.
    pub request_id: Option<String>,
    /// Method of the matched route (upper case).
    pub method: String,
    /// Pattern of the matched route, e.g. `/orders/:id`.
    pub route: String,
}

/// Result of a successful action run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchOutcome {
    /// Reply code chosen by the action. `None` (or 0) means "use the default".
    pub status_code: Option<u16>,
    /// Structured reply written as JSON when present.
    pub body: Option<serde_json::Value>,
}

impl DispatchOutcome {
    pub fn new(status_code: u16, body: serde_json::Value) -> Self {
        Self {
            status_code: Some(status_code),
            body: Some(body),
        }
    }

    /// An outcome carrying only a status code.
    pub fn status(status_code: u16) -> Self {
        Self {
            status_code: Some(status_code),
            body: None,
        }
    }
}

/// Error reported by an action. Its message is returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Capability that executes the action bound to a route.
#[async_trait]
pub trait Runner: Send + Sync + 'static {
    async fn run(
        &self,
        ctx: RunContext,
        action: &ActionRef,
        input: NormalizedRequest,
    ) -> Result<DispatchOutcome, ActionError>;
}

#[async_trait]
impl<R: Runner + ?Sized> Runner for Arc<R> {
    async fn run(
        &self,
        ctx: RunContext,
        action: &ActionRef,
        input: NormalizedRequest,
    ) -> Result<DispatchOutcome, ActionError> {
        (**self).run(ctx, action, input).await
    }
}
