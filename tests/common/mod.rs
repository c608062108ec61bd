//! Shared utilities for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use rest_trigger::{
    ActionError, ActionRef, DispatchOutcome, HttpServer, NormalizedRequest, RunContext, Runner,
    TriggerConfig,
};
use tower::ServiceExt;

/// One recorded runner invocation.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Invocation {
    pub action: ActionRef,
    pub ctx: RunContext,
    pub input: NormalizedRequest,
}

type Reply = Box<dyn Fn(&ActionRef, &NormalizedRequest) -> Result<DispatchOutcome, ActionError> + Send + Sync>;

/// Runner that records every call and answers with a programmable reply.
pub struct RecordingRunner {
    calls: AtomicUsize,
    completed: AtomicUsize,
    invocations: Mutex<Vec<Invocation>>,
    reply: Reply,
    delay: Option<Duration>,
}

#[allow(dead_code)]
impl RecordingRunner {
    pub fn new<F>(reply: F) -> Arc<Self>
    where
        F: Fn(&ActionRef, &NormalizedRequest) -> Result<DispatchOutcome, ActionError>
            + Send
            + Sync
            + 'static,
    {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            invocations: Mutex::new(Vec::new()),
            reply: Box::new(reply),
            delay: None,
        })
    }

    /// Runner answering every call with `200` and no body.
    pub fn ok() -> Arc<Self> {
        Self::new(|_, _| Ok(DispatchOutcome::default()))
    }

    /// Runner that sleeps before answering.
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
            invocations: Mutex::new(Vec::new()),
            reply: Box::new(|_, _| Ok(DispatchOutcome::new(200, serde_json::json!({"slow": true})))),
            delay: Some(delay),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Invocations that ran to the end, delay included.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl Runner for RecordingRunner {
    async fn run(
        &self,
        ctx: RunContext,
        action: &ActionRef,
        input: NormalizedRequest,
    ) -> Result<DispatchOutcome, ActionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = (self.reply)(action, &input);
        self.invocations.lock().unwrap().push(Invocation {
            action: action.clone(),
            ctx,
            input,
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.completed.fetch_add(1, Ordering::SeqCst);
        reply
    }
}

/// The orders trigger used across tests.
#[allow(dead_code)]
pub fn orders_config() -> TriggerConfig {
    TriggerConfig::with_port(8080)
        .handler("POST", "/orders/:id", "createOrder")
        .handler("GET", "/orders", "listOrders")
        .handler("DELETE", "/orders/:id", "deleteOrder")
}

/// Send one request through the fully layered router.
#[allow(dead_code)]
pub async fn send(server: &HttpServer, request: Request<Body>) -> Response<Body> {
    server.router().oneshot(request).await.unwrap()
}

#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}
