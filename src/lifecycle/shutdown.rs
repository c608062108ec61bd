//! Stop signal shared between the signal handler and the HTTP server.
//!
//! Backed by a `watch` channel holding a single "stopping" flag, so a listener
//! that subscribes after the trigger still sees it.

use std::sync::Arc;

use tokio::sync::watch;

/// Handle that asks every serving trigger to stop.
#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    pub fn subscribe(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Idempotent.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side held by a server.
#[derive(Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// Resolve once shutdown is triggered. Never resolves if every
    /// [`Shutdown`] handle is dropped without triggering.
    pub async fn triggered(mut self) {
        let stopping = self.rx.wait_for(|stopping| *stopping).await.is_ok();
        if !stopping {
            std::future::pending::<()>().await;
        }
    }
}
