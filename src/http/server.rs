//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with a single catch-all handler
//! - Wire up middleware (tracing, request ID, optional timeout)
//! - Body size is enforced by the dispatcher after matching, so preflight and
//!   404 answers never depend on the body
//! - Bind server to listener
//! - Hand every request to the dispatcher
//! - Stop accepting on shutdown, let in-flight requests finish

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    routing::any,
    Router,
};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::action::Runner;
use crate::config::{ServerConfig, TriggerConfig};
use crate::http::dispatcher::Dispatcher;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::lifecycle::startup::StartupError;
use crate::net::Listener;

/// HTTP server for one REST trigger.
#[derive(Debug)]
pub struct HttpServer {
    router: Router,
    config: TriggerConfig,
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    /// Validate `config`, build routes and wire them to `runner`.
    pub fn new(config: TriggerConfig, runner: Arc<dyn Runner>) -> Result<Self, StartupError> {
        let dispatcher = Arc::new(Dispatcher::from_config(&config, runner)?);

        for route in dispatcher.routes().routes() {
            tracing::debug!(
                trigger_id = %config.id,
                method = %route.method,
                path = %route.pattern,
                target = ?route.target,
                "Route registered"
            );
        }

        let router = Self::build_router(&config.server, Arc::clone(&dispatcher));
        Ok(Self {
            router,
            config,
            dispatcher,
        })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, dispatcher: Arc<Dispatcher>) -> Router {
        let mut router = Router::new()
            .route("/{*path}", any(dispatch_handler))
            .route("/", any(dispatch_handler))
            .with_state(dispatcher);

        if let Some(secs) = config.request_timeout_secs {
            router = router.layer(TimeoutLayer::new(Duration::from_secs(secs)));
        }

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, e.g. for driving with `tower::ServiceExt`.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: Listener,
        shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            trigger_id = %self.config.id,
            address = %addr,
            routes = self.dispatcher.routes().len(),
            "HTTP server starting"
        );

        axum::serve(listener.into_inner(), self.router)
            .with_graceful_shutdown(async move {
                shutdown.triggered().await;
                tracing::info!("Shutdown signal received, draining in-flight requests");
            })
            .await?;

        tracing::info!(trigger_id = %self.config.id, "HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &TriggerConfig {
        &self.config
    }

    /// The validated listen port.
    pub fn port(&self) -> Option<u16> {
        self.config.port.as_ref().and_then(|p| p.resolve())
    }
}

async fn dispatch_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: Request<Body>,
) -> Response {
    dispatcher.handle(request).await
}
