//! Startup orchestration.
//!
//! # Responsibilities
//! - Apply `REST_TRIGGER_CORS_*` overrides
//! - Validate configuration and build the route table
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned before a single request is served
//! - Listener binds last (traffic only when routes are ready)

use std::sync::Arc;

use crate::action::Runner;
use crate::config::{ConfigError, TriggerConfig};
use crate::http::HttpServer;
use crate::lifecycle::shutdown::ShutdownSignal;
use crate::net::{Listener, ListenerError};
use crate::routing::RouteError;
use crate::security::{apply_env_overrides, CorsError, REST_CORS_PREFIX};

/// Anything that stops a trigger from starting or serving.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Route registration failed: {0}")]
    Route(#[from] RouteError),

    #[error(transparent)]
    Cors(#[from] CorsError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Validate, build and bind without serving yet.
pub async fn prepare(
    mut config: TriggerConfig,
    runner: Arc<dyn Runner>,
) -> Result<(HttpServer, Listener), StartupError> {
    apply_env_overrides(&mut config.cors, REST_CORS_PREFIX, |key| {
        std::env::var(key).ok()
    });

    let server = HttpServer::new(config, runner)?;
    let port = server.port().ok_or_else(|| {
        ConfigError::Validation(vec![crate::config::ValidationError::MissingPort {
            trigger: server.config().id.clone(),
        }])
    })?;

    tracing::info!(
        trigger_id = %server.config().id,
        port,
        handlers = server.config().handlers.len(),
        "Trigger configured"
    );

    let listener = Listener::bind(&server.config().server.host, port).await?;
    Ok((server, listener))
}

/// Start a trigger and serve until `shutdown` fires.
pub async fn start(
    config: TriggerConfig,
    runner: Arc<dyn Runner>,
    shutdown: ShutdownSignal,
) -> Result<(), StartupError> {
    let (server, listener) = prepare(config, runner).await?;
    server
        .run(listener, shutdown)
        .await
        .map_err(StartupError::Serve)
}
