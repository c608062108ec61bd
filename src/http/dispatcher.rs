//! Per-request dispatch.
//!
//! One pass per request:
//! ```text
//! Received → Matched → Normalized → Invoked → Responded
//!     │                    │            │
//!     └─ no route: 404     └─ bad body  └─ action error: 400
//!                             400, or 413 over the size cap
//! OPTIONS: Matched → CORS preflight → Responded (runner untouched)
//! ```
//!
//! The runner call is spawned onto its own task. If the client goes away the
//! handler future is dropped, but the invocation still runs to completion and
//! its result is discarded.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    http::{header::CONTENT_LENGTH, HeaderMap, Request},
    response::{IntoResponse, Response},
};
use tracing::Instrument;
use uuid::Uuid;

use crate::action::{ActionRef, RunContext, Runner};
use crate::config::{validate_config, ConfigError, TriggerConfig};
use crate::http::request::normalize;
use crate::http::response::{outcome_response, Rejection};
use crate::lifecycle::startup::StartupError;
use crate::observability::metrics;
use crate::routing::{RouteTable, RouteTarget};
use crate::security::{CorsNegotiator, CorsPolicy};

const X_REQUEST_ID: &str = "x-request-id";

/// Routes requests to the runner. Immutable once built; share via `Arc`.
pub struct Dispatcher {
    trigger_id: Arc<str>,
    routes: RouteTable,
    cors: CorsNegotiator,
    runner: Arc<dyn Runner>,
    max_body_size: usize,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("trigger_id", &self.trigger_id)
            .field("routes", &self.routes.len())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        trigger_id: impl Into<Arc<str>>,
        routes: RouteTable,
        cors: CorsNegotiator,
        runner: Arc<dyn Runner>,
    ) -> Self {
        Self {
            trigger_id: trigger_id.into(),
            routes,
            cors,
            runner,
            max_body_size: usize::MAX,
        }
    }

    /// Cap on the bytes read from a request body.
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Validate `config` and build the route table and CORS policy from it.
    pub fn from_config(config: &TriggerConfig, runner: Arc<dyn Runner>) -> Result<Self, StartupError> {
        validate_config(config).map_err(ConfigError::Validation)?;
        let routes = RouteTable::from_handlers(&config.handlers)?;
        let cors = CorsNegotiator::new(CorsPolicy::from_config(&config.cors)?);

        if routes.is_empty() {
            tracing::warn!(trigger_id = %config.id, "No handlers configured");
        }

        Ok(Self::new(config.id.as_str(), routes, cors, runner)
            .with_max_body_size(config.server.max_body_size))
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub fn trigger_id(&self) -> &str {
        &self.trigger_id
    }

    /// Handle one request, always producing exactly one response.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let request_id = request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let span = tracing::info_span!(
            "dispatch",
            trigger_id = %self.trigger_id,
            method = %request.method(),
            path = %request.uri().path(),
            request_id = request_id.as_deref().unwrap_or("unknown")
        );
        self.dispatch(request, request_id).instrument(span).await
    }

    async fn dispatch(&self, request: Request<Body>, request_id: Option<String>) -> Response {
        let start_time = Instant::now();
        let method = request.method().clone();
        let path = request.uri().path().to_string();

        // 1. Match route
        let Some(matched) = self.routes.lookup(&method, &path) else {
            tracing::warn!("No route matched");
            metrics::record_request(method.as_str(), "none", 404, start_time);
            return Rejection::NotFound.into_response();
        };
        let route = matched.route.pattern.as_str().to_string();

        // 2. Preflight never reaches the runner
        let action: ActionRef = match &matched.route.target {
            RouteTarget::Preflight => {
                tracing::info!(route = %route, "Received CORS preflight");
                let response = self.cors.handle_preflight(request.headers());
                metrics::record_request(
                    method.as_str(),
                    &route,
                    response.status().as_u16(),
                    start_time,
                );
                return response;
            }
            RouteTarget::Action(action) => action.clone(),
        };
        let path_params = matched.params;

        // 3. Grant headers first, then normalize
        let mut headers = HeaderMap::new();
        self.cors.annotate_actual(request.headers(), &mut headers);

        if let Some(declared) = declared_length(request.headers()) {
            if declared > self.max_body_size {
                tracing::warn!(declared, limit = self.max_body_size, "Request body too large");
                return self.reject(
                    Rejection::PayloadTooLarge {
                        limit: self.max_body_size,
                    },
                    headers,
                    &method,
                    &route,
                    start_time,
                );
            }
        }

        let (parts, body) = request.into_parts();
        let bytes = match axum::body::to_bytes(body, self.max_body_size).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read request body");
                return self.reject(
                    Rejection::BodyRead(e.to_string()),
                    headers,
                    &method,
                    &route,
                    start_time,
                );
            }
        };

        let input = match normalize(&parts.uri, &bytes, path_params) {
            Ok(input) => input,
            Err(e) => {
                tracing::debug!(error = %e, "Malformed request body");
                return self.reject(Rejection::from(e), headers, &method, &route, start_time);
            }
        };

        // 4. Invoke
        let ctx = RunContext {
            trigger_id: Arc::clone(&self.trigger_id),
            correlation_id: Uuid::new_v4(),
            request_id,
            method: method.as_str().to_string(),
            route: route.clone(),
        };
        tracing::debug!(
            action = %action,
            correlation_id = %ctx.correlation_id,
            "Invoking action"
        );

        let runner = Arc::clone(&self.runner);
        let task_action = action.clone();
        let invocation = tokio::spawn(
            async move { runner.run(ctx, &task_action, input).await }.in_current_span(),
        );

        let result = match invocation.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(action = %action, error = %e, "Action task failed");
                metrics::record_action(action.as_str(), "panic");
                return self.reject(Rejection::Internal, headers, &method, &route, start_time);
            }
        };

        // 5./6. Map outcome
        match result {
            Ok(outcome) => {
                metrics::record_action(action.as_str(), "ok");
                let response = outcome_response(outcome, headers);
                tracing::debug!(action = %action, status = %response.status(), "Action completed");
                metrics::record_request(
                    method.as_str(),
                    &route,
                    response.status().as_u16(),
                    start_time,
                );
                response
            }
            Err(e) => {
                tracing::debug!(action = %action, error = %e, "Action returned an error");
                metrics::record_action(action.as_str(), "error");
                self.reject(Rejection::from(e), headers, &method, &route, start_time)
            }
        }
    }

    fn reject(
        &self,
        rejection: Rejection,
        headers: HeaderMap,
        method: &axum::http::Method,
        route: &str,
        start_time: Instant,
    ) -> Response {
        let response = rejection.into_response_with(headers);
        metrics::record_request(method.as_str(), route, response.status().as_u16(), start_time);
        response
    }
}

fn declared_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
