//! Response mapping.
//!
//! # Responsibilities
//! - Map a runner outcome to status + JSON body
//! - Map rejections (no route, bad body, action error) to client errors
//! - Keep CORS headers set before the handler-specific ones
//!
//! # Design Decisions
//! - Status: the runner's code when present and non-zero, otherwise 200
//! - A body is written only when the runner produced one
//! - An encoding failure after the status is chosen is logged; the status stands

use axum::{
    body::Body,
    http::{
        header::{CONTENT_TYPE, X_CONTENT_TYPE_OPTIONS},
        HeaderMap, HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};

use crate::action::{ActionError, DispatchOutcome};
use crate::http::request::DecodeError;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Terminal failure of a dispatch before a successful outcome exists.
#[derive(Debug, thiserror::Error)]
pub enum Rejection {
    #[error("no matching route found")]
    NotFound,

    #[error("{0}")]
    InvalidBody(#[from] DecodeError),

    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("{0}")]
    Action(#[from] ActionError),

    #[error("action invocation failed")]
    Internal,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::NotFound => StatusCode::NOT_FOUND,
            Rejection::InvalidBody(_) | Rejection::BodyRead(_) | Rejection::Action(_) => {
                StatusCode::BAD_REQUEST
            }
            Rejection::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Rejection::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text error response on top of already-set headers.
    pub fn into_response_with(self, headers: HeaderMap) -> Response {
        text_response(self.status(), &self.to_string(), headers)
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        self.into_response_with(HeaderMap::new())
    }
}

fn text_response(status: StatusCode, message: &str, headers: HeaderMap) -> Response {
    let mut response = Response::new(Body::from(message.to_string()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(TEXT_CONTENT_TYPE));
    response
        .headers_mut()
        .insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

/// Pick the status for a runner reply code.
pub fn resolve_status(code: Option<u16>) -> Result<StatusCode, u16> {
    match code {
        None | Some(0) => Ok(StatusCode::OK),
        Some(code) => StatusCode::from_u16(code).map_err(|_| code),
    }
}

/// Write a successful outcome on top of already-set headers.
pub fn outcome_response(outcome: DispatchOutcome, headers: HeaderMap) -> Response {
    let status = match resolve_status(outcome.status_code) {
        Ok(status) => status,
        Err(code) => {
            tracing::error!(code, "Action returned an invalid status code");
            return Rejection::Internal.into_response_with(headers);
        }
    };

    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    *response.headers_mut() = headers;

    if let Some(body) = outcome.body {
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        match serde_json::to_vec(&body) {
            Ok(bytes) => *response.body_mut() = Body::from(bytes),
            Err(e) => tracing::error!(error = %e, status = %status, "Failed to encode reply"),
        }
    }
    response
}
