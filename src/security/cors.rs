//! Cross-origin resource sharing.
//!
//! # Responsibilities
//! - Build an immutable policy from `[cors]` config plus `REST_TRIGGER_CORS_*` overrides
//! - Answer preflight requests with `Access-Control-Allow-*`
//! - Stamp actual-request responses with the grant headers
//!
//! # Design Decisions
//! - Preflight always answers 200, even for origins outside the policy;
//!   the browser enforces the mismatch
//! - A listed origin is echoed back with `Vary: Origin`, `*` is sent as is
//! - `*` with credentials echoes the request origin, since browsers reject
//!   a wildcard on credentialed requests

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
            ACCESS_CONTROL_EXPOSE_HEADERS, ACCESS_CONTROL_MAX_AGE, ORIGIN, VARY,
        },
        HeaderMap, HeaderValue, StatusCode,
    },
    response::Response,
};

use crate::config::CorsConfig;

/// Prefix naming this trigger's CORS policy in the environment.
pub const REST_CORS_PREFIX: &str = "REST_TRIGGER";

#[derive(Debug, thiserror::Error)]
pub enum CorsError {
    #[error("invalid CORS {field} value '{value}'")]
    InvalidHeader { field: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AllowedOrigins {
    Any,
    List(Vec<HeaderValue>),
}

/// Validated, header-ready CORS policy.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    origins: AllowedOrigins,
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    expose_headers: Option<HeaderValue>,
    allow_credentials: bool,
    max_age: HeaderValue,
}

fn header_value(field: &'static str, value: &str) -> Result<HeaderValue, CorsError> {
    HeaderValue::from_str(value.trim()).map_err(|_| CorsError::InvalidHeader {
        field,
        value: value.to_string(),
    })
}

impl CorsPolicy {
    pub fn from_config(config: &CorsConfig) -> Result<Self, CorsError> {
        let origin = config.allow_origin.trim();
        let origins = if origin.is_empty() || origin == "*" {
            AllowedOrigins::Any
        } else {
            let list = origin
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(|o| header_value("allow_origin", o))
                .collect::<Result<Vec<_>, _>>()?;
            AllowedOrigins::List(list)
        };

        let expose_headers = if config.expose_headers.trim().is_empty() {
            None
        } else {
            Some(header_value("expose_headers", &config.expose_headers)?)
        };

        Ok(Self {
            origins,
            allow_methods: header_value("allow_methods", &config.allow_methods)?,
            allow_headers: header_value("allow_headers", &config.allow_headers)?,
            expose_headers,
            allow_credentials: config.allow_credentials,
            max_age: HeaderValue::from(config.max_age_secs),
        })
    }

    /// Whether `origin` is permitted by the policy.
    pub fn is_origin_allowed(&self, origin: &HeaderValue) -> bool {
        match &self.origins {
            AllowedOrigins::Any => true,
            AllowedOrigins::List(list) => list.iter().any(|o| o == origin),
        }
    }

    /// Value of `Access-Control-Allow-Origin` for a request from `origin`,
    /// and whether the response varies by origin.
    fn allow_origin(&self, origin: Option<&HeaderValue>) -> (HeaderValue, bool) {
        match (&self.origins, origin) {
            (AllowedOrigins::Any, Some(origin)) if self.allow_credentials => (origin.clone(), true),
            (AllowedOrigins::Any, _) => (HeaderValue::from_static("*"), false),
            (AllowedOrigins::List(_), Some(origin)) if self.is_origin_allowed(origin) => {
                (origin.clone(), true)
            }
            (AllowedOrigins::List(list), _) => (
                list.first()
                    .cloned()
                    .unwrap_or_else(|| HeaderValue::from_static("null")),
                true,
            ),
        }
    }

    fn write_origin(&self, origin: Option<&HeaderValue>, headers: &mut HeaderMap) {
        let (value, vary) = self.allow_origin(origin);
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, value);
        if vary {
            headers.append(VARY, HeaderValue::from_static("Origin"));
        }
        if self.allow_credentials {
            headers.insert(
                ACCESS_CONTROL_ALLOW_CREDENTIALS,
                HeaderValue::from_static("true"),
            );
        }
    }
}

/// Override `config` from `<prefix>_CORS_*` variables resolved by `lookup`.
///
/// Unparseable boolean or numeric overrides are logged and ignored.
pub fn apply_env_overrides<F>(config: &mut CorsConfig, prefix: &str, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let key = |name: &str| format!("{}_CORS_{}", prefix, name);

    if let Some(v) = lookup(&key("ALLOW_ORIGIN")) {
        config.allow_origin = v;
    }
    if let Some(v) = lookup(&key("ALLOW_METHODS")) {
        config.allow_methods = v;
    }
    if let Some(v) = lookup(&key("ALLOW_HEADERS")) {
        config.allow_headers = v;
    }
    if let Some(v) = lookup(&key("EXPOSE_HEADERS")) {
        config.expose_headers = v;
    }
    if let Some(v) = lookup(&key("ALLOW_CREDENTIALS")) {
        match v.trim().parse() {
            Ok(flag) => config.allow_credentials = flag,
            Err(_) => tracing::warn!(value = %v, "Ignoring invalid CORS allow-credentials override"),
        }
    }
    if let Some(v) = lookup(&key("MAX_AGE")) {
        match v.trim().parse() {
            Ok(secs) => config.max_age_secs = secs,
            Err(_) => tracing::warn!(value = %v, "Ignoring invalid CORS max-age override"),
        }
    }
}

/// Answers preflights and annotates actual responses for one policy.
#[derive(Debug, Clone)]
pub struct CorsNegotiator {
    policy: CorsPolicy,
}

impl CorsNegotiator {
    pub fn new(policy: CorsPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CorsPolicy {
        &self.policy
    }

    /// Answer an OPTIONS request. Never looks at the body.
    pub fn handle_preflight(&self, request_headers: &HeaderMap) -> Response {
        let origin = request_headers.get(ORIGIN);
        if let Some(origin) = origin {
            if !self.policy.is_origin_allowed(origin) {
                tracing::debug!(origin = ?origin, "Preflight from origin outside CORS policy");
            }
        }

        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::OK;
        let headers = response.headers_mut();
        self.policy.write_origin(origin, headers);
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            self.policy.allow_methods.clone(),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            self.policy.allow_headers.clone(),
        );
        headers.insert(ACCESS_CONTROL_MAX_AGE, self.policy.max_age.clone());
        response
    }

    /// Set the actual-request grant headers on `response_headers`.
    pub fn annotate_actual(&self, request_headers: &HeaderMap, response_headers: &mut HeaderMap) {
        self.policy
            .write_origin(request_headers.get(ORIGIN), response_headers);
        if let Some(expose) = &self.policy.expose_headers {
            response_headers.insert(ACCESS_CONTROL_EXPOSE_HEADERS, expose.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn negotiator(config: CorsConfig) -> CorsNegotiator {
        CorsNegotiator::new(CorsPolicy::from_config(&config).unwrap())
    }

    fn with_origin(origin: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ORIGIN, HeaderValue::from_str(origin).unwrap());
        headers
    }

    #[test]
    fn test_preflight_default_policy() {
        let cors = negotiator(CorsConfig::default());
        let response = cors.handle_preflight(&HeaderMap::new());

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(
            headers[ACCESS_CONTROL_ALLOW_METHODS],
            "POST, GET, OPTIONS, PUT, DELETE, PATCH"
        );
        assert!(headers.contains_key(ACCESS_CONTROL_ALLOW_HEADERS));
        assert_eq!(headers[ACCESS_CONTROL_MAX_AGE], "21600");
        assert!(!headers.contains_key(ACCESS_CONTROL_ALLOW_CREDENTIALS));
        assert!(!headers.contains_key(VARY));
    }

    #[test]
    fn test_actual_headers_differ_from_preflight() {
        let cors = negotiator(CorsConfig {
            expose_headers: "X-Total-Count".into(),
            ..CorsConfig::default()
        });
        let mut headers = HeaderMap::new();
        cors.annotate_actual(&HeaderMap::new(), &mut headers);

        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_EXPOSE_HEADERS], "X-Total-Count");
        assert!(!headers.contains_key(ACCESS_CONTROL_ALLOW_METHODS));
        assert!(!headers.contains_key(ACCESS_CONTROL_MAX_AGE));
    }

    #[test]
    fn test_listed_origin_is_echoed() {
        let cors = negotiator(CorsConfig {
            allow_origin: "https://a.example, https://b.example".into(),
            ..CorsConfig::default()
        });

        let response = cors.handle_preflight(&with_origin("https://b.example"));
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://b.example"
        );
        assert_eq!(response.headers()[VARY], "Origin");

        // Unknown origins still get a 200, but not their own origin back
        let response = cors.handle_preflight(&with_origin("https://evil.example"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://a.example"
        );
    }

    #[test]
    fn test_credentials_with_wildcard_echo_origin() {
        let cors = negotiator(CorsConfig {
            allow_credentials: true,
            ..CorsConfig::default()
        });
        let mut headers = HeaderMap::new();
        cors.annotate_actual(&with_origin("https://app.example"), &mut headers);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("REST_TRIGGER_CORS_ALLOW_ORIGIN", "https://x.example"),
            ("REST_TRIGGER_CORS_MAX_AGE", "60"),
            ("REST_TRIGGER_CORS_ALLOW_CREDENTIALS", "maybe"),
            ("OTHER_CORS_ALLOW_HEADERS", "X-Ignored"),
        ]
        .into_iter()
        .collect();

        let mut config = CorsConfig::default();
        apply_env_overrides(&mut config, REST_CORS_PREFIX, |key| {
            env.get(key).map(|v| v.to_string())
        });

        assert_eq!(config.allow_origin, "https://x.example");
        assert_eq!(config.max_age_secs, 60);
        assert!(!config.allow_credentials);
        assert_eq!(config.allow_headers, CorsConfig::default().allow_headers);
    }

    #[test]
    fn test_invalid_header_value_rejected() {
        let err = CorsPolicy::from_config(&CorsConfig {
            allow_methods: "GET\nPOST".into(),
            ..CorsConfig::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            CorsError::InvalidHeader {
                field: "allow_methods",
                ..
            }
        ));
    }
}
