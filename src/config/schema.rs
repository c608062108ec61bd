//! Configuration schema definitions.
//!
//! All types derive Serde traits so the same schema reads from TOML or JSON.

use serde::{Deserialize, Serialize};

/// Root configuration for a REST trigger.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriggerConfig {
    /// Trigger identifier used in logs and metrics.
    #[serde(default = "default_trigger_id")]
    pub id: String,

    /// Port to listen on (number or numeric string).
    #[serde(default)]
    pub port: Option<PortSetting>,

    /// Route handlers, in registration order.
    #[serde(default)]
    pub handlers: Vec<HandlerConfig>,

    /// Cross-origin policy.
    #[serde(default)]
    pub cors: CorsConfig,

    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability settings.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

fn default_trigger_id() -> String {
    "rest".to_string()
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            id: default_trigger_id(),
            port: None,
            handlers: Vec::new(),
            cors: CorsConfig::default(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl TriggerConfig {
    /// Minimal config listening on `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            port: Some(PortSetting::Number(i64::from(port))),
            ..Self::default()
        }
    }

    /// Append a handler (builder style, mostly for tests and embedding).
    pub fn handler(
        mut self,
        method: impl Into<String>,
        path: impl Into<String>,
        action_id: impl Into<String>,
    ) -> Self {
        self.handlers.push(HandlerConfig::new(method, path, action_id));
        self
    }
}

/// The `port` setting as written in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PortSetting {
    Number(i64),
    Text(String),
}

impl PortSetting {
    /// Resolve to a usable port, if the value is one.
    pub fn resolve(&self) -> Option<u16> {
        let raw = match self {
            PortSetting::Number(n) => *n,
            PortSetting::Text(s) => s.trim().parse::<i64>().ok()?,
        };
        u16::try_from(raw).ok().filter(|p| *p != 0)
    }
}

impl std::fmt::Display for PortSetting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortSetting::Number(n) => write!(f, "{}", n),
            PortSetting::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// One route handler as configured.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HandlerConfig {
    /// HTTP method (case-insensitive).
    #[serde(default)]
    pub method: Option<String>,

    /// Path pattern with `:name` / `*name` segments.
    #[serde(default)]
    pub path: Option<String>,

    /// Action invoked for matching requests.
    #[serde(rename = "actionId", alias = "action_id", default)]
    pub action_id: String,
}

impl HandlerConfig {
    pub fn new(
        method: impl Into<String>,
        path: impl Into<String>,
        action_id: impl Into<String>,
    ) -> Self {
        Self {
            method: Some(method.into()),
            path: Some(path.into()),
            action_id: action_id.into(),
        }
    }
}

/// Cross-origin resource sharing policy.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// `*` or a comma separated list of origins.
    pub allow_origin: String,

    /// Value of `Access-Control-Allow-Methods` on preflight.
    pub allow_methods: String,

    /// Value of `Access-Control-Allow-Headers` on preflight.
    pub allow_headers: String,

    /// Value of `Access-Control-Expose-Headers` on actual responses.
    pub expose_headers: String,

    /// Emit `Access-Control-Allow-Credentials: true`.
    pub allow_credentials: bool,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
            allow_methods: "POST, GET, OPTIONS, PUT, DELETE, PATCH".to_string(),
            allow_headers: "Origin, Accept, Content-Type, X-Requested-With, Authorization"
                .to_string(),
            expose_headers: String::new(),
            allow_credentials: false,
            max_age_secs: 21_600,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,

    /// Maximum request body size in bytes.
    pub max_body_size: usize,

    /// Optional total request deadline. The dispatcher itself never times out.
    pub request_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
            request_timeout_secs: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
