//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML/JSON)
//!     → loader.rs (parse & deserialize)
//!     → REST_TRIGGER_CORS_* environment overrides
//!     → validation.rs (semantic checks)
//!     → TriggerConfig (validated, immutable)
//!     → RouteTable + CorsPolicy built once at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - Everything except `port` and `handlers` has a default
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{read_config, ConfigError};
pub use schema::{
    CorsConfig, HandlerConfig, ObservabilityConfig, PortSetting, ServerConfig, TriggerConfig,
};
pub use validation::{validate_config, ValidationError};
