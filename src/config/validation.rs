//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the port range
//! - Validate each handler's method, path pattern and action
//! - Detect duplicate (method, path) registrations
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: TriggerConfig → Result<(), Vec<ValidationError>>
//! - Runs before any route is registered or port bound

use std::collections::HashSet;

use crate::config::schema::TriggerConfig;
use crate::routing::{RouteConfig, RouteError};

/// A single semantic problem in a [`TriggerConfig`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("no port found for trigger '{trigger}'")]
    MissingPort { trigger: String },

    #[error("invalid port {value} for trigger '{trigger}' (expected 1-65535)")]
    InvalidPort { trigger: String, value: String },

    #[error("invalid handler #{index}: {source}")]
    Handler {
        index: usize,
        #[source]
        source: RouteError,
    },
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &TriggerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match &config.port {
        None => errors.push(ValidationError::MissingPort {
            trigger: config.id.clone(),
        }),
        Some(port) if port.resolve().is_none() => errors.push(ValidationError::InvalidPort {
            trigger: config.id.clone(),
            value: port.to_string(),
        }),
        Some(_) => {}
    }

    let mut seen = HashSet::new();
    for (index, handler) in config.handlers.iter().enumerate() {
        match RouteConfig::from_handler(handler) {
            Ok(route) => {
                let key = (route.method, route.pattern.as_str().to_string());
                if !seen.insert(key) {
                    errors.push(ValidationError::Handler {
                        index,
                        source: RouteError::Duplicate {
                            method: route.method.to_string(),
                            path: route.pattern.as_str().to_string(),
                        },
                    });
                }
            }
            Err(source) => errors.push(ValidationError::Handler { index, source }),
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{HandlerConfig, PortSetting};

    #[test]
    fn test_valid_config() {
        let config = TriggerConfig::with_port(8080)
            .handler("GET", "/orders", "listOrders")
            .handler("post", "/orders/:id", "createOrder");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_missing_port() {
        let config = TriggerConfig::default().handler("GET", "/", "root");
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::MissingPort {
                trigger: "rest".into()
            }]
        );
    }

    #[test]
    fn test_invalid_port() {
        let mut config = TriggerConfig::default();
        config.port = Some(PortSetting::Text("99999".into()));
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(errors[0], ValidationError::InvalidPort { .. }));
    }

    #[test]
    fn test_duplicate_route_rejected() {
        let config = TriggerConfig::with_port(8080)
            .handler("POST", "/orders/:id", "createOrder")
            .handler("post", "/orders/:id", "createOrderV2");
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0],
            ValidationError::Handler {
                index: 1,
                source: RouteError::Duplicate {
                    method: "POST".into(),
                    path: "/orders/:id".into(),
                },
            }
        );
    }

    #[test]
    fn test_same_path_different_methods_allowed() {
        let config = TriggerConfig::with_port(8080)
            .handler("GET", "/orders/:id", "getOrder")
            .handler("DELETE", "/orders/:id", "deleteOrder");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = TriggerConfig::default()
            .handler("FETCH", "/orders", "a")
            .handler("GET", "", "b");
        config.handlers.push(HandlerConfig {
            action_id: "c".into(),
            ..HandlerConfig::default()
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(matches!(errors[0], ValidationError::MissingPort { .. }));
        assert_eq!(
            errors[1],
            ValidationError::Handler {
                index: 0,
                source: RouteError::InvalidMethod("FETCH".into()),
            }
        );
        assert_eq!(
            errors[2],
            ValidationError::Handler {
                index: 1,
                source: RouteError::EmptyPath,
            }
        );
        assert_eq!(
            errors[3],
            ValidationError::Handler {
                index: 2,
                source: RouteError::MissingSettings,
            }
        );
    }
}
