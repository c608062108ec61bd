//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::TriggerConfig;
use crate::config::validation::ValidationError;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// `.json` files are read as JSON, everything else as TOML.
fn parse_config(path: &Path, content: &str) -> Result<TriggerConfig, ConfigError> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        Ok(serde_json::from_str(content)?)
    } else {
        Ok(toml::from_str(content)?)
    }
}

/// Read a TOML or JSON configuration file.
///
/// Not validated here: callers apply command-line overrides first and then run
/// [`validate_config`](crate::config::validate_config).
pub fn read_config(path: &Path) -> Result<TriggerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config = parse_config(path, &content)?;

    tracing::debug!(
        path = %path.display(),
        trigger_id = %config.id,
        handlers = config.handlers.len(),
        "Configuration loaded"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validate_config;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_json() {
        let file = write_temp(
            ".json",
            r#"{"port": "8080", "handlers": [{"method": "GET", "path": "/ping", "actionId": "ping"}]}"#,
        );
        let config = read_config(file.path()).unwrap();
        assert_eq!(config.handlers[0].action_id, "ping");
    }

    #[test]
    fn test_load_toml() {
        let file = write_temp(
            ".toml",
            r#"
                port = 8080

                [[handlers]]
                method = "PUT"
                path = "/items/:id"
                actionId = "updateItem"
            "#,
        );
        let config = read_config(file.path()).unwrap();
        assert_eq!(config.handlers[0].method.as_deref(), Some("PUT"));
    }

    #[test]
    fn test_duplicates_caught_by_validation() {
        let file = write_temp(
            ".json",
            r#"{"port": 8080, "handlers": [
                {"method": "GET", "path": "/a", "actionId": "x"},
                {"method": "GET", "path": "/a", "actionId": "y"}
            ]}"#,
        );
        let config = read_config(file.path()).unwrap();
        assert_eq!(validate_config(&config).unwrap_err().len(), 1);
    }

    #[test]
    fn test_load_parse_error() {
        let file = write_temp(".json", "{ not json");
        assert!(matches!(read_config(file.path()), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_example_config_is_valid() {
        let config = parse_config(
            Path::new("trigger.example.toml"),
            include_str!("../../trigger.example.toml"),
        )
        .unwrap();
        assert_eq!(config.id, "orders");
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let err = read_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
