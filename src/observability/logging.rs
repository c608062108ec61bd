//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick the filter from `RUST_LOG`, else the configured level
//!
//! # Design Decisions
//! - `try_init` so embedding applications and tests keep their own subscriber

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when neither `RUST_LOG` nor config narrows it.
pub fn default_filter(level: &str) -> String {
    format!("rest_trigger={level},tower_http={level}")
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init_logging(level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter() {
        assert_eq!(
            default_filter("debug"),
            "rest_trigger=debug,tower_http=debug"
        );
    }
}
