//! REST trigger (v1)
//!
//! Serves the routes of one trigger configuration and hands each request to a
//! runner. The stock binary wires the echo runner, which replies with the
//! normalized input; embedders supply their own `Runner`.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                   REST TRIGGER                   │
//!                    │                                                  │
//!   Client Request   │  ┌─────────┐   ┌─────────┐   ┌──────────────┐    │
//!   ─────────────────┼─▶│   net   │──▶│  http   │──▶│   routing    │    │
//!                    │  │listener │   │ server  │   │ route table  │    │
//!                    │  └─────────┘   └─────────┘   └──────┬───────┘    │
//!                    │                                     │            │
//!                    │                 OPTIONS ┌───────────┴──────┐     │
//!                    │               ┌─────────┤    dispatcher    │     │
//!                    │               ▼         └────────┬─────────┘     │
//!                    │        ┌────────────┐            │ normalize     │
//!                    │        │  security  │            ▼               │
//!                    │        │    cors    │     ┌──────────────┐       │
//!                    │        └────────────┘     │    Runner    │       │
//!                    │                           └──────────────┘       │
//!                    └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use rest_trigger::action::EchoRunner;
use rest_trigger::config::{read_config, validate_config, ConfigError, PortSetting};
use rest_trigger::lifecycle::{self, signals, Shutdown};
use rest_trigger::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "rest-trigger")]
#[command(about = "HTTP-to-action dispatch layer", long_about = None)]
struct Cli {
    /// Trigger configuration (TOML, or JSON when the extension is .json)
    #[arg(short, long, default_value = "trigger.toml")]
    config: PathBuf,

    /// Override the configured port
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the configured log level
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = read_config(&cli.config)?;
    if let Some(port) = cli.port {
        config.port = Some(PortSetting::Number(i64::from(port)));
    }
    if let Some(level) = cli.log_level {
        config.observability.log_level = level;
    }

    logging::init_logging(&config.observability.log_level);
    tracing::info!("rest-trigger v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(errors) = validate_config(&config) {
        for error in &errors {
            tracing::error!(%error, "Invalid configuration");
        }
        return Err(ConfigError::Validation(errors).into());
    }

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    lifecycle::start(config, Arc::new(EchoRunner), shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
