//! ExamHub CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use examhub_core::config::{AppConfig, LoggingConfig};

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // A broken config is reported by the command itself.
    let (config, load_error) = match commands::load_config(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_logging(&config.logging);
    if let Some(e) = load_error {
        tracing::debug!(error = %e, "Configuration did not load, logging with defaults");
    }

    if let Err(e) = cli.execute().await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Install the subscriber described by `[logging]`; `RUST_LOG` wins over the level.
fn init_logging(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
