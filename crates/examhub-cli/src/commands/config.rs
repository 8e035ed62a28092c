//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use examhub_core::config::AppConfig;
use examhub_core::error::AppError;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            match format {
                OutputFormat::Table => print_sections(&config),
                OutputFormat::Json => output::print_item(&config, format),
            }
        }
    }

    Ok(())
}

fn print_sections(config: &AppConfig) {
    println!("[server]");
    output::print_kv("host", &config.server.host);
    output::print_kv("port", &config.server.port.to_string());

    println!("[realtime]");
    output::print_kv(
        "channel_buffer_size",
        &config.realtime.channel_buffer_size.to_string(),
    );
    output::print_kv(
        "logout_grace_seconds",
        &config.realtime.logout_grace_seconds.to_string(),
    );
    output::print_kv(
        "max_message_bytes",
        &config.realtime.max_message_bytes.to_string(),
    );

    println!("[client]");
    output::print_kv("endpoint", &config.client.endpoint);
    output::print_kv(
        "notification_capacity",
        &config.client.notification_capacity.to_string(),
    );
    output::print_kv(
        "outbound_buffer_size",
        &config.client.outbound_buffer_size.to_string(),
    );
    output::print_kv("flush_timeout_ms", &config.client.flush_timeout_ms.to_string());

    println!("[logging]");
    output::print_kv("level", &config.logging.level);
    output::print_kv("format", &config.logging.format);
}
