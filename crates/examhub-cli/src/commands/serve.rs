//! Run the status service.

use clap::Args;
use tracing::{info, warn};

use crate::output::{self, OutputFormat};
use examhub_core::error::AppError;
use examhub_realtime::RealtimeServer;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,
}

/// Execute the serve command
pub async fn execute(
    args: &ServeArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;

    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }

    let server = RealtimeServer::bind(&config).await?;

    println!("Starting ExamHub status service...");
    println!("  Address: {}", server.local_addr()?);
    println!("  Logout grace: {}s", config.realtime.logout_grace_seconds);

    let hub = server.hub();
    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    let metrics = hub.metrics().snapshot();
    info!(frames_sent = metrics.frames_sent, "Serve command finished");
    output::print_item(&metrics, format);
    Ok(())
}
