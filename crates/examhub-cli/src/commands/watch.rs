//! Watch the admin dashboard feed from the terminal.

use std::time::Duration;

use clap::Args;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use crate::output::{self, OutputFormat};
use examhub_core::error::AppError;
use examhub_realtime::RealtimeClient;
use examhub_realtime::client::panel::PanelUpdate;

use super::KindArg;

/// Arguments for the watch command
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Participant id to connect as
    #[arg(long)]
    pub user_id: String,

    /// Participant kind; only admins receive dashboard updates
    #[arg(long, value_enum, default_value = "admin")]
    pub kind: KindArg,

    /// Override the status service endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Print the notification feed as HTML cards on exit
    #[arg(long)]
    pub html: bool,
}

/// Execute the watch command
pub async fn execute(
    args: &WatchArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;
    if let Some(ref endpoint) = args.endpoint {
        config.client.endpoint = endpoint.clone();
    }

    let client = RealtimeClient::websocket(config.client);
    let mut updates = client.panel().subscribe();
    client.connect(args.user_id.as_str(), args.kind.into()).await?;

    output::print_success(&format!(
        "Watching {} (Ctrl+C to stop)",
        client.endpoint()
    ));

    let mut liveness = tokio::time::interval(Duration::from_secs(1));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = liveness.tick() => {
                if !client.is_connected() {
                    output::print_warning("Connection closed by the status service");
                    break;
                }
            }
            update = updates.recv() => match update {
                Ok(PanelUpdate::Stats(stats)) => output::print_stats(&stats, format),
                Ok(PanelUpdate::Notification(entry)) => output::print_notification(&entry, format),
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "Watch output fell behind the panel");
                    output::print_warning(&format!("Skipped {skipped} updates"));
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    if args.html {
        for card in client.panel().render_feed() {
            println!("{card}");
        }
    }

    client.shutdown().await;
    Ok(())
}
