//! Send a single participant event, as a page would.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use examhub_core::error::AppError;
use examhub_realtime::RealtimeClient;

use super::KindArg;

/// Arguments for the emit command
#[derive(Debug, Args)]
pub struct EmitArgs {
    /// Participant id to connect as; also the student id of exam events
    #[arg(long)]
    pub user_id: String,

    /// Participant kind
    #[arg(long, value_enum, default_value = "student")]
    pub kind: KindArg,

    /// Override the status service endpoint
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Event to send
    #[command(subcommand)]
    pub event: EmitEvent,
}

/// Events that can be emitted
#[derive(Debug, Subcommand)]
pub enum EmitEvent {
    /// Open an exam
    Join {
        /// Exam id
        #[arg(long)]
        exam_id: String,
    },
    /// Report the question on screen
    Progress {
        /// Exam id
        #[arg(long)]
        exam_id: String,
        /// Current question index
        #[arg(long)]
        question: u32,
    },
    /// Submit an exam
    Submit {
        /// Exam id
        #[arg(long)]
        exam_id: String,
        /// Final score
        #[arg(long, default_value_t = 0.0)]
        score: f64,
    },
    /// Sign out
    Logout,
}

impl EmitEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join_exam",
            Self::Progress { .. } => "exam_progress",
            Self::Submit { .. } => "submit_exam",
            Self::Logout => "user_logout",
        }
    }
}

/// Execute the emit command
pub async fn execute(
    args: &EmitArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let mut config = super::load_config(config_path)?;
    if let Some(ref endpoint) = args.endpoint {
        config.client.endpoint = endpoint.clone();
    }

    let client = RealtimeClient::websocket(config.client);
    client.connect(args.user_id.as_str(), args.kind.into()).await?;

    let user_id = args.user_id.as_str();
    let queued = match &args.event {
        EmitEvent::Join { exam_id } => client.join_exam(exam_id.as_str(), user_id),
        EmitEvent::Progress { exam_id, question } => {
            client.update_exam_progress(exam_id.as_str(), user_id, *question)
        }
        EmitEvent::Submit { exam_id, score } => {
            client.submit_exam(exam_id.as_str(), user_id, *score)
        }
        EmitEvent::Logout => client.logout(user_id),
    };

    client.shutdown().await;

    if !queued {
        return Err(AppError::connection(format!(
            "Failed to queue {} event",
            args.event.name()
        )));
    }

    match format {
        OutputFormat::Table => {
            output::print_success(&format!("Sent {} as {}", args.event.name(), user_id));
        }
        OutputFormat::Json => output::print_item(
            &serde_json::json!({ "sent": args.event.name(), "user_id": user_id }),
            format,
        ),
    }
    Ok(())
}
