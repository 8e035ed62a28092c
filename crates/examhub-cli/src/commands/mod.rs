//! CLI command definitions and dispatch.

pub mod config;
pub mod emit;
pub mod serve;
pub mod watch;

use clap::{Parser, Subcommand, ValueEnum};

use crate::output::OutputFormat;
use examhub_core::config::AppConfig;
use examhub_core::error::AppError;
use examhub_core::types::ParticipantKind;

/// ExamHub real-time exam status service
#[derive(Debug, Parser)]
#[command(name = "examhub", version, about, long_about = None)]
pub struct Cli {
    /// Extra configuration file, layered over `config/default` and `config/{EXAMHUB_ENV}`
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the status service
    Serve(serve::ServeArgs),
    /// Connect as a participant and print dashboard updates
    Watch(watch::WatchArgs),
    /// Connect as a participant and send one event
    Emit(emit::EmitArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config_path = self.config.as_deref();
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config_path, self.format).await,
            Commands::Watch(args) => watch::execute(args, config_path, self.format).await,
            Commands::Emit(args) => emit::execute(args, config_path, self.format).await,
            Commands::Config(args) => config::execute(args, config_path, self.format).await,
        }
    }
}

/// Participant kind flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    /// Dashboard operator
    Admin,
    /// Exam taker
    Student,
}

impl From<KindArg> for ParticipantKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Admin => ParticipantKind::Admin,
            KindArg::Student => ParticipantKind::Student,
        }
    }
}

/// Helper: load configuration for the current `EXAMHUB_ENV`
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, AppError> {
    let env = std::env::var("EXAMHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env, config_path)
}
