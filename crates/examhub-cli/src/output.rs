//! Table and JSON output formatting for CLI commands.

use serde::Serialize;
use tabled::{Table, Tabled};

use examhub_realtime::client::panel::{DisplayTarget, NotificationEntry, StatsView};

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    #[default]
    Table,
    /// JSON output
    Json,
}

/// One dashboard counter row.
#[derive(Debug, Serialize, Tabled)]
struct CounterRow {
    #[tabled(rename = "Target")]
    target: &'static str,
    #[tabled(rename = "Value")]
    value: u64,
}

/// Print a single item in the selected format
pub fn print_item<T: Serialize + std::fmt::Debug>(item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("{:#?}", item);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(item).unwrap_or_else(|_| "{}".to_string());
            println!("{}", json);
        }
    }
}

/// Print the dashboard counters
pub fn print_stats(stats: &StatsView, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            let rows: Vec<CounterRow> = DisplayTarget::ALL
                .iter()
                .map(|target| CounterRow {
                    target: target.element_id(),
                    value: stats.get(*target),
                })
                .collect();
            println!("{}", Table::new(rows));
        }
        OutputFormat::Json => {
            let json = serde_json::json!({ "type": "stats_update", "stats": stats });
            println!("{}", json);
        }
    }
}

/// Print one notification feed entry
pub fn print_notification(entry: &NotificationEntry, format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            println!("[{}] {}: {}", entry.display_time(), entry.title, entry.message);
        }
        OutputFormat::Json => {
            let json = serde_json::json!({ "type": "admin_notification", "notification": entry });
            println!("{}", json);
        }
    }
}

/// Print a success message
pub fn print_success(msg: &str) {
    println!("✓ {}", msg);
}

/// Print a warning message
pub fn print_warning(msg: &str) {
    println!("⚠ {}", msg);
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:<24} {}", format!("{}:", key), value);
}
