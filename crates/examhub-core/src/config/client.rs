//! Real-time client configuration.

use serde::{Deserialize, Serialize};

/// Settings for the browser-facing real-time client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// WebSocket URL of the status service.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Maximum entries kept in the admin notification feed.
    #[serde(default = "default_notification_capacity")]
    pub notification_capacity: usize,
    /// Outbound frame queue size.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer_size: usize,
    /// How long `shutdown` waits for queued frames to flush, in milliseconds.
    #[serde(default = "default_flush_timeout")]
    pub flush_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            notification_capacity: default_notification_capacity(),
            outbound_buffer_size: default_outbound_buffer(),
            flush_timeout_ms: default_flush_timeout(),
        }
    }
}

fn default_endpoint() -> String {
    "ws://localhost:8765".to_string()
}

fn default_notification_capacity() -> usize {
    10
}

fn default_outbound_buffer() -> usize {
    64
}

fn default_flush_timeout() -> u64 {
    2_000
}
