//! Real-time status service configuration.

use serde::{Deserialize, Serialize};

/// Server-side real-time engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Per-connection outbound queue size.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Seconds to wait after a disconnect before announcing a logout.
    #[serde(default = "default_logout_grace")]
    pub logout_grace_seconds: u64,
    /// Largest accepted inbound frame in bytes.
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            channel_buffer_size: default_channel_buffer(),
            logout_grace_seconds: default_logout_grace(),
            max_message_bytes: default_max_message_bytes(),
        }
    }
}

fn default_channel_buffer() -> usize {
    256
}

fn default_logout_grace() -> u64 {
    10
}

fn default_max_message_bytes() -> usize {
    65_536
}
