//! Connection state of a client session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// `Disconnected → Connecting → Connected → Disconnected`.
///
/// A failed connect attempt goes straight back to `Disconnected`; there is
/// no separate error state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No link.
    #[default]
    Disconnected,
    /// A link is being opened.
    Connecting,
    /// The link is open; `send` delivers.
    Connected,
}

impl ConnectionState {
    /// Converts to string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
