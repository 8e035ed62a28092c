//! Connection handles.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::warn;

use examhub_core::types::{ConnectionId, Participant};

/// Per-socket state owned by the socket task.
///
/// A socket may exchange frames before it announces a participant; it only
/// enters the pool once a valid `connect` arrives.
#[derive(Debug)]
pub struct SocketSession {
    /// Connection id.
    pub id: ConnectionId,
    /// Outbound frame queue of this socket.
    pub sender: mpsc::Sender<String>,
    /// Participant announced on this socket, if any.
    pub participant: Option<Participant>,
}

impl SocketSession {
    /// Create a session for a freshly accepted socket.
    pub fn new(sender: mpsc::Sender<String>) -> Self {
        Self {
            id: ConnectionId::new(),
            sender,
            participant: None,
        }
    }

    /// Queue a frame for this socket only.
    pub fn reply(&self, frame: String) -> bool {
        self.sender.try_send(frame).is_ok()
    }
}

/// A registered participant connection.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Connection id (matches the owning [`SocketSession`]).
    pub id: ConnectionId,
    /// Participant behind the connection.
    pub participant: Participant,
    /// Client identity the page announced.
    pub client_id: String,
    /// Outbound frame queue.
    sender: mpsc::Sender<String>,
    /// When the participant announced itself.
    pub connected_at: DateTime<Utc>,
    /// Cleared once the socket's queue is gone.
    alive: AtomicBool,
}

impl ConnectionHandle {
    /// Create a handle sharing the socket's outbound queue.
    pub fn new(
        id: ConnectionId,
        participant: Participant,
        client_id: String,
        sender: mpsc::Sender<String>,
    ) -> Self {
        Self {
            id,
            participant,
            client_id,
            sender,
            connected_at: Utc::now(),
            alive: AtomicBool::new(true),
        }
    }

    /// Queue a frame. Returns `false` when it was dropped.
    pub fn send(&self, frame: String) -> bool {
        if !self.is_alive() {
            return false;
        }
        match self.sender.try_send(frame) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(conn_id = %self.id, "Connection send buffer full, dropping message");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.mark_dead();
                false
            }
        }
    }

    /// Check if connection is alive.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark connection as dead.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Whether the participant is an admin.
    pub fn is_admin(&self) -> bool {
        self.participant.is_admin()
    }
}
