//! Status service counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Hub-level metrics counters.
#[derive(Debug, Default)]
pub struct HubMetrics {
    /// Sockets accepted.
    pub sockets_opened: AtomicU64,
    /// Sockets closed.
    pub sockets_closed: AtomicU64,
    /// Frames decoded and dispatched.
    pub frames_received: AtomicU64,
    /// Frames rejected as oversized, empty or malformed.
    pub frames_rejected: AtomicU64,
    /// Frames queued to sockets.
    pub frames_sent: AtomicU64,
}

impl HubMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn socket_opened(&self) {
        self.sockets_opened.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn socket_closed(&self) {
        self.sockets_closed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_received(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frame_rejected(&self) {
        self.frames_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn frames_sent(&self, count: u64) {
        self.frames_sent.fetch_add(count, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sockets_opened: self.sockets_opened.load(Ordering::Relaxed),
            sockets_closed: self.sockets_closed.load(Ordering::Relaxed),
            frames_received: self.frames_received.load(Ordering::Relaxed),
            frames_rejected: self.frames_rejected.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
        }
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Sockets accepted.
    pub sockets_opened: u64,
    /// Sockets closed.
    pub sockets_closed: u64,
    /// Frames decoded and dispatched.
    pub frames_received: u64,
    /// Frames rejected.
    pub frames_rejected: u64,
    /// Frames queued to sockets.
    pub frames_sent: u64,
}
