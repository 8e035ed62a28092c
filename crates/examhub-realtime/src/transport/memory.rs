//! In-memory transport for tests and in-process embedding.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use examhub_core::error::AppError;

use super::{Connector, Link};

/// Connector whose links end in a [`MemoryPeer`] held by the caller.
#[derive(Debug, Default)]
pub struct MemoryConnector {
    /// Number of `open` calls, including refused ones.
    opens: AtomicUsize,
    /// When set, `open` fails.
    refuse: AtomicBool,
    /// Peers of opened links, oldest first.
    peers: Mutex<Vec<MemoryPeer>>,
}

/// The far end of a memory link.
#[derive(Debug)]
pub struct MemoryPeer {
    /// Endpoint the link was opened for.
    pub endpoint: String,
    /// Frames the client sent.
    pub sent: mpsc::Receiver<String>,
    /// Push frames to the client. Dropping it ends the link.
    pub inbound: mpsc::Sender<String>,
}

impl MemoryConnector {
    /// Create a connector that accepts every connection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `open` calls fail (or succeed again).
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    /// Number of `open` attempts so far.
    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    /// Take the most recently opened peer.
    pub fn take_peer(&self) -> Option<MemoryPeer> {
        self.peers.lock().unwrap_or_else(|e| e.into_inner()).pop()
    }
}

impl MemoryPeer {
    /// Collect every frame sent so far without waiting.
    pub fn drain(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Ok(frame) = self.sent.try_recv() {
            frames.push(frame);
        }
        frames
    }

    /// Whether the client side has closed its sending half.
    pub fn is_closed(&self) -> bool {
        self.sent.is_closed()
    }
}

#[async_trait]
impl Connector for MemoryConnector {
    async fn open(&self, endpoint: &str, buffer: usize) -> Result<Link, AppError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.refuse.load(Ordering::SeqCst) {
            return Err(AppError::connection(format!(
                "Connection to {endpoint} refused"
            )));
        }

        let buffer = buffer.max(1);
        let (out_tx, out_rx) = mpsc::channel(buffer);
        let (in_tx, in_rx) = mpsc::channel(buffer);

        self.peers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(MemoryPeer {
                endpoint: endpoint.to_string(),
                sent: out_rx,
                inbound: in_tx,
            });

        Ok(Link {
            outbound: out_tx,
            inbound: in_rx,
            writer: None,
        })
    }
}
