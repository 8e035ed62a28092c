//! Client transports.
//!
//! A [`Connector`] opens one persistent, bidirectional text-frame link.
//! The client never sees sockets directly: it pushes frames into
//! [`Link::outbound`] and pulls frames from [`Link::inbound`]. The inbound
//! side ends when the peer goes away.

pub mod memory;
pub mod websocket;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use examhub_core::error::AppError;

pub use memory::{MemoryConnector, MemoryPeer};
pub use websocket::WsConnector;

/// An open link to the status service.
#[derive(Debug)]
pub struct Link {
    /// Frames to send. Dropping every sender closes the link.
    pub outbound: mpsc::Sender<String>,
    /// Frames received, in arrival order.
    pub inbound: mpsc::Receiver<String>,
    /// Task that drains `outbound`; completes once queued frames are flushed.
    pub writer: Option<JoinHandle<()>>,
}

/// Opens links to an endpoint.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a link. `buffer` bounds both frame queues; 0 is treated as 1.
    async fn open(&self, endpoint: &str, buffer: usize) -> Result<Link, AppError>;
}
