//! # examhub-realtime
//!
//! Real-time layer for the ExamHub dashboards. Provides:
//!
//! - The typed JSON wire protocol shared by clients and the status service
//! - [`RealtimeClient`]: one persistent connection per page, typed outbound
//!   events, and an in-process [`AdminPanel`] updated from inbound events
//! - Pluggable transports (WebSocket and in-memory)
//! - The status service: connection pool, login presence with a logout
//!   grace period, exam session tracking, and admin broadcast

pub mod client;
pub mod connection;
pub mod exam;
pub mod hub;
pub mod message;
pub mod metrics;
pub mod presence;
pub mod server;
pub mod transport;

pub use client::panel::AdminPanel;
pub use client::session::RealtimeClient;
pub use hub::RealtimeHub;
pub use server::RealtimeServer;
pub use transport::{Connector, Link};
