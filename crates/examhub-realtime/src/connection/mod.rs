//! Status service connections: per-socket handles and the participant pool.

pub mod handle;
pub mod pool;

pub use handle::{ConnectionHandle, SocketSession};
pub use pool::ConnectionPool;
