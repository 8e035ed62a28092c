//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use examhub_core::config::{AppConfig, ClientConfig};
use examhub_core::result::AppResult;
use examhub_realtime::{RealtimeHub, RealtimeServer};

/// Raw WebSocket used to drive the service without the client.
pub type RawSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A status service running on an ephemeral port.
pub struct TestServer {
    /// Bound address.
    pub addr: SocketAddr,
    /// Hub behind the server.
    pub hub: Arc<RealtimeHub>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<AppResult<()>>>,
}

impl TestServer {
    /// Start a server with the given logout grace period.
    pub async fn start(logout_grace_seconds: u64) -> Self {
        let mut config = AppConfig::default();
        config.server.port = 0;
        config.realtime.logout_grace_seconds = logout_grace_seconds;

        let server = RealtimeServer::bind(&config).await.expect("bind server");
        let addr = server.local_addr().expect("local addr");
        let hub = server.hub();
        let (tx, rx) = oneshot::channel();
        let task = tokio::spawn(server.run(async {
            let _ = rx.await;
        }));

        Self {
            addr,
            hub,
            shutdown: Some(tx),
            task: Some(task),
        }
    }

    /// WebSocket URL of the `/ws` route.
    pub fn endpoint(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Client configuration pointing at this server.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint(),
            ..ClientConfig::default()
        }
    }

    /// Stop the server and wait for it to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), task).await;
        }
    }
}

/// Poll `check` until it holds, panicking after five seconds.
pub async fn eventually<F: Fn() -> bool>(what: &str, check: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while tokio::time::Instant::now() < deadline {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("timed out waiting for: {what}");
}

/// Open a raw socket.
pub async fn connect_raw(url: &str) -> RawSocket {
    let (socket, _) = connect_async(url).await.expect("raw connect");
    socket
}

/// Send a text frame as-is.
pub async fn send_text(socket: &mut RawSocket, text: &str) {
    socket
        .send(Message::Text(text.into()))
        .await
        .expect("send frame");
}

/// Send a JSON frame.
pub async fn send_json(socket: &mut RawSocket, value: Value) {
    send_text(socket, &value.to_string()).await;
}

/// Next JSON text frame, or `None` after `wait` without one.
pub async fn next_json_within(socket: &mut RawSocket, wait: Duration) -> Option<Value> {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
        match tokio::time::timeout(remaining, socket.next()).await {
            Ok(Some(Ok(Message::Text(text)))) => {
                return Some(serde_json::from_str(text.as_str()).expect("json frame"));
            }
            Ok(Some(Ok(_))) => continue,
            Ok(Some(Err(_))) | Ok(None) | Err(_) => return None,
        }
    }
}

/// Next JSON text frame, panicking after five seconds.
pub async fn next_json(socket: &mut RawSocket) -> Value {
    next_json_within(socket, Duration::from_secs(5))
        .await
        .expect("expected a frame")
}

/// Read frames until one of type `kind` arrives.
pub async fn next_of_type(socket: &mut RawSocket, kind: &str) -> Value {
    loop {
        let frame = next_json(socket).await;
        if frame["type"] == kind {
            return frame;
        }
    }
}
