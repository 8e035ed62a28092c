//! WebSocket transport over `tokio-tungstenite`.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use examhub_core::error::{AppError, ErrorKind};

use super::{Connector, Link};

/// Connects to the status service over `ws://` or `wss://`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn open(&self, endpoint: &str, buffer: usize) -> Result<Link, AppError> {
        let (ws, _) = connect_async(endpoint).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Connection,
                format!("WebSocket connect to {endpoint} failed: {e}"),
                e,
            )
        })?;

        let (mut sink, mut stream) = ws.split();
        let buffer = buffer.max(1);
        let (out_tx, mut out_rx) = mpsc::channel::<String>(buffer);
        let (in_tx, in_rx) = mpsc::channel::<String>(buffer);

        let writer = tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                if let Err(e) = sink.send(Message::Text(frame.into())).await {
                    debug!(error = %e, "WebSocket write failed");
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(result) = stream.next().await {
                match result {
                    Ok(Message::Text(text)) => {
                        if in_tx.send(text.as_str().to_owned()).await.is_err() {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "WebSocket read failed");
                        break;
                    }
                }
            }
            debug!("WebSocket reader finished");
        });

        Ok(Link {
            outbound: out_tx,
            inbound: in_rx,
            writer: Some(writer),
        })
    }
}
