//! WebSocket upgrade handler.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::WebSocketUpgrade;
use axum::extract::ws::{Message, WebSocket};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::hub::RealtimeHub;

/// GET / and GET /ws: WebSocket upgrade
pub(super) async fn ws_handler(
    State(hub): State<Arc<RealtimeHub>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(hub, socket))
}

/// Handles an established WebSocket connection.
async fn handle_socket(hub: Arc<RealtimeHub>, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (mut session, mut outbound_rx) = hub.open_socket();
    let mut shutdown = hub.shutdown_receiver();
    let conn_id = session.id;

    info!(conn_id = %conn_id, "WebSocket connection established");

    // Outbound forwarder; ends once every sender for this socket is dropped.
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    loop {
        tokio::select! {
            _ = shutdown.recv() => break,
            next = ws_rx.next() => match next {
                Some(Ok(Message::Text(text))) => hub.handle_frame(&mut session, text.as_str()),
                Some(Ok(Message::Binary(_))) => {
                    debug!(conn_id = %conn_id, "Ignoring binary frame");
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
        }
    }

    let participant = session.participant.clone();
    hub.close_socket(session);
    let _ = writer.await;

    info!(
        conn_id = %conn_id,
        participant = ?participant.map(|p| p.client_id()),
        "WebSocket connection closed"
    );
}
