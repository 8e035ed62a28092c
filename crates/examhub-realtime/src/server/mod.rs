//! Status service WebSocket server.

mod handler;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use examhub_core::config::AppConfig;
use examhub_core::error::{AppError, ErrorKind};
use examhub_core::result::AppResult;

use crate::hub::RealtimeHub;

/// Build the router: WebSocket upgrades on `/` and `/ws`.
pub fn router(hub: Arc<RealtimeHub>) -> Router {
    Router::new()
        .route("/", get(handler::ws_handler))
        .route("/ws", get(handler::ws_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(hub)
}

/// A bound status service, ready to run.
#[derive(Debug)]
pub struct RealtimeServer {
    hub: Arc<RealtimeHub>,
    listener: TcpListener,
}

impl RealtimeServer {
    /// Bind the listener on `server.host:server.port`.
    pub async fn bind(config: &AppConfig) -> AppResult<Self> {
        let addr = config.server.bind_addr();
        let listener = TcpListener::bind(&addr).await.map_err(|e| {
            AppError::with_source(ErrorKind::Io, format!("Failed to bind {addr}"), e)
        })?;
        Ok(Self {
            hub: Arc::new(RealtimeHub::new(config.realtime.clone())),
            listener,
        })
    }

    /// Address actually bound (useful with port 0).
    pub fn local_addr(&self) -> AppResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// The hub behind this server.
    pub fn hub(&self) -> Arc<RealtimeHub> {
        Arc::clone(&self.hub)
    }

    /// Serve until `shutdown` resolves, then close every connection.
    pub async fn run<F>(self, shutdown: F) -> AppResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr()?;
        let hub = Arc::clone(&self.hub);
        let metrics_hub = Arc::clone(&self.hub);
        let app = router(self.hub);

        info!(addr = %addr, "Status service listening");

        axum::serve(self.listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                info!("Shutdown signal received, closing connections");
                hub.close_all();
            })
            .await
            .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

        let metrics = metrics_hub.metrics().snapshot();
        info!(
            sockets_opened = metrics.sockets_opened,
            sockets_closed = metrics.sockets_closed,
            frames_received = metrics.frames_received,
            frames_rejected = metrics.frames_rejected,
            frames_sent = metrics.frames_sent,
            "Status service stopped"
        );
        Ok(())
    }
}
