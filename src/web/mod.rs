//! HTTP and WebSocket gateway.
//!
//! Routes:
//! - `POST /info`        - metadata and formats for a URL
//! - `POST /download`    - download a format, respond with the file
//! - `GET  /ws/download` - streaming download channel with progress
//! - `GET  /health`      - health check

pub mod handlers;
pub mod stream;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::download::DownloadService;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<DownloadService>,
}

/// Build the router with permissive CORS (any origin).
pub fn create_router(service: Arc<DownloadService>) -> Router {
    let state = AppState { service };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/info", post(handlers::handle_info))
        .route("/download", post(handlers::handle_download))
        .route("/ws/download", get(stream::handle_stream))
        .route("/health", get(handlers::handle_health))
        .layer(cors)
        .with_state(state)
}

/// Start the web server and serve until the listener fails.
pub async fn start_web_server(port: u16, service: Arc<DownloadService>) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = create_router(service);

    log::info!("Starting web server on http://{}", addr);
    log::info!("  POST /info        - Media metadata (JSON)");
    log::info!("  POST /download    - Download a format (file)");
    log::info!("  GET  /ws/download - Streaming download (WebSocket)");
    log::info!("  GET  /health      - Health check");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
