use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::api::{health_check, list_logs, AppState};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/logs", get(list_logs))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the log API until Ctrl+C
pub async fn run_server(state: AppState, listen_addr: SocketAddr) -> Result<(), std::io::Error> {
    let app = create_router(state);

    let listener = TcpListener::bind(listen_addr).await?;
    info!(addr = %listen_addr, "Log API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Log API shutting down gracefully");
        })
        .await
}
