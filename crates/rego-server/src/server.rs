//! HTTP server
//!
//! Builds the router and runs it until Ctrl-C.

use axum::routing::get;
use axum::Router;
use rego_core::AppConfig;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::handlers::{health, lookup};
use crate::state::AppState;

/// Create the router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(lookup))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config);
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
