//! Rego Check HTTP service
//!
//! Thin shell over the lookup engine: loads configuration, sets up
//! logging, and serves `GET /?rego=<plate>`.

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{router, start_server};
pub use state::AppState;

use anyhow::Context;
use rego_core::AppConfig;
use tracing::info;

/// Initialize tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,rego=debug"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Load configuration and serve until shutdown.
pub async fn run() -> anyhow::Result<()> {
    init_tracing();

    info!("Starting rego-check v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_with_env().context("failed to load configuration")?;
    start_server(config).await
}
