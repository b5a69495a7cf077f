//! HTTP server for the bookkeeping engine.
//!
//! Reads its configuration directory from `BOOKS_CONFIG_DIR` (default
//! `./config/default`) and listens on `BOOKS_BIND_ADDR` (default
//! `0.0.0.0:3000`). Log filtering follows `RUST_LOG`.

use bookkeeping_engine::api::{AppState, create_router};
use bookkeeping_engine::config::ConfigLoader;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_DIR: &str = "./config/default";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_dir =
        std::env::var("BOOKS_CONFIG_DIR").unwrap_or_else(|_| DEFAULT_CONFIG_DIR.to_string());
    let bind_addr =
        std::env::var("BOOKS_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

    let config = ConfigLoader::load(&config_dir).inspect_err(|err| {
        tracing::error!(config_dir = %config_dir, error = %err, "Failed to load configuration");
    })?;
    tracing::info!(
        config_dir = %config_dir,
        name = %config.metadata().name,
        version = %config.metadata().version,
        deductions = config.deductions().len(),
        "Configuration loaded"
    );

    let app = create_router(AppState::new(config));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
