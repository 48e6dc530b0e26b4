pub mod api;
pub mod db;
pub mod entity;
pub mod error;
pub mod helpers;
mod migrations;
pub mod services;
pub mod state;
pub mod types;

use std::sync::Arc;

use state::AppState;
use types::Config;

/// Open the database, bind the listener and serve the API until Ctrl-C.
pub async fn run(config: Config) -> Result<(), String> {
    let bind_address = config.bind_address.clone();
    let state = AppState::open(config).map_err(|e| format!("Failed to open database: {e}"))?;
    let app = api::create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .map_err(|e| format!("Failed to bind {bind_address}: {e}"))?;
    log::info!("Listening on http://{bind_address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("Server error: {e}"))?;

    log::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
