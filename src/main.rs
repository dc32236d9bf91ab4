use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use catalog_advisor::core::config::{AppPaths, ConfigService};
use catalog_advisor::core::logging;
use catalog_advisor::server;
use catalog_advisor::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    // A broken config is reported by `AppState::initialize` once logging is up.
    let logging_config = ConfigService::new(paths.clone())
        .load_settings()
        .map(|settings| settings.logging)
        .unwrap_or_default();
    logging::init(&paths, &logging_config);

    let state = AppState::initialize(paths).context("Failed to initialize application state")?;

    let bind_addr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    );
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
