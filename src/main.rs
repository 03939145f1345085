use anyhow::Result;
use std::sync::Arc;

mod config;
mod error;
mod logging;
mod models;
mod routes;
mod services;

use services::dataset_store::DatasetStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    logging::init_logging()?;

    // Load configuration
    let config = config::Config::new()?;
    let addr = config.bind_addr;

    // Build our application state
    let state = Arc::new(AppState::new(config));

    let app = routes::router(state);

    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// Application state
pub struct AppState {
    config: config::Config,
    store: DatasetStore,
}

impl AppState {
    fn new(config: config::Config) -> Self {
        let store = DatasetStore::new(config.dataset_cache_capacity);
        Self { config, store }
    }
}
