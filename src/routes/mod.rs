use axum::{extract::DefaultBodyLimit, routing::get, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod datasets;

// JSON escaping can grow a CSV body well past its raw size
const BODY_LIMIT_FACTOR: usize = 2;

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_file_size * BODY_LIMIT_FACTOR;

    Router::new()
        .route("/health", get(health_check))
        .merge(datasets::routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
