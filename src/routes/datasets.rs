use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use bytes::Bytes;
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::AppError,
    models::{CsvData, DatasetInfo},
    services::{
        analysis::{
            dashboard::{plan_dashboard, relation_series, DashboardPlan, SeriesPoint},
            types::{ChartType, ColumnSummary},
            utils::is_csv_filename,
        },
        file_processor,
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/datasets", post(upload_dataset).get(list_datasets))
        .route("/datasets/preset", get(preset_dataset))
        .route("/datasets/:id", get(get_dataset).delete(delete_dataset))
        .route("/datasets/:id/dashboard", get(dashboard))
        .route("/datasets/:id/relations/:index/series", get(relation_points))
        .route("/datasets/:id/columns/:name", patch(override_chart))
        .layer(cors)
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    filename: String,
    content: Option<String>,
    signed_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartOverride {
    chart: ChartType,
}

async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<Arc<CsvData>>, AppError> {
    tracing::info!("Received upload for {}", request.filename);

    if !is_csv_filename(&request.filename) {
        tracing::error!("Unsupported file: {}", request.filename);
        return Err(AppError::InvalidInput("Please upload CSV files only".to_string()));
    }

    let file_data = match (request.content, request.signed_url) {
        (Some(content), None) => Bytes::from(content),
        (None, Some(url)) => {
            tracing::info!("Downloading file from URL...");
            let download_start = std::time::Instant::now();
            let data =
                file_processor::load_file_from_url(&url, state.config.max_file_size).await?;
            tracing::info!(
                "File downloaded, size: {}KB, took: {:?}",
                data.len() / 1024,
                download_start.elapsed()
            );
            data
        }
        _ => {
            return Err(AppError::InvalidInput(
                "Provide exactly one of content or signed_url".to_string(),
            ))
        }
    };

    if file_data.len() > state.config.max_file_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File is {} bytes, the limit is {} bytes",
            file_data.len(),
            state.config.max_file_size
        )));
    }

    let data = file_processor::process_csv_bytes(&request.filename, &file_data)?;
    Ok(Json(state.store.insert(data)))
}

async fn list_datasets(State(state): State<Arc<AppState>>) -> Json<Vec<DatasetInfo>> {
    Json(state.store.list())
}

async fn preset_dataset(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Arc<CsvData>>, AppError> {
    let data = file_processor::load_preset(&state.config.preset_data_path).await?;
    Ok(Json(state.store.insert(data)))
}

async fn get_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Arc<CsvData>>, AppError> {
    Ok(Json(state.store.get(&id)?))
}

async fn delete_dataset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn dashboard(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DashboardPlan>, AppError> {
    let data = state.store.get(&id)?;
    Ok(Json(plan_dashboard(&data)))
}

async fn relation_points(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<Vec<SeriesPoint>>, AppError> {
    let data = state.store.get(&id)?;
    let related = data
        .related_columns
        .get(index)
        .ok_or_else(|| AppError::NotFound(format!("Relation {} not found in dataset {}", index, id)))?;
    let y_axis = related
        .y_axis
        .first()
        .ok_or_else(|| AppError::Internal(format!("Relation {} has no y-axis", index)))?;

    Ok(Json(relation_series(&data.records, &related.x_axis, y_axis)))
}

async fn override_chart(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(String, String)>,
    Json(request): Json<ChartOverride>,
) -> Result<Json<ColumnSummary>, AppError> {
    Ok(Json(state.store.override_chart(&id, &name, request.chart)?))
}
