use bytes::{Bytes, BytesMut};
use rayon::prelude::*;
use reqwest::Client;
use std::path::Path;

use crate::error::AppError;
use crate::models::{CsvData, Record};
use crate::services::analysis::parser::parse_csv;
use crate::services::analysis::types::{ColumnSummary, RelatedColumns};
use crate::services::analysis::{analyze_column, find_related_columns};

pub const PRESET_ID: &str = "preset-environmental-data";
pub const PRESET_FILENAME: &str = "Global Environmental Indicators";

/// Summarises every column, in header order, then pairs related columns.
pub fn analyze_records(
    headers: &[String],
    records: &[Record],
) -> (Vec<ColumnSummary>, Vec<RelatedColumns>) {
    let summary: Vec<ColumnSummary> = headers
        .par_iter()
        .map(|header| analyze_column(records, header))
        .collect();
    let related_columns = find_related_columns(headers, &summary, records);
    (summary, related_columns)
}

pub fn process_csv_bytes(filename: &str, file_data: &[u8]) -> Result<CsvData, AppError> {
    let start = std::time::Instant::now();
    tracing::info!("Processing CSV file {} ({} bytes)", filename, file_data.len());

    let text = std::str::from_utf8(file_data)
        .map_err(|e| AppError::FileProcessingError(format!("File is not valid UTF-8: {}", e)))?;
    let data = build_dataset(new_dataset_id(), filename, text)?;

    tracing::info!(
        "Analysed {} in {:?}: {} rows, {} columns, {} related pairs",
        filename,
        start.elapsed(),
        data.records.len(),
        data.headers.len(),
        data.related_columns.len()
    );
    Ok(data)
}

/// Downloads a remote CSV, refusing bodies over `max_bytes` without buffering them.
pub async fn load_file_from_url(url: &str, max_bytes: usize) -> Result<Bytes, AppError> {
    let client = Client::new();
    let mut response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(AppError::HttpError(format!(
            "Failed to fetch file. Status: {}",
            response.status()
        )));
    }

    let too_large = || {
        AppError::PayloadTooLarge(format!("Remote file exceeds the limit of {} bytes", max_bytes))
    };
    if response.content_length().is_some_and(|len| len > max_bytes as u64) {
        return Err(too_large());
    }

    let mut body = BytesMut::new();
    while let Some(chunk) = response.chunk().await? {
        if body.len() + chunk.len() > max_bytes {
            return Err(too_large());
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// The bundled sample dataset shown before anything is uploaded.
pub async fn load_preset(path: &Path) -> Result<CsvData, AppError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        tracing::error!("Error loading preset data from {}: {}", path.display(), e);
        e
    })?;
    build_dataset(PRESET_ID.to_string(), PRESET_FILENAME, &text)
}

fn build_dataset(id: String, filename: &str, text: &str) -> Result<CsvData, AppError> {
    let parsed = parse_csv(text)?;
    let (summary, related_columns) = analyze_records(&parsed.headers, &parsed.records);
    Ok(CsvData {
        id,
        filename: filename.to_string(),
        headers: parsed.headers,
        records: parsed.records,
        summary,
        related_columns,
    })
}

fn new_dataset_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(13);
    id
}
