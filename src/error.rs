use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("File processing error: {0}")]
    FileProcessingError(String),
    #[error("HTTP Error: {0}")]
    HttpError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<csv::Error> for AppError {
    fn from(err: csv::Error) -> Self {
        AppError::ParseError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::HttpError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) | AppError::ParseError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::HttpError(_) => StatusCode::BAD_GATEWAY,
            AppError::FileProcessingError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::IoError(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let message = match self {
            AppError::InvalidInput(msg)
            | AppError::NotFound(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::ParseError(msg)
            | AppError::FileProcessingError(msg)
            | AppError::HttpError(msg)
            | AppError::Internal(msg) => msg,
            AppError::IoError(err) => err.to_string(),
        };

        if status.is_server_error() {
            tracing::error!("{}", message);
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
