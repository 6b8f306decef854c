use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Importer failures, one variant per stage of the pipeline. `Display`
/// yields the exact message shown to the end user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportError {
    /// File extension outside the accepted set, detected before any parsing.
    #[error("Unsupported file format. Please upload a CSV, JSON, or SQL file.")]
    UnsupportedFormat,
    /// Recognized format whose content does not satisfy its minimum shape.
    #[error("{0}")]
    Structural(&'static str),
    /// Decoding or engine execution failed; the underlying cause is
    /// collapsed to a single format-specific message.
    #[error("{0}")]
    ParseFailure(&'static str),
    /// The file bytes could not be read or staged at all.
    #[error("Failed to read the file.")]
    IoFailure,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("HTTP Error: {0}")]
    HttpError(String),
    #[error("{0}")]
    Import(#[from] ImportError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::IoError(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            AppError::HttpError(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Import(err) => {
                let status = match err {
                    ImportError::IoFailure => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::BAD_REQUEST,
                };
                (status, err.to_string())
            }
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
