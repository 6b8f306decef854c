use axum::{extract::State, http::Method, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::AppError,
    models::ImportResult,
    services::{fetch, importer},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/upload/analyze", post(analyze_upload))
        .layer(cors)
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    file_name: String,
    signed_url: String,
}

#[axum::debug_handler]
async fn analyze_upload(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<ImportResult>, AppError> {
    let start = std::time::Instant::now();
    tracing::info!("Starting import for file: {}", request.file_name);

    let download_start = std::time::Instant::now();
    let file_data = fetch::load_file_from_url(&request.signed_url).await?;
    tracing::info!(
        "File downloaded, size: {}KB, took: {:?}",
        file_data.len() / 1024,
        download_start.elapsed()
    );

    if file_data.len() > state.config.max_file_size {
        tracing::error!("File exceeds maximum size: {} bytes", file_data.len());
        return Err(AppError::InvalidInput(format!(
            "File exceeds the maximum allowed size of {} bytes",
            state.config.max_file_size
        )));
    }

    let result = importer::parse_file(&request.file_name, &file_data)?;
    tracing::info!(
        "Import completed in {:?}: table '{}', {} columns, {} rows",
        start.elapsed(),
        result.schema.table_name,
        result.schema.columns.len(),
        result.data.len()
    );

    Ok(Json(result))
}
