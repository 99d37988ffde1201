use crate::error::ApiError;
use crate::upload::{self, StoredUpload};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    routing::{get, post},
    Json, Router,
};
use document_analyzer::{
    AnalysisService, AnalyzeResponse, Config, DocumentAnalysis, UploadedDocument,
};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
pub struct AppState {
    pub analysis_service: Arc<AnalysisService>,
    pub upload_dir: Arc<PathBuf>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config) -> document_analyzer::Result<Self> {
        Ok(Self {
            analysis_service: Arc::new(AnalysisService::from_config(config)?),
            upload_dir: Arc::new(config.upload_dir.clone()),
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route(
            "/api/analyze",
            post(analyze_document).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// `POST /api/analyze`: one `document` file plus an optional `fileName`.
pub async fn analyze_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        log::warn!("Rejected non-multipart upload: {}", rejection);
        ApiError::MissingFile
    })?;

    let form = upload::read_form(&mut multipart, &state.upload_dir).await?;
    let Some(stored) = form.document else {
        return Err(ApiError::MissingFile);
    };

    let file_name = form
        .file_name
        .filter(|name| !name.is_empty())
        .or_else(|| stored.original_name.clone())
        .unwrap_or_else(|| "document".to_string());

    match analyze_stored(&state, &stored, &file_name).await {
        Ok(analysis) => {
            stored.remove().await;
            Ok(Json(AnalyzeResponse {
                success: true,
                analysis,
                file_name,
                file_type: stored.mime_type,
            }))
        }
        Err(e) => {
            // only the success path deletes the spooled upload
            log::warn!(
                "Analysis of {} failed, upload retained at {}",
                file_name,
                stored.path.display()
            );
            Err(e)
        }
    }
}

async fn analyze_stored(
    state: &AppState,
    stored: &StoredUpload,
    file_name: &str,
) -> Result<DocumentAnalysis, ApiError> {
    let bytes = tokio::fs::read(&stored.path)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let document = UploadedDocument::new(file_name, stored.mime_type.clone(), bytes);

    Ok(state.analysis_service.analyze(&document).await?)
}
