use crate::upload::UploadError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use document_analyzer::{AnalyzerError, ErrorBody};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("No file uploaded")]
    MissingFile,

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    /// The LLM service refused the request; carries its error message.
    #[error("Failed to analyze document: {0}")]
    Upstream(String),

    #[error("Server error: {0}")]
    Internal(String),
}

impl From<AnalyzerError> for ApiError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::Upstream { detail, .. } => ApiError::Upstream(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Multipart(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                ApiError::PayloadTooLarge(e.body_text())
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::MethodNotAllowed => (StatusCode::METHOD_NOT_ALLOWED, error_body("Method not allowed")),
            ApiError::MissingFile => (StatusCode::BAD_REQUEST, error_body("No file uploaded")),
            ApiError::PayloadTooLarge(message) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    message: Some(message.clone()),
                    ..error_body("File too large")
                },
            ),
            ApiError::Upstream(detail) => {
                log::error!("Anthropic API error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        details: Some(detail.clone()),
                        ..error_body("Failed to analyze document")
                    },
                )
            }
            ApiError::Internal(message) => {
                log::error!("Server error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        message: Some(message.clone()),
                        ..error_body("Server error")
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

fn error_body(error: &str) -> ErrorBody {
    ErrorBody {
        error: error.to_string(),
        details: None,
        message: None,
    }
}
