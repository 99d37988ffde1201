use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("configuration error: {0}")]
    Config(String),

    /// The LLM service answered with a non-success status.
    #[error("LLM API error ({status}): {detail}")]
    Upstream { status: u16, detail: String },

    #[error("LLM response contained no text content")]
    EmptyResponse,

    /// The analysis endpoint rejected a client upload.
    #[error("{message}")]
    Endpoint { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
