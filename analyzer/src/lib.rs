pub mod analysis_service;
pub mod claude_service;
pub mod config;
pub mod document_processor;
pub mod error;
pub mod models;
pub mod reply;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use analysis_service::AnalysisService;
pub use claude_service::ClaudeService;
pub use config::Config;
pub use document_processor::DocumentProcessor;
pub use error::{AnalyzerError, Result};
pub use models::*;
pub use session::{AnalysisSession, DocumentAnalyzer, HttpAnalyzer};
