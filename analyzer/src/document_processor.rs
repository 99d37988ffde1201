use crate::models::UploadedDocument;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pdf_extract::extract_text_from_mem;
use regex::Regex;
use std::sync::LazyLock;

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t\r\f]*(?:\n[ \t\r\f]*)+\n").expect("valid blank line pattern"));

/// Extraction path chosen from an upload's MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Pdf,
    Image,
    Text,
}

impl ContentKind {
    pub fn from_mime(mime_type: &str) -> Self {
        if mime_type == "application/pdf" {
            ContentKind::Pdf
        } else if mime_type.starts_with("image/") {
            ContentKind::Image
        } else {
            ContentKind::Text
        }
    }
}

/// What gets handed to the model for one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentContent {
    Text(String),
    Image { media_type: String, data: String },
}

impl DocumentContent {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DocumentContent::Text(text) => Some(text),
            DocumentContent::Image { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentProcessor;

impl DocumentProcessor {
    pub fn new() -> Self {
        Self
    }

    pub async fn extract(&self, document: &UploadedDocument) -> DocumentContent {
        match ContentKind::from_mime(&document.mime_type) {
            ContentKind::Pdf => DocumentContent::Text(self.extract_pdf(document).await),
            ContentKind::Image => {
                log::info!("Encoding image {} ({} bytes)", document.name, document.size_bytes);
                DocumentContent::Image {
                    media_type: document.mime_type.clone(),
                    data: STANDARD.encode(&document.bytes),
                }
            }
            ContentKind::Text => {
                DocumentContent::Text(String::from_utf8_lossy(&document.bytes).into_owned())
            }
        }
    }

    /// Never fails: unreadable PDFs degrade to a placeholder naming the file.
    async fn extract_pdf(&self, document: &UploadedDocument) -> String {
        log::info!("Processing PDF: {}", document.name);

        let bytes = document.bytes.clone();
        let extracted = tokio::task::spawn_blocking(move || extract_text_from_mem(&bytes)).await;

        match extracted {
            Ok(Ok(text)) => {
                let cleaned = self.clean_text(&text);
                if cleaned.is_empty() {
                    log::warn!("PDF {} has no text layer", document.name);
                    unreadable_pdf_placeholder(&document.name)
                } else {
                    cleaned
                }
            }
            Ok(Err(e)) => {
                log::error!("PDF parsing error for {}: {}", document.name, e);
                unreadable_pdf_placeholder(&document.name)
            }
            Err(e) => {
                log::error!("PDF extractor crashed on {}: {}", document.name, e);
                unreadable_pdf_placeholder(&document.name)
            }
        }
    }

    fn clean_text(&self, text: &str) -> String {
        BLANK_LINES.replace_all(text, "\n\n").trim().to_string()
    }
}

pub fn unreadable_pdf_placeholder(file_name: &str) -> String {
    format!("PDF file: {}. Unable to extract text content.", file_name)
}
