use crate::claude_service::ClaudeService;
use crate::config::Config;
use crate::document_processor::DocumentProcessor;
use crate::error::Result;
use crate::models::{DocumentAnalysis, UploadedDocument};
use crate::reply::LlmReply;
use std::sync::Arc;

/// Runs one document through extraction, prompting, the model and
/// normalization.
pub struct AnalysisService {
    processor: DocumentProcessor,
    claude_service: Arc<ClaudeService>,
}

impl AnalysisService {
    pub fn new(claude_service: Arc<ClaudeService>) -> Self {
        Self {
            processor: DocumentProcessor::new(),
            claude_service,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(Arc::new(ClaudeService::new(config)?)))
    }

    pub async fn analyze(&self, document: &UploadedDocument) -> Result<DocumentAnalysis> {
        let start_time = std::time::Instant::now();

        let content = self.processor.extract(document).await;
        let prompt = build_prompt(&document.name, content.as_text());
        let request = self.claude_service.build_request(prompt, &content);

        log::info!("Requesting analysis of {} ({})", document.name, document.mime_type);
        let text = self.claude_service.complete(&request).await?;

        let analysis = LlmReply::parse(&text).into_analysis();
        log::info!(
            "Analyzed {} as {:?} in {} ms",
            document.name,
            analysis.document_type,
            start_time.elapsed().as_millis()
        );
        Ok(analysis)
    }
}

/// `text` is `None` for images, which travel as an attachment instead.
pub fn build_prompt(file_name: &str, text: Option<&str>) -> String {
    let text_section = text
        .map(|t| format!("\nExtracted Text Content:\n{}", t))
        .unwrap_or_default();

    format!(
        r#"You are analyzing an Italian property document. Please analyze this document and provide:

1. Document Type: Identify what type of property document this is (e.g., Cadastral Record, Energy Certificate, Title Deed, Building Permit, etc.)
2. Extracted Data: Extract all key information from the document
3. Issues: Identify any compliance issues, expired dates, or concerns
4. Recommendations: Provide actionable recommendations

Document Name: {file_name}
{text_section}

Respond in JSON format like this:
{{
  "documentType": "Type of document",
  "extractedData": {{
    "key1": "value1",
    "key2": "value2"
  }},
  "issues": ["issue1", "issue2"],
  "recommendations": ["recommendation1", "recommendation2"]
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalyzerError;
    use mockito::Matcher;
    use serde_json::json;

    fn service_for(server: &mockito::Server) -> AnalysisService {
        let config = Config::from_lookup(|key| match key {
            "ANTHROPIC_API_KEY" => Some("test-key".to_string()),
            "ANTHROPIC_BASE_URL" => Some(server.url()),
            _ => None,
        })
        .unwrap();
        AnalysisService::from_config(&config).unwrap()
    }

    fn reply_with(text: &str) -> String {
        json!({"content": [{"type": "text", "text": text}]}).to_string()
    }

    #[test]
    fn test_prompt_embeds_text_and_file_name() {
        let prompt = build_prompt("visura.pdf", Some("Comune di Lecce, Foglio 12"));

        assert!(prompt.starts_with("You are analyzing an Italian property document."));
        assert!(prompt.contains("Document Name: visura.pdf\n\nExtracted Text Content:\nComune di Lecce, Foglio 12\n"));
        assert!(prompt.contains(r#""documentType": "Type of document""#));
        assert!(prompt.ends_with("}"));
    }

    #[test]
    fn test_prompt_for_image_has_no_text_section() {
        let prompt = build_prompt("facciata.jpg", None);

        assert!(prompt.contains("Document Name: facciata.jpg\n\n\nRespond in JSON format"));
        assert!(!prompt.contains("Extracted Text Content"));
    }

    #[tokio::test]
    async fn test_text_document_analysis() {
        let mut server = mockito::Server::new_async().await;
        let reply = r#"{"documentType":"Building Permit","extractedData":{"Numero":"45/2019"},"issues":["Permit expired"],"recommendations":["Request renewal"]}"#;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_body(Matcher::Regex("Permesso di costruire n. 45/2019".to_string()))
            .with_status(200)
            .with_body(reply_with(reply))
            .create_async()
            .await;

        let doc = UploadedDocument::new(
            "permesso.txt",
            "text/plain",
            b"Permesso di costruire n. 45/2019".to_vec(),
        );
        let analysis = service_for(&server).analyze(&doc).await.unwrap();

        assert_eq!(analysis.document_type, "Building Permit");
        assert_eq!(analysis.issues, vec!["Permit expired"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unparseable_reply_yields_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_body(reply_with("I could not find structured data."))
            .create_async()
            .await;

        let doc = UploadedDocument::new("note.txt", "text/plain", b"hello".to_vec());
        let analysis = service_for(&server).analyze(&doc).await.unwrap();

        assert_eq!(analysis.document_type, "Analysis Complete");
        assert_eq!(
            analysis.extracted_data.get("analysis"),
            Some(&json!("I could not find structured data."))
        );
    }

    #[tokio::test]
    async fn test_broken_pdf_still_reaches_the_model() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_body(Matcher::Regex("PDF file: scan.pdf. Unable to extract text content.".to_string()))
            .with_status(200)
            .with_body(reply_with(r#"{"documentType":"Unknown"}"#))
            .create_async()
            .await;

        let doc = UploadedDocument::new("scan.pdf", "application/pdf", b"%PDF-garbage".to_vec());
        let analysis = service_for(&server).analyze(&doc).await.unwrap();

        assert_eq!(analysis.document_type, "Unknown");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_upstream_failure_propagates() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(500)
            .with_body(json!({"error": {"type": "api_error", "message": "Internal server error"}}).to_string())
            .create_async()
            .await;

        let doc = UploadedDocument::new("note.txt", "text/plain", b"hello".to_vec());
        let err = service_for(&server).analyze(&doc).await.unwrap_err();

        assert!(matches!(err, AnalyzerError::Upstream { status: 500, .. }));
    }
}
