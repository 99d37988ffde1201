use crate::config::Config;
use crate::document_processor::DocumentContent;
use crate::error::{AnalyzerError, Result};
use crate::models::*;
use reqwest::Client;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct ClaudeService {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl ClaudeService {
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        })
    }

    /// Text goes out as a plain string; images as a text block plus an inline
    /// base64 image block.
    pub fn build_request(&self, prompt: String, content: &DocumentContent) -> MessagesRequest {
        let content = match content {
            DocumentContent::Text(_) => MessageContent::Text(prompt),
            DocumentContent::Image { media_type, data } => MessageContent::Blocks(vec![
                ContentBlock::Text { text: prompt },
                ContentBlock::Image {
                    source: ImageSource::Base64 {
                        media_type: media_type.clone(),
                        data: data.clone(),
                    },
                },
            ]),
        };

        MessagesRequest {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            messages: vec![Message {
                role: "user".to_string(),
                content,
            }],
        }
    }

    /// Sends one request and returns the text of the first text block.
    pub async fn complete(&self, request: &MessagesRequest) -> Result<String> {
        let url = format!("{}/v1/messages", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            log::error!("Anthropic API error ({}): {}", status, body);
            return Err(AnalyzerError::Upstream {
                status: status.as_u16(),
                detail,
            });
        }

        let messages_response: MessagesResponse = response.json().await?;

        messages_response
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text)
            .ok_or(AnalyzerError::EmptyResponse)
    }
}
