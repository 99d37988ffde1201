//! Client side of the upload flow: the documents a user has picked, the
//! outcome of each analysis, and the most recent error.

use crate::error::{AnalyzerError, Result};
use crate::models::*;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::collections::HashMap;
use std::future::Future;

/// Something that can turn one uploaded document into an analysis.
pub trait DocumentAnalyzer {
    fn analyze(&self, document: &UploadedDocument) -> impl Future<Output = Result<DocumentAnalysis>> + Send;
}

/// Talks to the analysis endpoint over HTTP, one multipart POST per document.
pub struct HttpAnalyzer {
    client: Client,
    endpoint: String,
}

impl HttpAnalyzer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(Client::new(), endpoint)
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

impl DocumentAnalyzer for HttpAnalyzer {
    async fn analyze(&self, document: &UploadedDocument) -> Result<DocumentAnalysis> {
        let part = Part::bytes(document.bytes.clone())
            .file_name(document.name.clone())
            .mime_str(&document.mime_type)?;
        let form = Form::new()
            .part("document", part)
            .text("fileName", document.name.clone());

        let response = self.client.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body: Option<ErrorBody> = response.json().await.ok();
            let message = body
                .and_then(|b| b.details.or(b.message))
                .unwrap_or_else(|| "Analysis failed".to_string());
            return Err(AnalyzerError::Endpoint {
                status: status.as_u16(),
                message,
            });
        }

        let result: AnalyzeResponse = response.json().await?;
        Ok(result.analysis)
    }
}

/// Owned state behind the upload screen. Only the methods below mutate it.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    documents: Vec<UploadedDocument>,
    results: HashMap<String, AnalysisResult>,
    last_error: Option<String>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_documents<I>(&mut self, documents: I)
    where
        I: IntoIterator<Item = UploadedDocument>,
    {
        self.documents.extend(documents);
        self.last_error = None;
    }

    /// Drops the document at `index` together with any result stored under
    /// its name.
    pub fn remove_document(&mut self, index: usize) -> Option<UploadedDocument> {
        if index >= self.documents.len() {
            return None;
        }
        let document = self.documents.remove(index);
        self.results.remove(&document.name);
        Some(document)
    }

    /// Analyzes every document that is not already complete, one at a time.
    /// A failure marks that document and moves on to the next.
    pub async fn analyze_all<A: DocumentAnalyzer>(&mut self, analyzer: &A) {
        self.last_error = None;

        for index in 0..self.documents.len() {
            let name = self.documents[index].name.clone();
            if self.status(&name) == Some(AnalysisStatus::Complete) {
                log::debug!("Skipping {}, already analyzed", name);
                continue;
            }

            self.results.insert(name.clone(), AnalysisResult::analyzing());

            let outcome = analyzer.analyze(&self.documents[index]).await;
            let result = match outcome {
                Ok(analysis) => AnalysisResult::complete(analysis),
                Err(e) => {
                    log::error!("Error analyzing document {}: {}", name, e);
                    self.last_error = Some(format!("Error analyzing {}: {}", name, e));
                    AnalysisResult::failed(e.to_string())
                }
            };
            self.results.insert(name, result);
        }
    }

    pub fn documents(&self) -> &[UploadedDocument] {
        &self.documents
    }

    pub fn result(&self, name: &str) -> Option<&AnalysisResult> {
        self.results.get(name)
    }

    /// `None` means the document has not been sent yet.
    pub fn status(&self, name: &str) -> Option<AnalysisStatus> {
        self.results.get(name).map(|r| r.status)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
