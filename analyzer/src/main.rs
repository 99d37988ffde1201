// Command-line uploader: sends each file to a running analysis endpoint and
// prints what came back.

use anyhow::{bail, Result};
use document_analyzer::{AnalysisSession, AnalysisStatus, HttpAnalyzer, UploadedDocument};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(endpoint) = args.next() else {
        bail!("usage: document_analyzer <endpoint-url> <file>...");
    };
    let paths: Vec<String> = args.collect();
    if paths.is_empty() {
        bail!("no files given");
    }

    let mut documents = Vec::with_capacity(paths.len());
    for path in &paths {
        documents.push(UploadedDocument::from_path(Path::new(path)).await?);
    }

    let mut session = AnalysisSession::new();
    session.add_documents(documents);
    session.analyze_all(&HttpAnalyzer::new(endpoint)).await;

    let mut failures = 0;
    for document in session.documents() {
        println!("== {} ({}, {} bytes)", document.name, document.mime_type, document.size_bytes);
        if let Some(result) = session.result(&document.name) {
            if result.status == AnalysisStatus::Error {
                failures += 1;
            }
            println!("{}", serde_json::to_string_pretty(result)?);
        }
    }

    if let Some(error) = session.last_error() {
        eprintln!("Error: {}", error);
    }
    if failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}
