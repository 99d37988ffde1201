use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use document_analyzer::FALLBACK_MIME_TYPE;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("failed to read multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

/// An uploaded file spooled to the upload directory.
#[derive(Debug)]
pub struct StoredUpload {
    pub path: PathBuf,
    pub mime_type: String,
    pub original_name: Option<String>,
    pub size_bytes: u64,
}

impl StoredUpload {
    pub async fn remove(&self) {
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            log::warn!("Failed to delete upload {}: {}", self.path.display(), e);
        }
    }
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub document: Option<StoredUpload>,
    pub file_name: Option<String>,
}

/// Reads the `document` and `fileName` fields. Only the first `document` part
/// that carries a filename is kept; anything else is skipped. If a later part
/// fails to read, the already stored document is removed before returning.
pub async fn read_form(multipart: &mut Multipart, upload_dir: &Path) -> Result<UploadForm, UploadError> {
    let mut form = UploadForm::default();

    if let Err(e) = read_fields(multipart, upload_dir, &mut form).await {
        if let Some(stored) = form.document.take() {
            stored.remove().await;
        }
        return Err(e);
    }

    Ok(form)
}

async fn read_fields(multipart: &mut Multipart, upload_dir: &Path, form: &mut UploadForm) -> Result<(), UploadError> {
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            // a plain form value named `document` is not a file
            Some("document") if form.document.is_none() && field.file_name().is_some() => {
                form.document = Some(store_field(field, upload_dir).await?);
            }
            Some("fileName") => form.file_name = Some(field.text().await?),
            _ => {}
        }
    }

    Ok(())
}

async fn store_field(mut field: Field<'_>, upload_dir: &Path) -> Result<StoredUpload, UploadError> {
    let original_name = field.file_name().map(str::to_owned);
    let mime_type = field
        .content_type()
        .map(str::to_owned)
        .or_else(|| {
            original_name
                .as_deref()
                .and_then(|n| mime_guess::from_path(n).first_raw())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| FALLBACK_MIME_TYPE.to_string());

    let path = upload_dir.join(format!("upload-{}", Uuid::new_v4()));
    let mut file = File::create(&path).await?;
    let mut size_bytes = 0u64;

    let written = async {
        while let Some(chunk) = field.chunk().await? {
            file.write_all(&chunk).await?;
            size_bytes += chunk.len() as u64;
        }
        file.flush().await?;
        Ok::<(), UploadError>(())
    }
    .await;

    // a partial file is never handed to the analysis step
    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&path).await;
        return Err(e);
    }

    log::info!(
        "Stored upload {:?} ({}, {} bytes) at {}",
        original_name,
        mime_type,
        size_bytes,
        path.display()
    );

    Ok(StoredUpload {
        path,
        mime_type,
        original_name,
        size_bytes,
    })
}
