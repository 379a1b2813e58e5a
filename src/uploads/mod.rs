//! Identity document uploads stored on local disk

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use thiserror::Error;
use uuid::Uuid;

use crate::models::FileUploadResponse;

/// Default cap for a single upload (5 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// URL prefix stored files are served under
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file uploaded")]
    NoFileProvided,

    #[error("File too large")]
    PayloadTooLarge { limit: usize },

    #[error("Malformed upload: {0}")]
    Malformed(String),

    #[error("Failed to store upload: {0}")]
    Storage(#[from] std::io::Error),
}

/// Writes uploaded files under a generated name in the upload directory
#[derive(Debug, Clone)]
pub struct UploadService {
    dir: PathBuf,
    max_size_bytes: usize,
}

impl UploadService {
    pub fn new(dir: impl Into<PathBuf>, max_size_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_size_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn max_size_bytes(&self) -> usize {
        self.max_size_bytes
    }

    /// Create the upload directory if it does not exist yet
    pub async fn ensure_dir(&self) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tracing::info!(dir = %self.dir.display(), "Upload directory ready");
        Ok(())
    }

    /// Fails with `PayloadTooLarge` once `size` passes the cap
    pub fn check_size(&self, size: usize) -> Result<(), UploadError> {
        if size > self.max_size_bytes {
            return Err(UploadError::PayloadTooLarge {
                limit: self.max_size_bytes,
            });
        }
        Ok(())
    }

    /// Persist `data` and return where it can be fetched from.
    ///
    /// The stored name is generated; `original_name` is only echoed back
    /// for display.
    pub async fn store(
        &self,
        original_name: Option<String>,
        data: Bytes,
    ) -> Result<FileUploadResponse, UploadError> {
        self.check_size(data.len())?;

        let stored_name = Uuid::new_v4().simple().to_string();
        let path = self.dir.join(&stored_name);
        tokio::fs::write(&path, &data).await?;

        tracing::info!(
            stored_name = %stored_name,
            size_bytes = data.len(),
            "Stored uploaded file"
        );

        Ok(FileUploadResponse {
            url: format!("{}/{}", UPLOADS_URL_PREFIX, stored_name),
            filename: original_name.unwrap_or_else(|| stored_name.clone()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("nexbank-uploads-{}", Uuid::new_v4().simple()))
    }

    #[tokio::test]
    async fn test_store_writes_under_generated_name() {
        let service = UploadService::new(temp_dir(), 1024);
        service.ensure_dir().await.unwrap();

        let response = service
            .store(Some("passport.pdf".to_string()), Bytes::from_static(b"%PDF-1.4"))
            .await
            .unwrap();

        assert_eq!(response.filename, "passport.pdf");
        assert!(response.url.starts_with("/uploads/"));
        assert!(!response.url.ends_with("passport.pdf"));

        let stored_name = response.url.trim_start_matches("/uploads/");
        let on_disk = tokio::fs::read(service.dir().join(stored_name)).await.unwrap();
        assert_eq!(on_disk, b"%PDF-1.4");

        tokio::fs::remove_dir_all(service.dir()).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_rejects_oversized() {
        let service = UploadService::new(temp_dir(), 4);
        service.ensure_dir().await.unwrap();

        let err = service
            .store(Some("big.png".to_string()), Bytes::from_static(b"12345"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::PayloadTooLarge { limit: 4 }));

        let mut entries = tokio::fs::read_dir(service.dir()).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());

        tokio::fs::remove_dir_all(service.dir()).await.unwrap();
    }

    #[test]
    fn test_check_size_boundary() {
        let service = UploadService::new("unused", DEFAULT_MAX_UPLOAD_BYTES);
        assert!(service.check_size(DEFAULT_MAX_UPLOAD_BYTES).is_ok());
        assert!(service.check_size(DEFAULT_MAX_UPLOAD_BYTES + 1).is_err());
    }
}
