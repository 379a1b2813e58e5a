//! File upload handler

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Json,
};

use crate::error::ApiResult;
use crate::models::FileUploadResponse;
use crate::uploads::{UploadError, UploadService};

/// Multipart form field carrying the document
pub const FILE_FIELD: &str = "file";

/// Accept a single identity document from the `file` part
pub async fn upload_file(
    State(service): State<Arc<UploadService>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<FileUploadResponse>> {
    // A body that is not multipart at all simply carries no file
    let Ok(mut multipart) = multipart else {
        return Err(UploadError::NoFileProvided.into());
    };

    let limit = service.max_size_bytes();
    let read_error = move |err: MultipartError| {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::PayloadTooLarge { limit }
        } else {
            UploadError::Malformed(err.body_text())
        }
    };

    while let Some(mut field) = multipart.next_field().await.map_err(read_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A `file` part without a filename is a plain text field
        let Some(original_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let mut data: Vec<u8> = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(read_error)? {
            service.check_size(data.len() + chunk.len())?;
            data.extend_from_slice(&chunk);
        }

        let stored = service.store(Some(original_name), Bytes::from(data)).await?;
        return Ok(Json(stored));
    }

    Err(UploadError::NoFileProvided.into())
}
