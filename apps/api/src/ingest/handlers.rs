use axum::extract::multipart::MultipartError;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::Json;
use bytes::Bytes;
use serde::Serialize;

use crate::errors::AppError;
use crate::ingest::files::{is_read_error, read_upload};

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

#[derive(Debug)]
pub struct Upload {
    pub file_name: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub file_name: Option<String>,
    pub text: String,
    /// `false` when `text` is a read error message.
    pub ok: bool,
}

/// Pulls the `file` field out of a multipart body.
pub async fn next_upload(multipart: &mut Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Invalid multipart body", e))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error("Failed to read upload", e))?;
        return Ok(Upload { file_name, bytes });
    }

    Err(AppError::Validation(format!(
        "Multipart field '{FILE_FIELD}' is required"
    )))
}

fn multipart_error(context: &str, err: MultipartError) -> AppError {
    let message = format!("{context}: {}", err.body_text());
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::Validation(message)
    }
}

/// Extracts the upload's text off the async runtime.
pub async fn extract_upload(upload: Upload) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || read_upload(upload.file_name.as_deref(), &upload.bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))
}

/// POST /api/v1/files/extract
///
/// Returns the plain text of an uploaded `.txt`, `.md`, `.pdf` or `.docx`.
/// Read failures come back as `ok: false` with the error text, not as an
/// HTTP error.
pub async fn handle_extract_file(
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, AppError> {
    let upload = next_upload(&mut multipart).await?;
    let file_name = upload.file_name.clone();
    let text = extract_upload(upload).await?;

    Ok(Json(ExtractResponse {
        file_name,
        ok: !is_read_error(&text),
        text,
    }))
}
