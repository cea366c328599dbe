//! Common utilities for file upload handlers

use axum::extract::Multipart;
use docvault_core::constants::OCTET_STREAM_CONTENT_TYPE;
use docvault_core::AppError;
use docvault_processing::UploadedFile;

/// Read the single `file` field of a multipart form. Other fields are ignored.
pub async fn extract_multipart_file(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut file: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        if file.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or(OCTET_STREAM_CONTENT_TYPE)
            .to_string();

        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?;

        file = Some(UploadedFile::new(data, filename, content_type));
    }

    file.ok_or_else(|| AppError::BadRequest("No file provided".to_string()))
}
