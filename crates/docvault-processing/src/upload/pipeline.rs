//! Upload pipeline: validate → extract → store.
//!
//! Validation is delegated to [`DocumentValidator`](crate::DocumentValidator)
//! built from the caller's [`UploadConfig`]. Extraction runs before anything is
//! written, so a document that cannot be read never reaches storage.

use std::sync::Arc;
use std::time::Duration;

use docvault_core::AppError;
use docvault_storage::{generate_document_key, Storage};
use uuid::Uuid;

use super::traits::UploadConfig;
use super::types::UploadOutcome;
use crate::extract::{ExtractionOrchestrator, ExtractionResult, UploadedFile};
use crate::validator::DocumentValidator;

/// Run the orchestrator under a deadline. Expiry is reported as a failure.
pub async fn extract_with_timeout(
    orchestrator: &ExtractionOrchestrator,
    file: &UploadedFile,
    timeout: Duration,
) -> Result<ExtractionResult, AppError> {
    match tokio::time::timeout(timeout, orchestrator.extract_text(file)).await {
        Ok(result) => Ok(result?),
        Err(_) => {
            tracing::warn!(
                filename = %file.filename,
                timeout_secs = timeout.as_secs(),
                "Text extraction timed out"
            );
            Err(AppError::ExtractionTimeout {
                seconds: timeout.as_secs(),
            })
        }
    }
}

/// Run the upload pipeline: validate → extract → store.
pub async fn upload_pipeline(
    user_id: Uuid,
    file: UploadedFile,
    config: &dyn UploadConfig,
    orchestrator: &ExtractionOrchestrator,
    storage: Arc<dyn Storage>,
    timeout: Duration,
) -> Result<UploadOutcome, AppError> {
    let validator = DocumentValidator::new(
        config.max_file_size(),
        config.allowed_extensions().to_vec(),
        config.allowed_content_types().to_vec(),
    );
    validator.validate_all(&file.filename, &file.content_type, file.size())?;

    let extraction = extract_with_timeout(orchestrator, &file, timeout).await?;

    let storage_key = generate_document_key(user_id, &file.filename);
    let file_size = file.size();
    let storage_url = storage
        .upload_with_key(&storage_key, file.data, &file.content_type)
        .await?;

    tracing::info!(
        user_id = %user_id,
        storage_key = %storage_key,
        file_size = file_size,
        "Document stored"
    );

    Ok(UploadOutcome {
        storage_key,
        storage_url,
        format: extraction.format,
        content_type: file.content_type,
        file_size,
        extracted_text: extraction.text,
    })
}
