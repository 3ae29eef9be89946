//! Upload intake: multipart form to a staged [`UploadedFile`]

use crate::constants::VIDEO_FIELD;
use crate::error::storage_error;
use axum::extract::multipart::{Field, Multipart, MultipartError};
use axum::http::StatusCode;
use quietreel_core::AppError;
use quietreel_processing::validator::{display_filename, storage_filename};
use quietreel_processing::{IntakeError, UploadValidator, UploadedFile};
use quietreel_storage::{Namespace, StagingStore};
use tokio::io::AsyncWriteExt;

/// Read the form and stage the first `video` file part.
///
/// Later `video` parts and any other fields are skipped. On every error path the
/// partially written upload is removed before returning.
pub async fn accept(
    mut multipart: Multipart,
    staging: &dyn StagingStore,
    validator: &UploadValidator,
) -> Result<UploadedFile, AppError> {
    let mut uploaded: Option<UploadedFile> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, validator))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            tracing::debug!(field = ?field.name(), "Skipping unexpected multipart field");
            continue;
        }
        if uploaded.is_some() {
            tracing::debug!("Ignoring additional video field");
            continue;
        }
        uploaded = Some(stage_field(field, staging, validator).await?);
    }

    uploaded.ok_or_else(|| IntakeError::NoFile.into())
}

async fn stage_field(
    mut field: Field<'_>,
    staging: &dyn StagingStore,
    validator: &UploadValidator,
) -> Result<UploadedFile, AppError> {
    let declared_type = field.content_type().map(str::to_string);
    validator.validate_content_type(declared_type.as_deref())?;
    let content_type = declared_type.unwrap_or_default();

    let original_filename = display_filename(field.file_name());
    let staged = staging
        .allocate(
            Namespace::Upload,
            &storage_filename(&original_filename, &content_type),
        )
        .await
        .map_err(storage_error)?;

    let mut file = staged.open_write().await.map_err(storage_error)?;
    let mut received: u64 = 0;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| multipart_error(e, validator))?
    {
        received += chunk.len() as u64;
        if let Err(rejection) = validator.validate_running_size(received) {
            drop(file);
            tracing::warn!(
                received,
                max_bytes = validator.max_file_size(),
                "Upload exceeds size limit, discarding"
            );
            if let Err(e) = staged.release().await {
                tracing::warn!(error = %e, "Failed to release oversized upload");
            }
            return Err(rejection.into());
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    drop(file);

    if received == 0 {
        if let Err(e) = staged.release().await {
            tracing::warn!(error = %e, "Failed to release empty upload");
        }
        return Err(IntakeError::NoFile.into());
    }

    tracing::info!(
        original_filename = %original_filename,
        content_type = %content_type,
        size_bytes = received,
        staged = %staged.file_name(),
        "Upload staged"
    );

    Ok(UploadedFile {
        original_filename,
        content_type,
        size_bytes: received,
        staged,
    })
}

/// The router's body limit surfaces as a 413 multipart error
fn multipart_error(err: MultipartError, validator: &UploadValidator) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return IntakeError::TooLarge {
            max_bytes: validator.max_file_size(),
        }
        .into();
    }
    AppError::BadRequest(format!("Failed to read multipart: {}", err.body_text()))
}
