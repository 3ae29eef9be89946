//! Remove-audio request flow
//!
//! `Received -> Staged -> Transcoding -> {Completed, Failed}`. Every staged file is owned
//! by a [`quietreel_storage::StagedFile`] guard, so a dropped request future (client
//! abort) still removes whatever it had staged.

use crate::error::{storage_error, transcode_error};
use crate::services::intake;
use crate::state::AppState;
use axum::extract::Multipart;
use quietreel_core::AppError;
use quietreel_processing::validator::storage_filename;
use quietreel_processing::{ProcessedFile, TranscodeJob, TranscodeOutcome};
use quietreel_storage::{Namespace, StagedFile};

/// Stage the upload, strip its audio and hand back the processed file.
///
/// The upload is released as soon as the transcoder finishes; on failure the output
/// is released too. On success the caller owns the [`ProcessedFile`] and its cleanup.
pub async fn remove_audio(
    state: &AppState,
    multipart: Multipart,
) -> Result<ProcessedFile, AppError> {
    let upload = intake::accept(multipart, state.staging.as_ref(), &state.validator).await?;

    let output = state
        .staging
        .allocate(
            Namespace::Processed,
            &storage_filename(&upload.original_filename, &upload.content_type),
        )
        .await
        .map_err(storage_error)?;

    let job = TranscodeJob {
        input_path: upload.path().to_path_buf(),
        output_path: output.path().to_path_buf(),
    };
    tracing::info!(
        input = %job.input_path.display(),
        output = %job.output_path.display(),
        "Transcoding"
    );

    let outcome = state.transcoder.start(job).await;

    let download_filename = upload.download_filename();
    let content_type = upload.output_content_type();
    release_quietly(upload.staged, "upload").await;

    match outcome {
        TranscodeOutcome::Succeeded {
            output_bytes,
            elapsed,
        } => {
            let size_bytes = output.size_on_disk().await.map_err(storage_error)?;
            tracing::info!(
                download_filename = %download_filename,
                reported_bytes = output_bytes,
                size_bytes,
                duration_ms = elapsed.as_millis(),
                "Audio removed"
            );
            Ok(ProcessedFile {
                download_filename,
                content_type,
                size_bytes,
                staged: output,
            })
        }
        TranscodeOutcome::Failed(err) => {
            tracing::error!(error = %err, "Transcode failed");
            release_quietly(output, "output").await;
            Err(transcode_error(err))
        }
    }
}

/// Cleanup failures are logged, never surfaced to the client
pub async fn release_quietly(staged: StagedFile, role: &'static str) {
    let file_name = staged.file_name().to_string();
    match staged.release().await {
        Ok(()) => tracing::debug!(role, file = %file_name, "Released staged file"),
        Err(e) => {
            tracing::warn!(role, file = %file_name, error = %e, "Failed to release staged file")
        }
    }
}
