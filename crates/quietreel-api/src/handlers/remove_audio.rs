use crate::error::{storage_error, HttpAppError};
use crate::services::{orchestrator, StagedFileStream};
use crate::state::AppState;
use crate::utils::headers::attachment_disposition;
use axum::{
    body::Body,
    extract::{Multipart, State},
    http::{header, Response, StatusCode},
};
use quietreel_core::AppError;
use std::sync::Arc;

/// `POST /api/remove-audio`
///
/// Accepts a multipart `video` field and responds with the same video minus its audio
/// track, as an attachment named `no-audio-<original name>`.
#[tracing::instrument(skip(state, multipart), fields(operation = "remove_audio"))]
pub async fn remove_audio(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response<Body>, HttpAppError> {
    let processed = orchestrator::remove_audio(&state, multipart).await?;

    let content_type = processed.content_type.clone();
    let content_length = processed.size_bytes;
    let disposition = attachment_disposition(&processed.download_filename);

    let stream = StagedFileStream::open(processed)
        .await
        .map_err(|e| storage_error(e.into()))?;

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_str())
        .header(header::CONTENT_LENGTH, content_length)
        .header(header::CONTENT_DISPOSITION, disposition.as_str())
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}
