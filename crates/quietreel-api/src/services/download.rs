//! Streams a processed file to the client and removes it afterwards

use bytes::Bytes;
use futures::Stream;
use quietreel_processing::ProcessedFile;
use quietreel_storage::StagedFile;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::io::ReaderStream;

/// Faults after the response head has been sent; these can only be logged.
#[derive(Debug, thiserror::Error)]
pub enum StreamingError {
    #[error("client disconnected after {sent} of {total} bytes")]
    ClientDisconnect { sent: u64, total: u64 },

    #[error("failed to read processed file: {0}")]
    Io(#[from] io::Error),
}

/// File body that owns its [`StagedFile`].
///
/// The file is released once the stream is exhausted. If the stream is dropped early
/// (client went away) or fails mid-read, the guard's `Drop` removes the file instead.
pub struct StagedFileStream {
    inner: ReaderStream<tokio::fs::File>,
    staged: Option<StagedFile>,
    sent: u64,
    total: u64,
}

impl StagedFileStream {
    pub async fn open(processed: ProcessedFile) -> io::Result<Self> {
        let file = tokio::fs::File::open(processed.path()).await?;
        Ok(Self {
            inner: ReaderStream::new(file),
            staged: Some(processed.staged),
            sent: 0,
            total: processed.size_bytes,
        })
    }

    fn finish(&mut self) {
        if let Some(staged) = self.staged.take() {
            tracing::debug!(sent = self.sent, "Processed file streamed");
            tokio::spawn(async move {
                let file_name = staged.file_name().to_string();
                if let Err(e) = staged.release().await {
                    tracing::warn!(file = %file_name, error = %e, "Failed to release streamed file");
                }
            });
        }
    }
}

impl Stream for StagedFileStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        match Pin::new(&mut this.inner).poll_next(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                let kind = e.kind();
                let err = StreamingError::from(e);
                tracing::error!(error = %err, "Streaming failed");
                // Dropping the guard removes the file
                this.staged = None;
                Poll::Ready(Some(Err(io::Error::new(kind, err))))
            }
            Poll::Ready(None) => {
                this.finish();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for StagedFileStream {
    fn drop(&mut self) {
        if self.staged.is_some() {
            let err = StreamingError::ClientDisconnect {
                sent: self.sent,
                total: self.total,
            };
            tracing::warn!(error = %err, "Streaming failed");
        }
    }
}
