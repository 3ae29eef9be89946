//! One transcoder invocation and the channel its result travels on.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;

/// Input and output locations of a single transcode
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

/// Why a transcode did not produce usable output
#[derive(Debug, thiserror::Error)]
pub enum TranscodeError {
    #[error("Failed to launch transcoder: {0}")]
    Launch(String),

    #[error("Transcoder exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("Transcoder exited cleanly but left no output at {0}")]
    MissingOutput(PathBuf),

    #[error("Transcoder exceeded the time limit of {0:?}")]
    TimedOut(Duration),

    #[error("Transcode task ended without reporting a result")]
    Abandoned,
}

/// Terminal state of a transcode
#[derive(Debug)]
pub enum TranscodeOutcome {
    Succeeded { output_bytes: u64, elapsed: Duration },
    Failed(TranscodeError),
}

/// Create the completion pair for one job.
pub fn completion_channel() -> (TranscodeCompleter, TranscodeHandle) {
    let (tx, rx) = oneshot::channel();
    (TranscodeCompleter { tx }, TranscodeHandle { rx })
}

/// Sending half, held by whatever runs the transcoder.
///
/// `complete` consumes the completer, so a job resolves at most once.
#[derive(Debug)]
pub struct TranscodeCompleter {
    tx: oneshot::Sender<TranscodeOutcome>,
}

impl TranscodeCompleter {
    pub fn complete(self, outcome: TranscodeOutcome) {
        if self.tx.send(outcome).is_err() {
            tracing::debug!("Transcode finished after its requester went away");
        }
    }

    /// Resolves once the matching [`TranscodeHandle`] has been dropped.
    pub async fn cancelled(&mut self) {
        self.tx.closed().await
    }
}

/// Receiving half, awaited by the request flow.
///
/// If the completer is dropped without reporting, the handle resolves to
/// `Failed(Abandoned)`, so awaiting it always yields exactly one outcome.
#[derive(Debug)]
pub struct TranscodeHandle {
    rx: oneshot::Receiver<TranscodeOutcome>,
}

impl Future for TranscodeHandle {
    type Output = TranscodeOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(|result| {
            result.unwrap_or(TranscodeOutcome::Failed(TranscodeError::Abandoned))
        })
    }
}
