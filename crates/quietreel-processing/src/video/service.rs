//! FFmpeg service - spawns the transcoder and reports through the completion channel

use super::invoker::TranscodeInvoker;
use super::job::{completion_channel, TranscodeError, TranscodeHandle, TranscodeJob, TranscodeOutcome};
use quietreel_core::Config;
use quietreel_infra::TranscodeSlots;
use quietreel_storage::release_path;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

/// Bytes of transcoder stderr kept for diagnostics
const STDERR_TAIL_BYTES: usize = 4096;

#[derive(Clone, Debug)]
pub struct FFmpegService {
    ffmpeg_path: String,
    video_codec: String,
    timeout: Duration,
    slots: TranscodeSlots,
}

impl FFmpegService {
    pub fn new(
        ffmpeg_path: impl Into<String>,
        video_codec: impl Into<String>,
        timeout: Duration,
        slots: TranscodeSlots,
    ) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            video_codec: video_codec.into(),
            timeout,
            slots,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.ffmpeg_path(),
            config.video_codec(),
            config.transcode_timeout(),
            TranscodeSlots::new(config.max_concurrent_transcodes()),
        )
    }

    pub fn slots(&self) -> &TranscodeSlots {
        &self.slots
    }

    /// Paths carry the `file:` protocol prefix so names starting with `-` or containing
    /// `:` are never read as options or other protocols.
    fn build_args(&self, job: &TranscodeJob) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-nostdin", "-loglevel", "error", "-y", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(file_url(&job.input_path));
        args.extend(["-an", "-c:v", self.video_codec.as_str()].map(OsString::from));
        args.push(file_url(&job.output_path));
        args
    }

    #[tracing::instrument(skip(self, job), fields(
        process.executable.path = %self.ffmpeg_path,
        ffmpeg.operation = "remove_audio",
        input = %job.input_path.display()
    ))]
    async fn run(&self, job: &TranscodeJob) -> TranscodeOutcome {
        let _permit = match self.slots.acquire().await {
            Ok(permit) => permit,
            Err(_) => {
                return TranscodeOutcome::Failed(TranscodeError::Launch(
                    "transcode slots are closed".to_string(),
                ))
            }
        };

        let start = Instant::now();
        let mut child = match Command::new(&self.ffmpeg_path)
            .args(self.build_args(job))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                tracing::error!(error = %e, "Failed to spawn ffmpeg");
                return TranscodeOutcome::Failed(TranscodeError::Launch(format!(
                    "{}: {}",
                    self.ffmpeg_path, e
                )));
            }
        };

        let stderr = child.stderr.take();
        let waited = tokio::time::timeout(self.timeout, async {
            let tail = async {
                match stderr {
                    Some(stderr) => read_tail(stderr).await,
                    None => String::new(),
                }
            };
            tokio::join!(child.wait(), tail)
        })
        .await;

        let (status, stderr) = match waited {
            Ok((Ok(status), stderr)) => (status, stderr),
            Ok((Err(e), _)) => {
                tracing::error!(error = %e, "Failed to wait for ffmpeg");
                return TranscodeOutcome::Failed(TranscodeError::Launch(e.to_string()));
            }
            Err(_) => {
                if let Err(e) = child.kill().await {
                    tracing::warn!(error = %e, "Failed to kill timed out ffmpeg");
                }
                tracing::error!(timeout_secs = self.timeout.as_secs(), "ffmpeg timed out");
                return TranscodeOutcome::Failed(TranscodeError::TimedOut(self.timeout));
            }
        };

        if !status.success() {
            tracing::error!(code = ?status.code(), stderr = %stderr, "ffmpeg exited with failure");
            return TranscodeOutcome::Failed(TranscodeError::NonZeroExit {
                code: status.code(),
                stderr,
            });
        }

        match tokio::fs::metadata(&job.output_path).await {
            Ok(meta) if meta.len() > 0 => {
                let elapsed = start.elapsed();
                tracing::info!(
                    duration_ms = elapsed.as_millis(),
                    output_bytes = meta.len(),
                    "Audio removal completed"
                );
                TranscodeOutcome::Succeeded {
                    output_bytes: meta.len(),
                    elapsed,
                }
            }
            _ => {
                tracing::error!(output = %job.output_path.display(), "ffmpeg produced no output");
                TranscodeOutcome::Failed(TranscodeError::MissingOutput(job.output_path.clone()))
            }
        }
    }
}

impl TranscodeInvoker for FFmpegService {
    fn start(&self, job: TranscodeJob) -> TranscodeHandle {
        let (mut completer, handle) = completion_channel();
        let service = self.clone();

        tokio::spawn(async move {
            let outcome = tokio::select! {
                outcome = service.run(&job) => Some(outcome),
                _ = completer.cancelled() => None,
            };

            match outcome {
                Some(outcome) => completer.complete(outcome),
                None => {
                    // run() was dropped, which kills the child
                    tracing::warn!(output = %job.output_path.display(), "Transcode cancelled by requester");
                    if let Err(e) = release_path(&job.output_path).await {
                        tracing::warn!(error = %e, "Failed to release cancelled transcode output");
                    }
                }
            }
        });

        handle
    }
}

fn file_url(path: &Path) -> OsString {
    let mut url = OsString::from("file:");
    url.push(path.as_os_str());
    url
}

/// Drain `reader`, keeping only the last [`STDERR_TAIL_BYTES`].
async fn read_tail<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut tail = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                tail.extend_from_slice(&buf[..n]);
                if tail.len() > STDERR_TAIL_BYTES {
                    let excess = tail.len() - STDERR_TAIL_BYTES;
                    tail.drain(..excess);
                }
            }
        }
    }
    String::from_utf8_lossy(&tail).trim().to_string()
}
