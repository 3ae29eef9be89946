use super::job::{TranscodeHandle, TranscodeJob};

/// Launches transcodes without blocking the caller.
///
/// Implementations must resolve every returned handle exactly once, and must kill the
/// work and release `job.output_path` themselves when the handle is dropped early.
pub trait TranscodeInvoker: Send + Sync {
    fn start(&self, job: TranscodeJob) -> TranscodeHandle;
}
