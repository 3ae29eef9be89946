//! Audio removal through an external FFmpeg process

mod invoker;
mod job;
mod service;

pub use invoker::TranscodeInvoker;
pub use job::{
    completion_channel, TranscodeCompleter, TranscodeError, TranscodeHandle, TranscodeJob,
    TranscodeOutcome,
};
pub use service::FFmpegService;
