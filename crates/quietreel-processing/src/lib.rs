//! Quietreel Processing Library
//!
//! Upload validation, staged file models and the external transcoder invocation.

pub mod upload;
pub mod validator;
#[cfg(feature = "video")]
pub mod video;

pub use upload::{ProcessedFile, UploadedFile};
pub use validator::{IntakeError, UploadValidator};
#[cfg(feature = "video")]
pub use video::{
    completion_channel, FFmpegService, TranscodeCompleter, TranscodeError, TranscodeHandle,
    TranscodeInvoker, TranscodeJob, TranscodeOutcome,
};
