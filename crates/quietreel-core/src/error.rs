//! Error types module
//!
//! All failures of the remove-audio flow are unified under [`AppError`]. Each variant
//! self-describes how it is presented over HTTP through the [`ErrorMetadata`] trait, so the
//! API layer only needs to render whatever it is handed.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "TRANSCODE_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("No video file provided")]
    NoVideoFile,

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Upload exceeds {max_bytes} bytes")]
    PayloadTooLarge { max_bytes: u64 },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Staging error: {0}")]
    Staging(String),

    #[error("Transcode failed: {0}")]
    Transcode(String),

    #[error("Transcoder unavailable: {0}")]
    TranscoderUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Staging(format!("IO error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::NoVideoFile => (400, "NO_FILE", false, LogLevel::Debug),
        AppError::UnsupportedContentType(_) => {
            (400, "INVALID_CONTENT_TYPE", false, LogLevel::Debug)
        }
        AppError::PayloadTooLarge { .. } => (413, "PAYLOAD_TOO_LARGE", false, LogLevel::Warn),
        AppError::BadRequest(_) => (400, "BAD_REQUEST", false, LogLevel::Debug),
        AppError::Staging(_) => (500, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::Transcode(_) => (500, "TRANSCODE_FAILED", false, LogLevel::Error),
        AppError::TranscoderUnavailable(_) => (500, "TRANSCODER_UNAVAILABLE", true, LogLevel::Error),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, LogLevel::Error)
        }
    }
}

impl AppError {
    /// Get the error type name used in structured logs
    pub fn error_type(&self) -> &str {
        match self {
            AppError::NoVideoFile => "NoVideoFile",
            AppError::UnsupportedContentType(_) => "UnsupportedContentType",
            AppError::PayloadTooLarge { .. } => "PayloadTooLarge",
            AppError::BadRequest(_) => "BadRequest",
            AppError::Staging(_) => "Staging",
            AppError::Transcode(_) => "Transcode",
            AppError::TranscoderUnavailable(_) => "TranscoderUnavailable",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

/// Whole megabytes when the size is an exact multiple, otherwise bytes or one decimal.
fn format_size(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;
    if bytes < MIB {
        format!("{} bytes", bytes)
    } else if bytes % MIB == 0 {
        format!("{} MB", bytes / MIB)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::NoVideoFile => "No video file provided".to_string(),
            AppError::UnsupportedContentType(_) => "Only video files are allowed".to_string(),
            AppError::PayloadTooLarge { max_bytes } => format!(
                "Video file exceeds the maximum size of {}",
                format_size(*max_bytes)
            ),
            AppError::BadRequest(ref msg) => msg.clone(),
            // Transcoder detail (exit status, stderr) stays in the logs.
            AppError::Transcode(_) | AppError::TranscoderUnavailable(_) => {
                "Failed to process video".to_string()
            }
            AppError::Staging(_) | AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}
