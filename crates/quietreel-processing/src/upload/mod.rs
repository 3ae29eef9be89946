//! Staged files owned by a single remove-audio request.

mod types;

pub use types::{ProcessedFile, UploadedFile};
