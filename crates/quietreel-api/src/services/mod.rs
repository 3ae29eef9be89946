//! Request-flow services behind the handlers

pub mod download;
pub mod intake;
pub mod orchestrator;

pub use download::{StagedFileStream, StreamingError};
