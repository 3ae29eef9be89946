//! Quietreel Core Library
//!
//! Configuration, the error taxonomy and the response shapes shared by every Quietreel crate.

pub mod config;
pub mod error;
pub mod models;

pub use config::{BaseConfig, Config, MediaProcessorConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
