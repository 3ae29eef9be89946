//! Staging store abstraction
//!
//! This module defines the StagingStore trait and the errors staging operations return.

use crate::keys::Namespace;
use crate::staged::StagedFile;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Staging operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Allocation failed: {0}")]
    AllocationFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Invalid staging name: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for staging operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Staging store trait
///
/// Hands out unique, request-private file locations and reclaims them. Uniqueness comes
/// from the naming scheme, so implementations keep no registry of live files.
#[async_trait]
pub trait StagingStore: Send + Sync {
    /// Directory every staged file lives in
    fn root(&self) -> &Path;

    /// Reserve a fresh location in `namespace` derived from `base_name`.
    ///
    /// `base_name` must already be a bare file name (no separators, no `..`).
    async fn allocate(&self, namespace: Namespace, base_name: &str) -> StorageResult<StagedFile>;

    /// Delete the file at `path` if present. A missing file is not an error.
    ///
    /// For callers that hold only a path and want it checked against the staging root.
    /// Holders of a [`StagedFile`] use its own `release`.
    async fn release(&self, path: &Path) -> StorageResult<()>;
}
