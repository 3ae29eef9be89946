//! Owned handle to a staged file.

use crate::traits::{StorageError, StorageResult};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A reserved file in the staging directory.
///
/// The file is removed exactly once: either through [`StagedFile::release`] or, if the
/// handle is dropped first (error path, cancelled request), synchronously in `Drop`.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
    released: bool,
}

impl StagedFile {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self {
            path,
            released: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name component, for logging
    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }

    /// Current size on disk; a missing file counts as empty.
    pub async fn size_on_disk(&self) -> StorageResult<u64> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(StorageError::IoError(e)),
        }
    }

    /// Open the reserved file for writing, truncating anything already there.
    pub async fn open_write(&self) -> StorageResult<tokio::fs::File> {
        tokio::fs::OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&self.path)
            .await
            .map_err(|e| {
                StorageError::WriteFailed(format!(
                    "Failed to open {} for writing: {}",
                    self.path.display(),
                    e
                ))
            })
    }

    /// Delete the file now. Deleting an already absent file succeeds.
    pub async fn release(mut self) -> StorageResult<()> {
        self.released = true;
        release_path(&self.path).await
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = %self.path.display(), "Released staged file on drop");
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Failed to release staged file on drop"
                );
            }
        }
    }
}

/// Delete the file at `path`, treating "not found" as success.
pub async fn release_path(path: &Path) -> StorageResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "Released staged file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(StorageError::DeleteFailed(format!(
            "Failed to delete {}: {}",
            path.display(),
            e
        ))),
    }
}
