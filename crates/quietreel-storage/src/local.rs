use crate::keys::{generate_file_name, validate_base_name, Namespace};
use crate::staged::{release_path, StagedFile};
use crate::traits::{StagingStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Attempts at finding a free name before giving up. Only reached when another process
/// shares the staging directory and produced the same name.
const MAX_ALLOCATION_ATTEMPTS: usize = 8;

/// Local filesystem staging directory
#[derive(Clone, Debug)]
pub struct LocalStaging {
    base_path: PathBuf,
}

impl LocalStaging {
    /// Create the staging directory (if needed) and return a store rooted in it.
    ///
    /// Called once during server startup; safe to call concurrently or repeatedly.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create staging directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        // Transcoder arguments and ownership checks rely on absolute paths.
        let base_path = std::path::absolute(&base_path).map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to resolve staging directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        tracing::info!(path = %base_path.display(), "Staging directory ready");

        Ok(LocalStaging { base_path })
    }

    /// Make sure `path` names a file directly inside the staging directory
    fn check_owned(&self, path: &Path) -> StorageResult<()> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StorageError::InvalidKey(format!("{}", path.display())))?;
        validate_base_name(file_name)?;

        if path.parent() != Some(self.base_path.as_path()) {
            return Err(StorageError::InvalidKey(format!(
                "{} is outside the staging directory",
                path.display()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl StagingStore for LocalStaging {
    fn root(&self) -> &Path {
        &self.base_path
    }

    async fn allocate(&self, namespace: Namespace, base_name: &str) -> StorageResult<StagedFile> {
        validate_base_name(base_name)?;

        for _ in 0..MAX_ALLOCATION_ATTEMPTS {
            let path = self
                .base_path
                .join(generate_file_name(namespace, base_name));

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(_) => {
                    tracing::debug!(path = %path.display(), "Allocated staged file");
                    return Ok(StagedFile::new(path));
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    tracing::debug!(path = %path.display(), "Staged name taken, retrying");
                    continue;
                }
                Err(e) => {
                    return Err(StorageError::AllocationFailed(format!(
                        "Failed to create {}: {}",
                        path.display(),
                        e
                    )));
                }
            }
        }

        Err(StorageError::AllocationFailed(format!(
            "No free staged name for {} after {} attempts",
            base_name, MAX_ALLOCATION_ATTEMPTS
        )))
    }

    async fn release(&self, path: &Path) -> StorageResult<()> {
        self.check_owned(path)?;
        release_path(path).await
    }
}
