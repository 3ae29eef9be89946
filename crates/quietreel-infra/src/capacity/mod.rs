//! Transcode admission control
//!
//! Bounds the number of transcoder subprocesses running at once across the whole process.
//! Requests beyond the limit wait for a slot instead of spawning more processes.

use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore};

/// Process-wide pool of transcode slots
#[derive(Clone, Debug)]
pub struct TranscodeSlots {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl TranscodeSlots {
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Wait for a free slot. The slot is returned when the permit is dropped.
    pub async fn acquire(&self) -> Result<OwnedSemaphorePermit, AcquireError> {
        if self.available() == 0 {
            tracing::debug!(limit = self.limit, "All transcode slots busy, waiting");
        }
        self.semaphore.clone().acquire_owned().await
    }
}
