//! Cooperative cancellation of in-flight runs

use crate::error::{TerrainError, TerrainResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag checked by band workers between units of work
///
/// Clones observe the same flag. A cancelled run stops at the next check and
/// discards its buffers; nothing already published is touched.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every run holding this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// `Err(Cancelled)` once cancellation has been requested
    pub fn check(&self) -> TerrainResult<()> {
        if self.is_cancelled() {
            Err(TerrainError::Cancelled)
        } else {
            Ok(())
        }
    }
}
