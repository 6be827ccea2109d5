//! Cooperative cancellation for long-running stages

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::error::{PrepError, PrepResult};

/// Thread-safe cancellation flag.
///
/// Clones share the same flag, so a caller can keep one handle and pass
/// another into the coordinator. Workers check it between per-point and
/// per-pair work units; a cancelled stage returns [`PrepError::Cancelled`]
/// and never a partially built table.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Return `Err(Cancelled)` once cancellation has been requested
    #[inline]
    pub fn check(&self) -> PrepResult<()> {
        if self.is_cancelled() {
            Err(PrepError::Cancelled)
        } else {
            Ok(())
        }
    }
}
