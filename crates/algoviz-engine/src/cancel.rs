//! Per-run cancellation token.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use crate::signal::StepSignal;

/// Cooperative cancellation flag for one algorithm run.
///
/// Cloning shares the flag. Once set it stays set; a new run gets a fresh
/// token. Setting it wakes every [`StepSignal`] the token watches, so a
/// worker blocked on a paused controller or inside a clock sleep returns
/// promptly instead of waiting for the next grant.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenInner>,
}

#[derive(Debug, Default)]
struct TokenInner {
    cancelled: AtomicBool,
    watched: Mutex<Vec<Weak<StepSignal>>>,
}

impl CancellationToken {
    /// Create an unset token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the token and wake any watched signal. Repeated calls are no-ops.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        let watched: Vec<_> = self
            .inner
            .watched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();
        for signal in watched.iter().filter_map(Weak::upgrade) {
            signal.wake_all();
        }
    }

    /// Whether the token has been set.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Register a signal to be woken on cancellation.
    pub(crate) fn watch(&self, signal: &Arc<StepSignal>) {
        self.inner
            .watched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::downgrade(signal));
        // Cancelled between the caller's check and the push above.
        if self.is_cancelled() {
            signal.wake_all();
        }
    }
}
