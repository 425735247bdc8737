//! Cross-thread step gate between playback controls and the worker.
//!
//! The worker calls [`StepSignal::await_permission`] at each step boundary.
//! In `Open` mode it passes straight through; in `Gated` mode it needs a
//! permit. Permits are a durable counter rather than a notification, so a
//! `grant_one` issued before the worker reaches the gate is never lost.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::cancel::CancellationToken;
use crate::error::Interrupt;

/// Whether waiters pass freely or need a permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMode {
    /// Every wait returns immediately.
    Open,
    /// Each wait consumes one permit, blocking until one exists.
    Gated,
}

/// Consistent view of the signal, taken under its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSnapshot {
    pub mode: SignalMode,
    /// Granted but not yet consumed.
    pub permits: u64,
    /// Permits consumed by the worker over the signal's lifetime.
    pub consumed: u64,
}

/// Condvar-backed gate with "release one" and "keep releasing" modes.
#[derive(Debug)]
pub struct StepSignal {
    state: Mutex<SignalSnapshot>,
    cond: Condvar,
}

impl Default for StepSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StepSignal {
    /// Create a free-running signal.
    pub fn new() -> Self {
        Self::with_mode(SignalMode::Open)
    }

    /// Create a signal in the given mode with no permits.
    pub fn with_mode(mode: SignalMode) -> Self {
        Self {
            state: Mutex::new(SignalSnapshot {
                mode,
                permits: 0,
                consumed: 0,
            }),
            cond: Condvar::new(),
        }
    }

    /// Block until allowed to pass, or until `token` is cancelled.
    pub fn await_permission(&self, token: &CancellationToken) -> Result<(), Interrupt> {
        let mut state = self.lock_for_worker()?;
        loop {
            if token.is_cancelled() {
                return Err(Interrupt::Cancelled);
            }
            match state.mode {
                SignalMode::Open => return Ok(()),
                SignalMode::Gated if state.permits > 0 => {
                    state.permits -= 1;
                    state.consumed += 1;
                    return Ok(());
                }
                SignalMode::Gated => {}
            }
            state = self.cond.wait(state).map_err(poisoned)?;
        }
    }

    /// Sleep for `duration`, waking early only if `token` is cancelled.
    ///
    /// Mode changes do not shorten the sleep.
    pub fn sleep(&self, duration: Duration, token: &CancellationToken) -> Result<(), Interrupt> {
        let deadline = Instant::now() + duration;
        let mut state = self.lock_for_worker()?;
        loop {
            if token.is_cancelled() {
                return Err(Interrupt::Cancelled);
            }
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            let (guard, _) = self
                .cond
                .wait_timeout(state, deadline - now)
                .map_err(poisoned)?;
            state = guard;
        }
    }

    /// Switch to `Open` and wake every waiter.
    pub fn grant_continuous(&self) {
        let mut state = self.lock();
        state.mode = SignalMode::Open;
        state.permits = 0;
        drop(state);
        self.cond.notify_all();
    }

    /// Add one durable permit and wake the waiter.
    pub fn grant_one(&self) {
        let mut state = self.lock();
        state.permits = state.permits.saturating_add(1);
        drop(state);
        // `sleep` shares the condvar.
        self.cond.notify_all();
    }

    /// Switch to `Gated`, keeping permits already granted.
    pub fn gate(&self) {
        self.lock().mode = SignalMode::Gated;
    }

    /// Switch to `Open` and drop pending permits without counting them.
    pub fn release(&self) {
        self.grant_continuous();
    }

    /// Wake all waiters so they re-check cancellation.
    pub fn wake_all(&self) {
        drop(self.lock());
        self.cond.notify_all();
    }

    /// Current mode and counters.
    pub fn snapshot(&self) -> SignalSnapshot {
        *self.lock()
    }

    // Control-side callers only touch plain counters, so a poisoned lock
    // still holds a consistent state.
    fn lock(&self) -> MutexGuard<'_, SignalSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_for_worker(&self) -> Result<MutexGuard<'_, SignalSnapshot>, Interrupt> {
        self.state.lock().map_err(poisoned)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> Interrupt {
    Interrupt::SyncFailure("step signal lock poisoned".to_string())
}
