//! Playback controls for a running visualization.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cancel::CancellationToken;
use crate::error::Interrupt;
use crate::signal::{SignalMode, SignalSnapshot, StepSignal};

/// Animation speed multiplier, clamped to `[MIN, MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct AnimationSpeed(f64);

impl AnimationSpeed {
    /// Slowest speed: delays are ten times their base.
    pub const MIN: f64 = 0.1;
    /// Fastest speed: delays are half their base.
    pub const MAX: f64 = 2.0;
    /// Normal speed (1x).
    pub const NORMAL: AnimationSpeed = AnimationSpeed(1.0);

    /// Create a speed, clamping into range. NaN maps to normal speed.
    pub fn new(multiplier: f64) -> Self {
        if multiplier.is_nan() {
            return Self::NORMAL;
        }
        Self(multiplier.clamp(Self::MIN, Self::MAX))
    }

    /// Get the speed multiplier.
    pub fn multiplier(&self) -> f64 {
        self.0
    }
}

impl Default for AnimationSpeed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<f64> for AnimationSpeed {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<AnimationSpeed> for f64 {
    fn from(speed: AnimationSpeed) -> Self {
        speed.0
    }
}

/// Shared speed cell written by the UI and read by the clock on every wait.
#[derive(Debug, Clone)]
pub struct SpeedControl {
    bits: Arc<AtomicU64>,
}

impl SpeedControl {
    /// Create a control holding `speed`.
    pub fn new(speed: AnimationSpeed) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(speed.multiplier().to_bits())),
        }
    }

    /// Current speed.
    pub fn get(&self) -> AnimationSpeed {
        AnimationSpeed(f64::from_bits(self.bits.load(Ordering::Relaxed)))
    }

    /// Replace the speed. Waits already sleeping keep their delay.
    pub fn set(&self, speed: AnimationSpeed) {
        self.bits.store(speed.multiplier().to_bits(), Ordering::Relaxed);
    }
}

impl Default for SpeedControl {
    fn default() -> Self {
        Self::new(AnimationSpeed::default())
    }
}

/// Current state of playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Steps run back to back, paced only by the clock
    Running,
    /// The worker blocks at its next step boundary
    Paused,
    /// One or more single steps granted but not yet taken
    SteppingOne,
}

impl From<SignalSnapshot> for PlaybackState {
    fn from(snap: SignalSnapshot) -> Self {
        match snap.mode {
            SignalMode::Open => PlaybackState::Running,
            SignalMode::Gated if snap.permits > 0 => PlaybackState::SteppingOne,
            SignalMode::Gated => PlaybackState::Paused,
        }
    }
}

/// Playback controller for one algorithm run.
///
/// Transition methods are called from the UI side; the worker only calls
/// [`PlaybackController::await_permission`]. State is derived from the
/// underlying [`StepSignal`] under its lock, so `SteppingOne` falls back to
/// `Paused` exactly when the worker consumes the last granted permit.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    signal: Arc<StepSignal>,
}

impl Default for PlaybackController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackController {
    /// Create a controller in the `Running` state.
    pub fn new() -> Self {
        Self {
            signal: Arc::new(StepSignal::new()),
        }
    }

    /// Create a controller that starts `Paused`.
    pub fn paused() -> Self {
        Self {
            signal: Arc::new(StepSignal::with_mode(SignalMode::Gated)),
        }
    }

    /// Get the current playback state.
    pub fn state(&self) -> PlaybackState {
        PlaybackState::from(self.signal.snapshot())
    }

    /// Pause playback. Steps already granted are still taken.
    pub fn pause(&self) {
        self.signal.gate();
        tracing::debug!("playback paused");
    }

    /// Resume free-running playback.
    pub fn play(&self) {
        self.signal.grant_continuous();
        tracing::debug!("playback running");
    }

    /// Allow exactly one more step boundary, pausing first if running.
    pub fn step(&self) {
        if self.state() == PlaybackState::Running {
            self.signal.gate();
        }
        self.signal.grant_one();
        tracing::debug!("playback stepped");
    }

    /// Force `Running`, releasing a blocked worker without counting a step.
    pub fn reset(&self) {
        self.signal.release();
        tracing::debug!("playback reset");
    }

    /// Worker-side gate, called at each step boundary.
    pub fn await_permission(&self, token: &CancellationToken) -> Result<(), Interrupt> {
        self.signal.await_permission(token)
    }

    /// Steps granted and not yet taken.
    pub fn pending_steps(&self) -> u64 {
        self.signal.snapshot().permits
    }

    /// Single steps taken by the worker so far.
    pub fn steps_taken(&self) -> u64 {
        self.signal.snapshot().consumed
    }

    /// Make `token` wake this controller's waiters on cancellation.
    pub fn watch(&self, token: &CancellationToken) {
        token.watch(&self.signal);
    }

    pub(crate) fn signal(&self) -> &Arc<StepSignal> {
        &self.signal
    }
}

/// Playback status for sending to frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub state: PlaybackState,
    pub pending_steps: u64,
    pub steps_taken: u64,
    pub speed: AnimationSpeed,
}

impl PlaybackStatus {
    /// Capture the controller and speed at this instant.
    pub fn capture(controller: &PlaybackController, speed: &SpeedControl) -> Self {
        let snap = controller.signal.snapshot();
        Self {
            state: PlaybackState::from(snap),
            pending_steps: snap.permits,
            steps_taken: snap.consumed,
            speed: speed.get(),
        }
    }
}
