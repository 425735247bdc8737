//! Speed-scaled pacing between visible steps.

use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::error::Interrupt;
use crate::playback::{PlaybackController, SpeedControl};

/// Turns "pause here for visual effect" into a real delay, gated by playback.
///
/// Blocking for the user (indefinite, while paused) happens before the
/// delay is computed, so paused time never counts as animation time and a
/// speed change made while paused applies to the next delay.
#[derive(Debug)]
pub struct AnimationClock {
    controller: PlaybackController,
    speed: SpeedControl,
    token: CancellationToken,
    delay_scale: f64,
    boundaries: u64,
}

impl AnimationClock {
    /// Create a clock for one run.
    ///
    /// `delay_scale` multiplies every base delay; 0 disables sleeping while
    /// keeping the playback gate.
    pub fn new(
        controller: PlaybackController,
        speed: SpeedControl,
        token: CancellationToken,
        delay_scale: f64,
    ) -> Self {
        controller.watch(&token);
        Self {
            controller,
            speed,
            token,
            delay_scale: sanitize_scale(delay_scale),
            boundaries: 0,
        }
    }

    /// Wait at a step boundary: gate on playback, then sleep the scaled delay.
    pub fn wait(&mut self, base_ms: u64) -> Result<(), Interrupt> {
        self.controller.await_permission(&self.token)?;
        self.boundaries += 1;
        let delay = self.delay_for(base_ms);
        if delay.is_zero() {
            return if self.token.is_cancelled() {
                Err(Interrupt::Cancelled)
            } else {
                Ok(())
            };
        }
        self.controller.signal().sleep(delay, &self.token)
    }

    /// Delay for `base_ms` at the current speed.
    pub fn delay_for(&self, base_ms: u64) -> Duration {
        let speed = self.speed.get().multiplier();
        let millis = base_ms as f64 * self.delay_scale / speed;
        Duration::from_secs_f64(millis / 1000.0)
    }

    /// Step boundaries passed so far.
    pub fn boundaries(&self) -> u64 {
        self.boundaries
    }
}

fn sanitize_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale >= 0.0 {
        scale
    } else {
        1.0
    }
}
