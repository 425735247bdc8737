//! Command surface for a UI driving one run at a time.

use std::sync::Arc;

use crate::algorithms::Algorithm;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::input::RunRequest;
use crate::playback::{AnimationSpeed, PlaybackController, PlaybackStatus, SpeedControl};
use crate::render::EventStream;
use crate::runner::{AlgorithmRunner, RunHandle, RunReport, RunState};

/// Owns the active run and the speed shared across runs.
///
/// Every run gets a fresh controller, token and context. Speed is the only
/// setting carried from one run to the next.
#[derive(Debug)]
pub struct Session {
    config: EngineConfig,
    speed: SpeedControl,
    active: Option<RunHandle>,
    last_input: Option<Vec<i64>>,
}

impl Session {
    /// Create an idle session.
    pub fn new(config: EngineConfig) -> Self {
        let speed = SpeedControl::new(config.default_speed);
        Self {
            config,
            speed,
            active: None,
            last_input: None,
        }
    }

    /// Session configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Validate and start a run.
    ///
    /// Rejected with [`Error::RunInProgress`] until the previous run has
    /// queued its terminal event. A finished run is released without
    /// blocking.
    pub fn start_run(&mut self, request: RunRequest) -> Result<EventStream> {
        let RunRequest {
            algorithm,
            values,
            target,
            visualize,
        } = request;
        self.start_algorithm(algorithm.strategy(), values, target, visualize)
    }

    /// Start a run of any strategy, under the same rules as [`Session::start_run`].
    pub fn start_algorithm(
        &mut self,
        algorithm: Arc<dyn Algorithm>,
        values: Vec<i64>,
        target: Option<i64>,
        visualize: bool,
    ) -> Result<EventStream> {
        if self.is_running() {
            return Err(Error::RunInProgress);
        }
        if let Some(previous) = self.active.take() {
            previous.release();
        }

        let input = values.clone();
        let runner =
            AlgorithmRunner::with_algorithm(algorithm, values, target, visualize, &self.config)?;
        let controller = if self.config.start_paused {
            PlaybackController::paused()
        } else {
            PlaybackController::new()
        };
        let (handle, stream) = runner.start(controller, self.speed.clone())?;
        self.active = Some(handle);
        self.last_input = Some(input);
        Ok(stream)
    }

    /// Pause the active run.
    pub fn pause(&self) -> Result<()> {
        self.controller()?.pause();
        Ok(())
    }

    /// Resume the active run.
    pub fn play(&self) -> Result<()> {
        self.controller()?.play();
        Ok(())
    }

    /// Allow one step of the active run.
    pub fn step(&self) -> Result<()> {
        self.controller()?.step();
        Ok(())
    }

    /// Cancel the active run and release its controller.
    ///
    /// Returns the input of the most recent run so the caller can redisplay
    /// it, or `None` if nothing has run yet.
    pub fn reset(&mut self) -> Option<Vec<i64>> {
        if let Some(handle) = &self.active {
            handle.cancel();
            handle.controller().reset();
        }
        tracing::debug!("session reset");
        self.last_input.clone()
    }

    /// Change the animation speed. Takes effect at the next wait.
    pub fn set_speed(&self, multiplier: f64) -> AnimationSpeed {
        let speed = AnimationSpeed::new(multiplier);
        self.speed.set(speed);
        tracing::debug!(speed = speed.multiplier(), "speed changed");
        speed
    }

    /// Current animation speed.
    pub fn speed(&self) -> AnimationSpeed {
        self.speed.get()
    }

    /// Cancel the active run.
    pub fn cancel_run(&self) -> Result<()> {
        self.active.as_ref().ok_or(Error::NoActiveRun)?.cancel();
        Ok(())
    }

    /// Playback status of the active run.
    pub fn playback_status(&self) -> Option<PlaybackStatus> {
        self.active
            .as_ref()
            .map(|handle| PlaybackStatus::capture(handle.controller(), &self.speed))
    }

    /// State of the most recent run, if any.
    pub fn run_state(&self) -> Option<RunState> {
        self.active.as_ref().map(RunHandle::state)
    }

    /// Whether the active run has yet to reach a terminal state.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|handle| !handle.is_finished() && !handle.state().is_terminal())
    }

    /// Wait for the active run to end and return its report.
    ///
    /// Blocks until the worker exits; its event stream must be drained or
    /// dropped meanwhile.
    pub fn finish(&mut self) -> Option<RunReport> {
        self.active.take().map(RunHandle::join)
    }

    fn controller(&self) -> Result<&PlaybackController> {
        self.active
            .as_ref()
            .map(RunHandle::controller)
            .ok_or(Error::NoActiveRun)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
