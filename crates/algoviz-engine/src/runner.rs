//! Runs one algorithm on its own worker thread.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::algorithms::{AlgoResult, Algorithm};
use crate::cancel::CancellationToken;
use crate::clock::AnimationClock;
use crate::config::EngineConfig;
use crate::context::RunContext;
use crate::error::{Error, Interrupt, Result};
use crate::input::{self, RunRequest};
use crate::playback::{PlaybackController, SpeedControl};
use crate::render::{self, EventSink, EventStream, VisEvent};

/// Lifecycle of one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl RunState {
    /// Whether the run has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunState::Completed | RunState::Cancelled | RunState::Failed
        )
    }
}

/// Why a run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The algorithm panicked
    Panic,
}

/// Work counted over one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub comparisons: u64,
    pub writes: u64,
    /// Step boundaries passed; zero for a non-visualized run
    pub steps: u64,
    pub elapsed_micros: u64,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Completed { result: AlgoResult },
    Cancelled,
    Failed { kind: FailureKind, message: String },
}

impl Outcome {
    /// Terminal state reached with this outcome.
    pub fn state(&self) -> RunState {
        match self {
            Outcome::Completed { .. } => RunState::Completed,
            Outcome::Cancelled => RunState::Cancelled,
            Outcome::Failed { .. } => RunState::Failed,
        }
    }

    /// The result, if the algorithm finished.
    pub fn result(&self) -> Option<AlgoResult> {
        match self {
            Outcome::Completed { result } => Some(*result),
            _ => None,
        }
    }

    fn into_event(self, stats: RunStats, values: &[i64]) -> VisEvent {
        match self {
            Outcome::Completed { result } => VisEvent::Completed {
                result,
                values: values.to_vec(),
                stats,
            },
            Outcome::Cancelled => VisEvent::Cancelled,
            Outcome::Failed { kind, message } => VisEvent::Failed { kind, message },
        }
    }
}

/// Everything known about a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub algorithm: String,
    pub outcome: Outcome,
    /// Data as the algorithm left it; partially processed when cancelled
    pub values: Vec<i64>,
    pub stats: RunStats,
}

/// A validated run, ready to start once.
pub struct AlgorithmRunner {
    algorithm: Arc<dyn Algorithm>,
    values: Vec<i64>,
    target: Option<i64>,
    visualize: bool,
    delay_scale: f64,
    event_capacity: usize,
}

impl std::fmt::Debug for AlgorithmRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgorithmRunner")
            .field("algorithm", &self.algorithm.name())
            .field("len", &self.values.len())
            .field("target", &self.target)
            .field("visualize", &self.visualize)
            .finish()
    }
}

impl AlgorithmRunner {
    /// Validate `request` against `config`. Nothing starts on failure.
    pub fn new(request: RunRequest, config: &EngineConfig) -> Result<Self> {
        Self::with_algorithm(
            request.algorithm.strategy(),
            request.values,
            request.target,
            request.visualize,
            config,
        )
    }

    /// Validate a run of any strategy.
    pub fn with_algorithm(
        algorithm: Arc<dyn Algorithm>,
        values: Vec<i64>,
        target: Option<i64>,
        visualize: bool,
        config: &EngineConfig,
    ) -> Result<Self> {
        input::validate(algorithm.as_ref(), &values, target, config.max_len)?;
        Ok(Self {
            algorithm,
            values,
            target,
            visualize,
            delay_scale: config.delay_scale,
            event_capacity: config.event_capacity,
        })
    }

    /// Spawn the worker thread.
    ///
    /// The returned stream yields every visual event in issue order and ends
    /// with exactly one terminal event.
    pub fn start(
        self,
        controller: PlaybackController,
        speed: SpeedControl,
    ) -> Result<(RunHandle, EventStream)> {
        let token = CancellationToken::new();
        let (sink, stream) = render::channel(self.event_capacity, token.clone());
        let state = Arc::new(Mutex::new(RunState::Running));
        let name = self.algorithm.name().to_string();

        let job = Job {
            algorithm: self.algorithm,
            values: self.values,
            target: self.target,
            visualize: self.visualize,
            delay_scale: self.delay_scale,
            controller: controller.clone(),
            speed,
            token: token.clone(),
            sink,
            state: state.clone(),
        };
        let worker = thread::Builder::new()
            .name(format!("algoviz-{}", name.to_lowercase().replace(' ', "-")))
            .spawn(move || job.execute())
            .map_err(|e| Error::Spawn(e.to_string()))?;

        tracing::info!(algorithm = %name, visualize = self.visualize, "run started");
        let handle = RunHandle {
            algorithm: name,
            token,
            controller,
            state,
            worker: Some(worker),
        };
        Ok((handle, stream))
    }
}

struct Job {
    algorithm: Arc<dyn Algorithm>,
    values: Vec<i64>,
    target: Option<i64>,
    visualize: bool,
    delay_scale: f64,
    controller: PlaybackController,
    speed: SpeedControl,
    token: CancellationToken,
    sink: EventSink,
    state: Arc<Mutex<RunState>>,
}

impl Job {
    fn execute(self) -> RunReport {
        let Job {
            algorithm,
            mut values,
            target,
            visualize,
            delay_scale,
            controller,
            speed,
            token,
            sink,
            state,
        } = self;
        let started = Instant::now();

        let mut ctx = if visualize {
            let clock = AnimationClock::new(controller, speed, token.clone(), delay_scale);
            RunContext::visualized(sink.clone(), token.clone(), clock)
        } else {
            RunContext::headless(sink.clone(), token.clone())
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            algorithm.run(&mut values, target, &mut ctx)
        }));
        let stats = RunStats {
            comparisons: ctx.comparisons(),
            writes: ctx.writes(),
            steps: ctx.boundaries(),
            elapsed_micros: started.elapsed().as_micros() as u64,
        };
        drop(ctx);

        let name = algorithm.name().to_string();
        let outcome = match result {
            Ok(Ok(result)) => Outcome::Completed { result },
            Ok(Err(Interrupt::Cancelled)) => Outcome::Cancelled,
            Ok(Err(Interrupt::SyncFailure(reason))) => {
                tracing::warn!(algorithm = %name, %reason, "run stopped by synchronization failure");
                Outcome::Cancelled
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::warn!(algorithm = %name, %message, "algorithm panicked");
                Outcome::Failed {
                    kind: FailureKind::Panic,
                    message,
                }
            }
        };

        // Terminal state is published only after the terminal event is queued.
        sink.emit_terminal(outcome.clone().into_event(stats.clone(), &values));
        *state.lock().unwrap_or_else(PoisonError::into_inner) = outcome.state();
        tracing::info!(
            algorithm = %name,
            state = ?outcome.state(),
            comparisons = stats.comparisons,
            steps = stats.steps,
            "run finished"
        );

        RunReport {
            algorithm: name,
            outcome,
            values,
            stats,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "algorithm panicked".to_string()
    }
}

/// Caller-side handle to a started run.
///
/// Dropping the handle before [`RunHandle::join`] cancels the run so a
/// paused worker is not left blocked.
#[derive(Debug)]
pub struct RunHandle {
    algorithm: String,
    token: CancellationToken,
    controller: PlaybackController,
    state: Arc<Mutex<RunState>>,
    worker: Option<JoinHandle<RunReport>>,
}

impl RunHandle {
    /// Name of the running algorithm.
    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Request cancellation. The worker stops at its next boundary.
    pub fn cancel(&self) {
        if !self.token.is_cancelled() {
            tracing::info!(algorithm = %self.algorithm, "run cancel requested");
        }
        self.token.cancel();
    }

    /// Whether the worker thread has exited.
    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// The run's cancellation token.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// The run's playback controller.
    pub fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    /// Wait for the worker and collect its report.
    ///
    /// The event stream must be drained (or dropped) concurrently, or a
    /// worker blocked on a full queue never finishes.
    pub fn join(mut self) -> RunReport {
        let worker = self.worker.take();
        match worker.map(JoinHandle::join) {
            Some(Ok(report)) => report,
            Some(Err(payload)) => self.lost_report(panic_message(payload.as_ref())),
            None => self.lost_report("run already joined".to_string()),
        }
    }

    /// Let go of a run in a terminal state without blocking.
    ///
    /// A worker that already exited is joined; one still unwinding its
    /// thread is detached. Neither is cancelled.
    pub(crate) fn release(mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.is_finished() {
                let _ = worker.join();
            }
        }
    }

    fn lost_report(&self, message: String) -> RunReport {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = RunState::Failed;
        RunReport {
            algorithm: self.algorithm.clone(),
            outcome: Outcome::Failed {
                kind: FailureKind::Panic,
                message,
            },
            values: Vec::new(),
            stats: RunStats::default(),
        }
    }
}

impl Drop for RunHandle {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::{AlgorithmId, AlgorithmKind};
    use crate::render::ColorTag;
    use std::time::Duration;

    fn instant() -> EngineConfig {
        EngineConfig::instant()
    }

    fn start(request: RunRequest, controller: PlaybackController) -> (RunHandle, EventStream) {
        AlgorithmRunner::new(request, &instant())
            .unwrap()
            .start(controller, SpeedControl::default())
            .unwrap()
    }

    struct Panicking;

    impl Algorithm for Panicking {
        fn name(&self) -> &str {
            "Panicking"
        }

        fn kind(&self) -> AlgorithmKind {
            AlgorithmKind::Sort
        }

        fn run(
            &self,
            _data: &mut [i64],
            _target: Option<i64>,
            ctx: &mut RunContext,
        ) -> std::result::Result<AlgoResult, Interrupt> {
            ctx.status("about to fail");
            panic!("comparator exploded");
        }
    }

    #[test]
    fn completed_run_reports_result_and_stats() {
        let request = RunRequest::new(AlgorithmId::InsertionSort, vec![5, 3, 8, 1]);
        let (handle, stream) = start(request, PlaybackController::new());
        let events = stream.collect_blocking();
        let report = handle.join();

        assert_eq!(report.values, vec![1, 3, 5, 8]);
        assert_eq!(report.outcome.result(), Some(AlgoResult::Sorted));
        assert!(report.stats.comparisons > 0);
        assert!(report.stats.steps > 0);
        assert!(matches!(events.last(), Some(VisEvent::Completed { .. })));
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);
    }

    #[test]
    fn invalid_request_never_starts() {
        let request = RunRequest::new(AlgorithmId::BinarySearch, vec![3, 1]).with_target(1);
        let err = AlgorithmRunner::new(request, &instant()).unwrap_err();
        assert!(matches!(err, Error::Precondition { .. }));

        let empty = RunRequest::new(AlgorithmId::BubbleSort, vec![]);
        assert!(AlgorithmRunner::new(empty, &instant()).is_err());
    }

    #[test]
    fn cancel_while_paused_unblocks_worker() {
        let request = RunRequest::new(AlgorithmId::BubbleSort, vec![4, 3, 2, 1]);
        let (handle, stream) = start(request, PlaybackController::paused());

        thread::sleep(Duration::from_millis(20));
        assert_eq!(handle.state(), RunState::Running);
        handle.cancel();

        let events = stream.collect_blocking();
        let report = handle.join();
        assert_eq!(report.outcome, Outcome::Cancelled);
        assert_eq!(events.last(), Some(&VisEvent::Cancelled));
    }

    #[test]
    fn panic_becomes_failed_outcome() {
        let runner = AlgorithmRunner::with_algorithm(
            Arc::new(Panicking),
            vec![1, 2],
            None,
            true,
            &instant(),
        )
        .unwrap();
        let (handle, stream) = runner.start(PlaybackController::new(), SpeedControl::default()).unwrap();
        let events = stream.collect_blocking();
        let report = handle.join();

        assert_eq!(report.outcome.state(), RunState::Failed);
        assert!(matches!(
            events.last(),
            Some(VisEvent::Failed { message, .. }) if message.contains("comparator exploded")
        ));
    }

    #[test]
    fn headless_run_emits_no_visual_events() {
        let request = RunRequest::new(AlgorithmId::QuickSort, vec![3, 9, 1, 7]).visualize(false);
        let (handle, stream) = start(request, PlaybackController::paused());
        let events = stream.collect_blocking();
        let report = handle.join();

        // A paused controller does not gate a non-visualized run.
        assert_eq!(report.values, vec![1, 3, 7, 9]);
        assert_eq!(report.stats.steps, 0);
        assert!(events
            .iter()
            .all(|e| matches!(e, VisEvent::Progress { .. } | VisEvent::Completed { .. })));
    }

    #[test]
    fn dropping_the_stream_ends_the_run() {
        let request = RunRequest::new(AlgorithmId::SelectionSort, (0..50).rev().collect());
        let (handle, stream) = start(request, PlaybackController::new());
        drop(stream);

        let report = handle.join();
        assert_eq!(report.outcome, Outcome::Cancelled);
    }

    #[test]
    fn search_result_reaches_completed_event() {
        let request =
            RunRequest::new(AlgorithmId::LinearSearch, vec![4, 2, 9]).with_target(9);
        let (handle, stream) = start(request, PlaybackController::new());
        let events = stream.collect_blocking();
        handle.join();

        assert!(events.contains(&VisEvent::Highlight {
            index: 2,
            tag: ColorTag::Found
        }));
        assert!(matches!(
            events.last(),
            Some(VisEvent::Completed {
                result: AlgoResult::Found { index: 2 },
                ..
            })
        ));
    }

    #[test]
    fn outcome_serialization() {
        let json = serde_json::to_string(&Outcome::Completed {
            result: AlgoResult::NotFound,
        })
        .unwrap();
        assert_eq!(json, r#"{"outcome":"completed","result":{"kind":"not_found"}}"#);
    }
}
