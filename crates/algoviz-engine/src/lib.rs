//! Algoviz Engine
//!
//! Animation playback and step synchronization for sorting and searching
//! visualizations.
//!
//! # Architecture
//!
//! - **Runner**: Each algorithm runs on its own worker thread
//! - **Playback**: Pause, play, single-step and reset gate the worker at step boundaries
//! - **Clock**: Speed-scaled delays between visible steps, interruptible by cancellation
//! - **Render**: Visual updates flow in FIFO order to one render context
//!
//! # Usage
//!
//! ```ignore
//! let mut session = Session::new(EngineConfig::from_env());
//! let mut events = session.start_run(RunRequest::new(AlgorithmId::QuickSort, values))?;
//!
//! while let Some(event) = events.recv().await {
//!     model.apply(&event);
//! }
//! ```

pub mod algorithms;
mod cancel;
mod clock;
mod config;
mod context;
mod error;
pub mod input;
mod playback;
mod render;
mod runner;
mod session;
mod signal;

pub use algorithms::{AlgoResult, Algorithm, AlgorithmId, AlgorithmKind};
pub use cancel::CancellationToken;
pub use clock::AnimationClock;
pub use config::EngineConfig;
pub use context::RunContext;
pub use error::{Error, Interrupt, Result};
pub use input::RunRequest;
pub use playback::{AnimationSpeed, PlaybackController, PlaybackState, PlaybackStatus, SpeedControl};
pub use render::{ColorTag, EventStream, RenderSync, VisEvent, VisualElement, VisualModel};
pub use runner::{AlgorithmRunner, FailureKind, Outcome, RunHandle, RunReport, RunState, RunStats};
pub use session::Session;
pub use signal::{SignalMode, SignalSnapshot, StepSignal};
