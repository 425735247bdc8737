//! Error types for algoviz-engine.

use thiserror::Error;

/// Result type for algoviz-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced synchronously to the caller, before or between runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed size or element input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A search was requested without a target value.
    #[error("{0} requires a search target")]
    MissingTarget(String),

    /// The input does not satisfy the algorithm's precondition.
    #[error("{algorithm} cannot run on this input: {reason}")]
    Precondition {
        algorithm: String,
        reason: String,
    },

    /// No algorithm matches the given name.
    #[error("unknown algorithm: {0}")]
    UnknownAlgorithm(String),

    /// A run is already active on this session.
    #[error("a run is already in progress")]
    RunInProgress,

    /// The command needs an active run.
    #[error("no active run")]
    NoActiveRun,

    /// The OS refused to start the worker thread.
    #[error("failed to start worker thread: {0}")]
    Spawn(String),
}

/// Why a run stopped before its algorithm finished.
///
/// Returned from every wait so algorithms can unwind with `?`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Interrupt {
    /// The run's cancellation token was set.
    #[error("run cancelled")]
    Cancelled,

    /// The playback signal or render channel broke underneath the run.
    #[error("synchronization failure: {0}")]
    SyncFailure(String),
}
