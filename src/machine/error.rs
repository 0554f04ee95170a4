//! Errors reported by the orchestrator.

use crate::core::TaskError;
use thiserror::Error;

/// Errors returned from driving a [`StateMachine`](super::StateMachine).
#[derive(Debug, Error)]
pub enum MachineError {
    /// A continuation of the current state reported a failure
    #[error("Continuation of state '{state}' failed")]
    TaskFailed {
        state: String,
        #[source]
        source: TaskError,
    },

    /// Awaiting a nested task would park more continuations than allowed
    #[error("Awaiting '{task}' exceeds the continuation stack limit ({limit})")]
    StackDepthExceeded { task: String, limit: usize },

    /// `run` was called from inside a continuation
    #[error("run() called while a tick is already in progress")]
    ReentrantRun,
}
