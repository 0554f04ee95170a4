//! Errors raised by continuations.

use thiserror::Error;

/// Errors a continuation can report when it is resumed.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TaskError {
    #[error("Task '{task}' was resumed after it completed")]
    ResumedAfterCompletion { task: String },

    #[error("Task '{task}' failed: {reason}")]
    Failed { task: String, reason: String },
}

impl TaskError {
    /// Shorthand for a body reporting its own failure.
    pub fn failed(task: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            task: task.into(),
            reason: reason.into(),
        }
    }
}
