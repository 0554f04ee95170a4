//! Owned handles to continuations.

use super::continuation::{Continuation, Step};
use super::error::TaskError;
use crate::machine::StateMachine;
use std::borrow::Cow;
use std::fmt;

/// Lifecycle of a [`Task`].
///
/// A destroyed task has no status: destroying consumes the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Waiting to be resumed (also the state before the first resume).
    Suspended,
    /// Currently inside `resume`.
    Running,
    /// Ran to completion. Never resumed again.
    Completed,
    /// Aborted by the machine. Every later resume reports the stored error.
    Failed,
}

/// Opaque, owned handle to a continuation.
///
/// The machine treats every task purely through `resume`, `is_complete`
/// and `destroy`. Creating a task runs nothing; the body first executes on
/// its first resume.
pub struct Task {
    name: Cow<'static, str>,
    body: Box<dyn Continuation>,
    status: TaskStatus,
    failure: Option<TaskError>,
}

impl Task {
    /// Wrap any continuation in a task handle.
    pub fn new<C>(name: impl Into<Cow<'static, str>>, body: C) -> Self
    where
        C: Continuation + 'static,
    {
        Self {
            name: name.into(),
            body: Box::new(body),
            status: TaskStatus::Suspended,
            failure: None,
        }
    }

    /// Create a task from a closure body.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tickstate::{Step, Task};
    ///
    /// let mut ticks = 0;
    /// let task = Task::from_fn("count_to_three", move |_machine| {
    ///     ticks += 1;
    ///     if ticks < 3 {
    ///         Ok(Step::Yield)
    ///     } else {
    ///         Ok(Step::Complete)
    ///     }
    /// });
    /// assert_eq!(task.name(), "count_to_three");
    /// assert!(!task.is_complete());
    /// ```
    pub fn from_fn<F>(name: impl Into<Cow<'static, str>>, body: F) -> Self
    where
        F: FnMut(&mut StateMachine) -> Result<Step, TaskError> + 'static,
    {
        Self::new(name, body)
    }

    /// A task that stays suspended for `ticks` resumes, then completes.
    pub fn wait_ticks(ticks: u32) -> Self {
        let mut remaining = ticks;
        Self::from_fn("wait_ticks", move |_| {
            if remaining == 0 {
                return Ok(Step::Complete);
            }
            remaining -= 1;
            Ok(Step::Yield)
        })
    }

    /// A task that completes on the first resume where `predicate` holds.
    pub fn wait_until<P>(mut predicate: P) -> Self
    where
        P: FnMut() -> bool + 'static,
    {
        Self::from_fn("wait_until", move |_| {
            if predicate() {
                Ok(Step::Complete)
            } else {
                Ok(Step::Yield)
            }
        })
    }

    /// A task that runs `action` on its first resume and completes.
    ///
    /// The action can only run once, so an error is final: every later
    /// resume reports the same error instead of completing.
    pub fn once<F>(name: impl Into<Cow<'static, str>>, action: F) -> Self
    where
        F: FnOnce(&mut StateMachine) -> Result<(), TaskError> + 'static,
    {
        let mut action = Some(action);
        let mut failure: Option<TaskError> = None;
        Self::from_fn(name, move |machine| {
            if let Some(error) = &failure {
                return Err(error.clone());
            }
            if let Some(action) = action.take() {
                if let Err(error) = action(machine) {
                    failure = Some(error.clone());
                    return Err(error);
                }
            }
            Ok(Step::Complete)
        })
    }

    /// Name given at construction, used in logs and errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle status.
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Check if the body ran to completion.
    pub fn is_complete(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Check if the task was aborted with [`Task::fail`].
    pub fn is_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }

    /// Abort the task without running its body again.
    ///
    /// The body is never resumed after this; every resume returns `error`.
    pub fn fail(&mut self, error: TaskError) {
        self.status = TaskStatus::Failed;
        self.failure = Some(error);
    }

    /// Run the body until its next suspension point.
    ///
    /// A completed task refuses to run again and a failed one keeps
    /// reporting its error. A body that returns an error itself stays
    /// suspended at its last resume point.
    pub fn resume(&mut self, machine: &mut StateMachine) -> Result<Step, TaskError> {
        if self.is_complete() {
            return Err(TaskError::ResumedAfterCompletion {
                task: self.name.to_string(),
            });
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }

        self.status = TaskStatus::Running;
        let step = self.body.resume(machine);
        self.status = match &step {
            Ok(step) if step.is_complete() => TaskStatus::Completed,
            _ => TaskStatus::Suspended,
        };
        step
    }

    /// Release the continuation and everything it captured.
    pub fn destroy(self) {
        tracing::trace!(task = %self.name, status = ?self.status, "destroying continuation");
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("status", &self.status)
            .finish_non_exhaustive()
    }
}
