//! Named behavioral modes.
//!
//! A state is an entry continuation plus an optional exit callback. Its
//! transitions, stateless tasks and follow-up state are registered by the
//! entry continuation itself on its first resume.

use super::continuation::Step;
use super::error::TaskError;
use super::task::Task;
use crate::machine::StateMachine;
use std::borrow::Cow;

/// Callback run when a live state is switched away from.
pub type ExitCallback = Box<dyn FnOnce()>;

/// Zero-argument constructor for the state to enter next.
pub type StateFactory = Box<dyn FnOnce() -> State>;

/// A named entry continuation with an optional exit callback.
///
/// # Example
///
/// ```rust
/// use tickstate::{State, StateMachine, Step};
///
/// fn idle() -> State {
///     let mut registered = false;
///     State::new("Idle", move |machine: &mut StateMachine| {
///         if !registered {
///             registered = true;
///             machine.add_stateless_task(|| {});
///         }
///         Ok(Step::Yield)
///     })
/// }
///
/// let state = idle();
/// assert_eq!(state.name(), "Idle");
/// ```
pub struct State {
    name: Cow<'static, str>,
    entry: Task,
    on_exit: Option<ExitCallback>,
}

impl State {
    /// Create a state whose entry continuation is the given closure.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, body: F) -> Self
    where
        F: FnMut(&mut StateMachine) -> Result<Step, TaskError> + 'static,
    {
        let name = name.into();
        let entry = Task::from_fn(name.clone(), body);
        Self {
            name,
            entry,
            on_exit: None,
        }
    }

    /// Create a state around an existing task.
    pub fn from_task(name: impl Into<Cow<'static, str>>, entry: Task) -> Self {
        Self {
            name: name.into(),
            entry,
            on_exit: None,
        }
    }

    /// Attach an exit callback up front.
    ///
    /// An `on_exit` registered by the entry continuation replaces it.
    pub fn on_exit<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.on_exit = Some(Box::new(callback));
        self
    }

    /// Name recorded in history and reported by `current_state`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn into_parts(self) -> (Cow<'static, str>, Task, Option<ExitCallback>) {
        (self.name, self.entry, self.on_exit)
    }
}
