//! The tick-driven orchestrator.
//!
//! [`StateMachine`] owns the active continuation, the stack of parked
//! continuations, the current state and that state's transitions,
//! stateless tasks, follow-up state and exit callback. The owner calls
//! [`StateMachine::run`] once per tick from a single update loop.
//!
//! # Example
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tickstate::{State, StateMachine, Step};
//!
//! fn resting() -> State {
//!     State::new("Resting", |_| Ok(Step::Yield))
//! }
//!
//! fn walking(steps: Rc<Cell<u32>>) -> State {
//!     let mut registered = false;
//!     State::new("Walking", move |machine: &mut StateMachine| {
//!         if !registered {
//!             registered = true;
//!             let counter = Rc::clone(&steps);
//!             let tired = Rc::clone(&steps);
//!             machine
//!                 .add_stateless_task(move || counter.set(counter.get() + 1))
//!                 .add_transition(move || tired.get() >= 3, resting);
//!         }
//!         Ok(Step::Yield)
//!     })
//! }
//!
//! let steps = Rc::new(Cell::new(0));
//! let mut machine = StateMachine::new();
//! machine.change_to_state(walking(Rc::clone(&steps)));
//!
//! for _ in 0..4 {
//!     assert!(machine.run().unwrap());
//! }
//! assert_eq!(machine.current_state(), Some("Resting"));
//!
//! machine.destroy();
//! assert!(machine.run().unwrap());
//! ```

mod error;

pub use error::MachineError;

use crate::builder::StateMachineBuilder;
use crate::config::MachineConfig;
use crate::core::{
    ChangeReason, ExitCallback, State, StateChange, StateFactory, StateHistory,
    StatelessTaskList, Step, Task, TaskError, TransitionBundle, TransitionTable,
};
use chrono::Utc;
use std::borrow::Cow;
use tracing::{debug, trace, warn};

const NO_STATE: &str = "<none>";

/// Single-threaded, cooperative state machine driven one tick at a time.
pub struct StateMachine {
    config: MachineConfig,
    current: Option<Cow<'static, str>>,
    active: Option<Task>,
    stack: Vec<Task>,
    transitions: TransitionTable,
    stateless_tasks: StatelessTaskList,
    next_state: Option<StateFactory>,
    on_exit: Option<ExitCallback>,
    history: StateHistory,
    sleeping: bool,
    resuming: bool,
    in_tick: bool,
    // Bumped on every reset so a resume can tell its state was torn down.
    epoch: u64,
    tick: u64,
}

impl StateMachine {
    /// Create a dormant machine with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MachineConfig::default())
    }

    /// Start a [`StateMachineBuilder`] for a machine with custom settings.
    ///
    /// # Example
    ///
    /// ```rust
    /// use tickstate::StateMachine;
    ///
    /// let machine = StateMachine::builder()
    ///     .label("guard-patrol")
    ///     .max_stack_depth(8)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(machine.config().max_stack_depth, 8);
    /// assert!(!machine.is_sleeping());
    /// ```
    pub fn builder() -> StateMachineBuilder {
        StateMachineBuilder::new()
    }

    pub(crate) fn with_config(config: MachineConfig) -> Self {
        let history = StateHistory::new(config.history_limit);
        Self {
            config,
            current: None,
            active: None,
            stack: Vec::new(),
            transitions: TransitionTable::new(),
            stateless_tasks: StatelessTaskList::new(),
            next_state: None,
            on_exit: None,
            history,
            sleeping: false,
            resuming: false,
            in_tick: false,
            epoch: 0,
            tick: 0,
        }
    }

    /// Advance the machine by one tick.
    ///
    /// Returns `Ok(false)` when there is nothing left to do, `Ok(true)`
    /// otherwise. A destroyed machine always returns `Ok(true)` and does
    /// no work.
    pub fn run(&mut self) -> Result<bool, MachineError> {
        if self.in_tick {
            return Err(MachineError::ReentrantRun);
        }
        if self.sleeping {
            return Ok(true);
        }

        self.tick += 1;
        let mut scope = TickScope::enter(self);
        scope.machine.tick_once()
    }

    fn tick_once(&mut self) -> Result<bool, MachineError> {
        if !self.has_live_state() {
            return Ok(self.enter_pending_state());
        }

        self.stateless_tasks.run_all();

        // A firing transition consumes the tick; the new entry runs next tick.
        if let Some(target) = self.transitions.check_next() {
            self.switch_to(target(), ChangeReason::Transition);
            return Ok(true);
        }

        while !self.active.as_ref().is_some_and(|task| !task.is_complete()) {
            let Some(parked) = self.stack.pop() else {
                return Ok(self.enter_pending_state());
            };
            trace!(
                machine = %self.config.label,
                task = parked.name(),
                depth = self.stack.len(),
                "resuming parked continuation"
            );
            if let Some(finished) = self.active.replace(parked) {
                finished.destroy();
            }
        }

        self.resume_active()
    }

    fn enter_pending_state(&mut self) -> bool {
        match self.next_state.take() {
            Some(target) => {
                self.switch_to(target(), ChangeReason::ContinueWith);
                true
            }
            None => false,
        }
    }

    fn resume_active(&mut self) -> Result<bool, MachineError> {
        let Some(mut task) = self.active.take() else {
            return Ok(false);
        };
        let state = self.current.clone();
        let epoch = self.epoch;

        self.resuming = true;
        let step = task.resume(self);
        self.resuming = false;

        if self.epoch != epoch {
            // The body changed state or destroyed the machine while running.
            trace!(
                machine = %self.config.label,
                task = task.name(),
                "continuation torn down by its own body"
            );
            task.destroy();
            return match step {
                Ok(Step::Await(nested)) => {
                    nested.destroy();
                    Ok(true)
                }
                Ok(_) => Ok(true),
                Err(source) => Err(self.task_failed(state, source)),
            };
        }

        self.active = Some(task);
        match step {
            Ok(Step::Await(nested)) => {
                self.await_push(nested)?;
                Ok(true)
            }
            Ok(_) => Ok(true),
            Err(source) => Err(self.task_failed(state, source)),
        }
    }

    fn task_failed(&self, state: Option<Cow<'static, str>>, source: TaskError) -> MachineError {
        let state = state.map_or_else(|| NO_STATE.to_string(), Cow::into_owned);
        warn!(
            machine = %self.config.label,
            state = %state,
            error = %source,
            "continuation failed"
        );
        MachineError::TaskFailed { state, source }
    }

    /// Park the active continuation and make `task` the active one.
    ///
    /// With no active continuation the task is simply installed. Beyond
    /// `max_stack_depth` the task is destroyed, the stack is untouched and
    /// the awaiting continuation is failed: it never resumes past the await
    /// it could not complete.
    pub(crate) fn await_push(&mut self, task: Task) -> Result<(), MachineError> {
        if let Some(mut current) = self.active.take() {
            let limit = self.config.max_stack_depth;
            if self.stack.len() >= limit {
                let name = task.name().to_string();
                task.destroy();
                current.fail(TaskError::failed(
                    current.name(),
                    format!("awaiting '{name}' exceeds the continuation stack limit ({limit})"),
                ));
                self.active = Some(current);
                return Err(MachineError::StackDepthExceeded { task: name, limit });
            }
            trace!(
                machine = %self.config.label,
                parked = current.name(),
                task = task.name(),
                depth = self.stack.len() + 1,
                "awaiting nested task"
            );
            self.stack.push(current);
        }
        self.active = Some(task);
        Ok(())
    }

    /// Switch to `state`, running the exit callback of the live state first.
    pub fn change_to_state(&mut self, state: State) {
        self.switch_to(state, ChangeReason::External);
    }

    fn switch_to(&mut self, state: State, reason: ChangeReason) {
        let leaving_live_state = self.has_live_state();
        let from = self.current.take();
        if leaving_live_state {
            if let Some(exit) = self.on_exit.take() {
                exit();
            }
        }

        self.reset();

        let (name, entry, on_exit) = state.into_parts();
        debug!(
            machine = %self.config.label,
            from = from.as_deref().unwrap_or(NO_STATE),
            to = %name,
            reason = ?reason,
            tick = self.tick,
            "changing state"
        );
        self.history.record(StateChange {
            from: from.map(Cow::into_owned),
            to: name.to_string(),
            reason,
            tick: self.tick,
            timestamp: Utc::now(),
        });

        self.active = Some(entry);
        self.on_exit = on_exit;
        self.current = Some(name);
    }

    /// Tear down everything tied to the current state.
    ///
    /// Destroys the active continuation and every parked one (innermost
    /// first) and clears transitions, stateless tasks, the follow-up state,
    /// the exit callback, the current state and the sleeping flag. No exit
    /// callback runs.
    pub fn reset(&mut self) {
        self.free_continuations();
        self.transitions.clear();
        self.stateless_tasks.clear();
        self.next_state = None;
        self.on_exit = None;
        self.current = None;
        self.sleeping = false;
        self.epoch = self.epoch.wrapping_add(1);
    }

    fn free_continuations(&mut self) {
        if let Some(active) = self.active.take() {
            active.destroy();
        }
        while let Some(parked) = self.stack.pop() {
            parked.destroy();
        }
    }

    /// Reset and go to sleep. Further `run` calls are no-ops until the next
    /// `change_to_state`. Safe to call repeatedly and on a dormant machine.
    pub fn destroy(&mut self) {
        if !self.sleeping {
            debug!(
                machine = %self.config.label,
                state = self.current.as_deref().unwrap_or(NO_STATE),
                parked = self.stack.len(),
                "destroying state machine"
            );
        }
        self.reset();
        self.sleeping = true;
    }

    /// Register a transition for the current state.
    pub fn add_transition<P, F>(&mut self, predicate: P, target: F) -> &mut Self
    where
        P: FnMut() -> bool + 'static,
        F: FnOnce() -> State + 'static,
    {
        self.transitions.push(TransitionBundle::new(predicate, target));
        self
    }

    /// Set the state to enter once the current state's continuations are
    /// exhausted, or on the next tick if no state is live.
    pub fn continue_with<F>(&mut self, target: F) -> &mut Self
    where
        F: FnOnce() -> State + 'static,
    {
        self.next_state = Some(Box::new(target));
        self
    }

    /// Set the callback run when the current state is switched away from.
    pub fn on_exit<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce() + 'static,
    {
        self.on_exit = Some(Box::new(callback));
        self
    }

    /// Register a closure run at the start of every tick of this state.
    pub fn add_stateless_task<F>(&mut self, task: F) -> &mut Self
    where
        F: FnMut() + 'static,
    {
        self.stateless_tasks.push(task);
        self
    }

    /// A state is live from the moment it is entered until its chain of
    /// continuations has run to completion.
    fn has_live_state(&self) -> bool {
        self.current.is_some()
            && (self.resuming
                || !self.stack.is_empty()
                || self.active.as_ref().is_some_and(|task| !task.is_complete()))
    }

    /// Name of the live state, if any.
    pub fn current_state(&self) -> Option<&str> {
        if self.has_live_state() {
            self.current.as_deref()
        } else {
            None
        }
    }

    /// Name of the continuation resumed on the next tick.
    pub fn active_task(&self) -> Option<&str> {
        self.active.as_ref().map(Task::name)
    }

    /// Check if the machine was destroyed and not woken since.
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Number of continuations parked beneath the active one.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Number of transitions registered for the current state.
    pub fn transition_count(&self) -> usize {
        self.transitions.len()
    }

    /// Number of stateless tasks registered for the current state.
    pub fn stateless_task_count(&self) -> usize {
        self.stateless_tasks.len()
    }

    /// Check if a follow-up state was set with [`StateMachine::continue_with`].
    pub fn has_pending_state(&self) -> bool {
        self.next_state.is_some()
    }

    /// Ticks processed so far, not counting ticks while asleep.
    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    /// Recorded state changes, oldest first.
    pub fn history(&self) -> &StateHistory {
        &self.history
    }

    /// Configuration the machine was built with.
    pub fn config(&self) -> &MachineConfig {
        &self.config
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks a tick in progress and clears the tick flags when dropped, so a
/// panicking body does not leave the machine rejecting every later `run`.
struct TickScope<'a> {
    machine: &'a mut StateMachine,
}

impl<'a> TickScope<'a> {
    fn enter(machine: &'a mut StateMachine) -> Self {
        machine.in_tick = true;
        Self { machine }
    }
}

impl Drop for TickScope<'_> {
    fn drop(&mut self) {
        self.machine.in_tick = false;
        self.machine.resuming = false;
    }
}

impl Drop for StateMachine {
    fn drop(&mut self) {
        self.free_continuations();
    }
}
