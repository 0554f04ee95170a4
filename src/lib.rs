//! Tickstate: a cooperative, tick-driven state machine
//!
//! An owner (a character, an NPC, any entity updated once per frame) describes
//! what it is doing as a tree of suspendable tasks, switches between named
//! states, and checks transition predicates every tick. Nothing blocks and
//! nothing runs on another thread: each call to [`StateMachine::run`] advances
//! the machine by exactly one step.
//!
//! # Core Concepts
//!
//! - **Continuation**: resumable unit of work returning a [`Step`] each resume
//! - **Task**: owned handle to a continuation; awaiting one parks the caller
//!   on an explicit stack
//! - **State**: named entry continuation plus optional exit callback
//! - **Transitions**: guards checked one per tick, round-robin
//! - **Stateless tasks**: per-tick closures run before anything else
//!
//! # Tick order
//!
//! 1. A destroyed machine does nothing.
//! 2. With no live state, the pending follow-up state (if any) is entered.
//! 3. Stateless tasks run.
//! 4. The front transition is checked; if it fires the state switches and
//!    the tick ends.
//! 5. Finished continuations are popped off the stack and the first
//!    unfinished one is resumed.
//!
//! # Example
//!
//! ```rust
//! use tickstate::{State, StateMachine, Step, Task};
//!
//! fn landing() -> State {
//!     State::new("Landing", |_| Ok(Step::Yield))
//! }
//!
//! fn jump() -> State {
//!     let mut launched = false;
//!     State::new("Jump", move |machine: &mut StateMachine| {
//!         if launched {
//!             return Ok(Step::Complete);
//!         }
//!         launched = true;
//!         machine.continue_with(landing);
//!         // Hang in the air for two ticks, then come back here.
//!         Ok(Step::Await(Task::wait_ticks(2)))
//!     })
//! }
//!
//! let mut machine = StateMachine::new();
//! machine.change_to_state(jump());
//!
//! while machine.current_state() != Some("Landing") {
//!     assert!(machine.run().unwrap());
//! }
//! assert_eq!(machine.history().get_path(), vec!["Jump", "Landing"]);
//!
//! machine.destroy();
//! ```

pub mod builder;
pub mod config;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use self::builder::StateMachineBuilder;
pub use self::config::{ConfigError, MachineConfig};
pub use self::core::{
    ChangeReason, Continuation, Guard, State, StateChange, StateHistory, Step, Task, TaskError,
    TaskStatus,
};
pub use self::machine::{MachineError, StateMachine};
