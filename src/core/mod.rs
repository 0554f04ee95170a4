//! Building blocks of the state machine.
//!
//! - Continuations and the `Task` handles that own them
//! - States, transition guards and the round-robin transition table
//! - Stateless per-tick tasks
//! - State change history
//!
//! Nothing here schedules anything; the orchestrator in
//! [`crate::machine`] decides when each piece runs.

mod continuation;
mod error;
mod guard;
mod history;
mod state;
mod stateless;
mod task;
mod transition;

pub use continuation::{Continuation, Step};
pub use error::TaskError;
pub use guard::Guard;
pub use history::{ChangeReason, StateChange, StateHistory};
pub use state::{ExitCallback, State, StateFactory};
pub use stateless::StatelessTaskList;
pub use task::{Task, TaskStatus};
pub use transition::{TransitionBundle, TransitionTable};
