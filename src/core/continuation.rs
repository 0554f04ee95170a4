//! The resumable unit of work driven by the state machine.
//!
//! A continuation runs until it voluntarily suspends, asks to await a nested
//! task, or completes. The machine never inspects its internals: all it sees
//! is the [`Step`] returned from each resume.

use super::error::TaskError;
use super::task::Task;
use crate::machine::StateMachine;

/// What a continuation asks the machine to do after a resume.
#[derive(Debug)]
pub enum Step {
    /// Suspend until the next tick.
    Yield,

    /// Park this continuation and make the nested task the active one.
    ///
    /// The nested task first runs on the next tick. Once it completes, this
    /// continuation is resumed again from where it suspended.
    Await(Task),

    /// Finished. The continuation is never resumed again.
    Complete,
}

impl Step {
    /// Check if this step finishes the continuation.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// A unit of work that can suspend mid-execution and resume later.
///
/// Implementors keep their own resume point, either as captured closure
/// state or as an explicit program counter.
///
/// # Example
///
/// ```rust
/// use tickstate::{Continuation, StateMachine, Step, TaskError};
///
/// enum Blink {
///     On,
///     Off,
///     Done,
/// }
///
/// impl Continuation for Blink {
///     fn resume(&mut self, _machine: &mut StateMachine) -> Result<Step, TaskError> {
///         match self {
///             Blink::On => {
///                 *self = Blink::Off;
///                 Ok(Step::Yield)
///             }
///             Blink::Off => {
///                 *self = Blink::Done;
///                 Ok(Step::Yield)
///             }
///             Blink::Done => Ok(Step::Complete),
///         }
///     }
/// }
/// ```
pub trait Continuation {
    /// Run until the next suspension point.
    fn resume(&mut self, machine: &mut StateMachine) -> Result<Step, TaskError>;
}

impl<F> Continuation for F
where
    F: FnMut(&mut StateMachine) -> Result<Step, TaskError>,
{
    fn resume(&mut self, machine: &mut StateMachine) -> Result<Step, TaskError> {
        self(machine)
    }
}
