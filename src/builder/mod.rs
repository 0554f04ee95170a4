//! Builder API for configured state machine construction.
//!
//! [`StateMachine::new`](crate::StateMachine::new) gives a machine with
//! default settings. The builder sets the label, stack limit and history
//! size, and validates them before any machine exists.
//!
//! # Example
//!
//! ```
//! use tickstate::StateMachine;
//!
//! let machine = StateMachine::builder()
//!     .label("npc-42")
//!     .max_stack_depth(16)
//!     .build()
//!     .expect("valid config");
//!
//! assert_eq!(machine.config().label, "npc-42");
//! ```

pub mod machine;

pub use machine::StateMachineBuilder;
