//! Transition predicates.
//!
//! Guards are opaque boolean closures owned by the transition table. They
//! usually read agent state the owner shares with them (for example through
//! `Rc<Cell<_>>`), and may keep their own bookkeeping such as elapsed time.

/// Predicate that decides whether a transition fires this tick.
///
/// # Example
///
/// ```rust
/// use tickstate::Guard;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let grounded = Rc::new(Cell::new(false));
/// let flag = Rc::clone(&grounded);
/// let mut landed = Guard::new(move || flag.get());
///
/// assert!(!landed.check());
/// grounded.set(true);
/// assert!(landed.check());
/// ```
pub struct Guard {
    predicate: Box<dyn FnMut() -> bool>,
}

impl Guard {
    /// Create a guard from a predicate closure.
    pub fn new<F>(predicate: F) -> Self
    where
        F: FnMut() -> bool + 'static,
    {
        Guard {
            predicate: Box::new(predicate),
        }
    }

    /// Evaluate the predicate.
    pub fn check(&mut self) -> bool {
        (self.predicate)()
    }
}
