//! Round-robin transition table.

use super::guard::Guard;
use super::state::{State, StateFactory};
use std::collections::VecDeque;

/// A guard paired with the constructor of the state it leads to.
pub struct TransitionBundle {
    pub guard: Guard,
    pub target: StateFactory,
}

impl TransitionBundle {
    pub fn new<P, F>(predicate: P, target: F) -> Self
    where
        P: FnMut() -> bool + 'static,
        F: FnOnce() -> State + 'static,
    {
        Self {
            guard: Guard::new(predicate),
            target: Box::new(target),
        }
    }
}

/// Ordered transitions checked one per tick.
///
/// Only the front entry is tested. If its guard fails, the entry rotates to
/// the back, so every entry is tested once per full rotation and a tick
/// never costs more than one predicate call. Duplicates are allowed and
/// evaluated independently.
#[derive(Default)]
pub struct TransitionTable {
    bundles: VecDeque<TransitionBundle>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bundle: TransitionBundle) {
        self.bundles.push_back(bundle);
    }

    /// Test the front entry, returning its target if the guard holds.
    ///
    /// A firing entry leaves the table; the caller is about to switch state,
    /// which clears the rest.
    pub fn check_next(&mut self) -> Option<StateFactory> {
        let front = self.bundles.front_mut()?;
        if front.guard.check() {
            return self.bundles.pop_front().map(|bundle| bundle.target);
        }

        self.bundles.rotate_left(1);
        None
    }

    pub fn clear(&mut self) {
        self.bundles.clear();
    }

    pub fn len(&self) -> usize {
        self.bundles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bundles.is_empty()
    }
}
