//! State change history.
//!
//! Keeps a bounded, in-memory record of every state switch the machine
//! performs, for diagnostics and tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Why the machine switched state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeReason {
    /// `change_to_state` called by the owner or by a running body.
    External,
    /// A transition guard fired.
    Transition,
    /// The pending follow-up state registered with `continue_with`.
    ContinueWith,
}

/// Record of a single state switch.
///
/// # Example
///
/// ```rust
/// use tickstate::{ChangeReason, StateChange};
/// use chrono::Utc;
///
/// let change = StateChange {
///     from: Some("Locomotion".to_string()),
///     to: "Jump".to_string(),
///     reason: ChangeReason::Transition,
///     tick: 12,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(change.to, "Jump");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateChange {
    /// The state being left, if one was live
    pub from: Option<String>,
    /// The state being entered
    pub to: String,
    /// What triggered the switch
    pub reason: ChangeReason,
    /// Machine tick on which the switch happened
    pub tick: u64,
    /// When the switch happened
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of state switches.
///
/// Once `limit` entries are stored the oldest is dropped. A limit of zero
/// disables recording.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StateHistory {
    changes: Vec<StateChange>,
    limit: usize,
}

impl StateHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            changes: Vec::new(),
            limit,
        }
    }

    /// Append a change, evicting the oldest entry when full.
    pub fn record(&mut self, change: StateChange) {
        if self.limit == 0 {
            return;
        }
        if self.changes.len() == self.limit {
            self.changes.remove(0);
        }
        self.changes.push(change);
    }

    /// State names visited, oldest first.
    ///
    /// Starts with the `from` of the oldest entry when it has one.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(from) = self.changes.first().and_then(|c| c.from.as_deref()) {
            path.push(from);
        }
        for change in &self.changes {
            path.push(change.to.as_str());
        }
        path
    }

    /// Wall-clock time between the oldest and newest recorded change.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.changes.first(), self.changes.last()) {
            let duration = last.timestamp.signed_duration_since(first.timestamp);
            duration.to_std().ok()
        } else {
            None
        }
    }

    pub fn changes(&self) -> &[StateChange] {
        &self.changes
    }

    pub fn last(&self) -> Option<&StateChange> {
        self.changes.last()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
