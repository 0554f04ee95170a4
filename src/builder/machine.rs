//! Builder for constructing state machines.

use crate::config::{ConfigError, MachineConfig};
use crate::machine::StateMachine;

/// Builder for constructing state machines with a fluent API.
#[derive(Clone, Debug, Default)]
pub struct StateMachineBuilder {
    config: MachineConfig,
}

impl StateMachineBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the label attached to log events.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.config.label = label.into();
        self
    }

    /// Limit how many continuations nested awaits may park.
    pub fn max_stack_depth(mut self, depth: usize) -> Self {
        self.config.max_stack_depth = depth;
        self
    }

    /// Number of state changes to keep in history.
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.config.history_limit = limit;
        self
    }

    /// Build a dormant state machine.
    /// Returns every configuration rule that is broken.
    pub fn build(self) -> Result<StateMachine, ConfigError> {
        let config = self.config.validated()?;
        Ok(StateMachine::with_config(config))
    }
}
