//! Configuration error types.

use thiserror::Error;

/// A single rule a [`MachineConfig`](super::MachineConfig) breaks.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("Machine label must not be empty")]
    EmptyLabel,

    #[error("Machine label is {len} characters long (max: {max})")]
    LabelTooLong { len: usize, max: usize },

    #[error("max_stack_depth must be at least 1")]
    ZeroStackDepth,
}

/// Errors that can occur when loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed
    #[error("Failed to parse machine config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config parsed but breaks one or more rules
    #[error("Invalid machine config ({} violation(s))", violations.len())]
    Invalid { violations: Vec<ConfigViolation> },
}
