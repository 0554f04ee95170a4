//! Machine configuration.
//!
//! Configuration is plain serde data. Validation uses Stillwater's
//! `Validation` so that every broken rule is reported at once.
//!
//! # Example
//!
//! ```rust
//! use tickstate::config::MachineConfig;
//!
//! let config = MachineConfig::from_json(r#"{ "label": "parkour", "history_limit": 8 }"#)
//!     .unwrap();
//!
//! assert_eq!(config.label, "parkour");
//! assert_eq!(config.history_limit, 8);
//! assert_eq!(config.max_stack_depth, 64);
//! ```

pub mod error;

pub use error::{ConfigError, ConfigViolation};

use serde::{Deserialize, Serialize};
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Longest label accepted in logs.
pub const MAX_LABEL_LEN: usize = 64;

/// Tunables of a [`StateMachine`](crate::StateMachine).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Name attached to every log event of the machine
    pub label: String,

    /// Most continuations that may be parked by nested awaits
    pub max_stack_depth: usize,

    /// State changes kept in history (0 disables history)
    pub history_limit: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            label: "state-machine".to_string(),
            max_stack_depth: 64,
            history_limit: 32,
        }
    }
}

impl MachineConfig {
    /// Check every rule, accumulating ALL violations.
    pub fn validate(&self) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigViolation>>> = Vec::new();

        let label = self.label.trim();
        checks.push(if label.is_empty() {
            Validation::fail(ConfigViolation::EmptyLabel)
        } else {
            Validation::success(())
        });

        let len = label.chars().count();
        checks.push(if len > MAX_LABEL_LEN {
            Validation::fail(ConfigViolation::LabelTooLong {
                len,
                max: MAX_LABEL_LEN,
            })
        } else {
            Validation::success(())
        });

        checks.push(if self.max_stack_depth == 0 {
            Validation::fail(ConfigViolation::ZeroStackDepth)
        } else {
            Validation::success(())
        });

        Validation::all_vec(checks).map(|_| ())
    }

    /// Validate, converting accumulated violations into a [`ConfigError`].
    pub fn validated(self) -> Result<Self, ConfigError> {
        match self.validate() {
            Validation::Success(_) => Ok(self),
            Validation::Failure(errors) => Err(ConfigError::Invalid {
                violations: errors.iter().cloned().collect(),
            }),
        }
    }

    /// Parse a JSON document and validate it. Missing fields use defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MachineConfig = serde_json::from_str(json)?;
        config.validated()
    }
}
