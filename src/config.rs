//! Rule-table configuration
//!
//! The suppressed categories can be declared in JSON instead of code:
//!
//! ```json
//! { "suppress": ["ble"] }
//! ```
//!
//! Categories are registered in the order they are listed.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ErrorCategory;
use crate::gate::{ErrorGate, SuppressionRule};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read gate config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid gate config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    #[serde(default)]
    pub suppress: Vec<ErrorCategory>,
}

impl Default for GateConfig {
    /// Suppress late BLE failures only.
    fn default() -> Self {
        Self {
            suppress: vec![ErrorCategory::Ble],
        }
    }
}

impl GateConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn build_gate(&self) -> ErrorGate {
        ErrorGate::new(
            self.suppress
                .iter()
                .copied()
                .map(SuppressionRule::Category)
                .collect(),
        )
    }
}
