//! Session configuration.

use std::path::Path;
use std::time::Duration;

use sem6000_protocol::DEFAULT_PIN;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default wait for one command's answer, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Settings shared by every session.
///
/// All fields have defaults, so a YAML file only needs to list what it
/// overrides:
///
/// ```yaml
/// pin: "4711"
/// timeout_secs: 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Four-digit PIN used by `authorize` and `change_pin`.
    pub pin: String,
    /// How long one command may wait for its notification.
    pub timeout_secs: u64,
    /// How long device discovery scans.
    pub scan_timeout_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            pin: DEFAULT_PIN.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            scan_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl SessionConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Per-command timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Discovery scan duration.
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }
}
