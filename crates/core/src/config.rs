use crate::error::ConfigError;
use crate::location::Location;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Loader setup read from a JSON file.
///
/// ```json
/// {
///   "label": "plugins",
///   "locations": ["file:///opt/app/classes/", "/opt/app/lib/ivonet.jar"],
///   "logging": { "level": "debug", "to_stderr": true }
/// }
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoaderConfig {
    /// Shown in logs only; never part of loader identity.
    #[serde(default)]
    pub label: Option<String>,
    /// `file:` URLs or plain paths, in search order.
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
    /// Log directory, `~/.lodestar/logs` when unset.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub to_stderr: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            dir: None,
            to_stderr: false,
        }
    }
}

impl LoaderConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Parsed locations, in configured order.
    pub fn locations(&self) -> Result<Vec<Location>, ConfigError> {
        self.locations
            .iter()
            .map(|entry| Location::parse(entry).map_err(ConfigError::from))
            .collect()
    }
}
