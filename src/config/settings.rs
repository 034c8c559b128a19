use super::ConfigError;
use crate::process::DetectionPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub launch: LaunchSettings,
    pub status: StatusSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaunchSettings {
    pub detection_timeout_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            detection_timeout_ms: 3000,
            poll_interval_ms: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatusSettings {
    pub watch_interval_secs: u64,
}

impl Default for StatusSettings {
    fn default() -> Self {
        Self {
            watch_interval_secs: 5,
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Reads `path` if present; a missing settings file means defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let settings = Self::from_path(path)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.launch.detection_timeout_ms == 0 {
            return Err(ConfigError::Settings(
                "`launch.detection_timeout_ms` must be greater than zero".to_string(),
            ));
        }
        if self.launch.poll_interval_ms == 0 {
            return Err(ConfigError::Settings(
                "`launch.poll_interval_ms` must be greater than zero".to_string(),
            ));
        }
        if self.status.watch_interval_secs == 0 {
            return Err(ConfigError::Settings(
                "`status.watch_interval_secs` must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn detection_policy(&self) -> DetectionPolicy {
        DetectionPolicy {
            max_wait: Duration::from_millis(self.launch.detection_timeout_ms),
            poll_interval: Duration::from_millis(self.launch.poll_interval_ms),
        }
    }

    pub fn watch_interval(&self) -> Duration {
        Duration::from_secs(self.status.watch_interval_secs)
    }
}
