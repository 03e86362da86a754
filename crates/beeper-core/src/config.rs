use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use beeper_platform::service::ServiceIdentity;

/// Environment variable that overrides the config file location
pub const CONFIG_PATH_ENV: &str = "BEEPER_CONFIG_PATH";

/// Shortest wait the worker will use between units
pub const MIN_WORK_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Name the service is registered under
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Time the worker waits between units of work, in milliseconds
    #[serde(default = "default_work_interval")]
    pub work_interval_ms: u64,

    /// Beep tone in hertz
    #[serde(default = "default_beep_frequency")]
    pub beep_frequency_hz: u32,

    /// Beep length in milliseconds
    #[serde(default = "default_beep_duration")]
    pub beep_duration_ms: u32,

    /// Default log filter when RUST_LOG is unset (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Write logs to this file instead of stdout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

fn default_service_name() -> String {
    "Beeper".to_string()
}
fn default_work_interval() -> u64 {
    5000
}
fn default_beep_frequency() -> u32 {
    1000
}
fn default_beep_duration() -> u32 {
    100
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            work_interval_ms: default_work_interval(),
            beep_frequency_hz: default_beep_frequency(),
            beep_duration_ms: default_beep_duration(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl ServiceConfig {
    /// Default config file path for this platform
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = directories::ProjectDirs::from("com", "beeper", "beeper") {
            dirs.config_dir().join("config.json")
        } else {
            PathBuf::from("beeper-config.json")
        }
    }

    /// Config path from the environment, falling back to [`Self::default_path`]
    pub fn resolve_path() -> PathBuf {
        std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_path)
    }

    /// Load config from a file path
    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let config: Self =
            serde_json::from_str(&data).with_context(|| "failed to parse config JSON")?;
        if config.work_interval_ms == 0 {
            bail!("work_interval_ms in {} must be greater than zero", path.display());
        }
        Ok(config)
    }

    /// Load config if the file exists, `None` when it does not.
    pub fn load_if_present(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn identity(&self) -> ServiceIdentity {
        ServiceIdentity::new(self.service_name.clone())
    }

    /// Wait between units, never shorter than [`MIN_WORK_INTERVAL`].
    pub fn work_interval(&self) -> Duration {
        Duration::from_millis(self.work_interval_ms).max(MIN_WORK_INTERVAL)
    }
}
