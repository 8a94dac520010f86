//! # Configuration
//!
//! Plain serde value types with sensible defaults. [`EngineConfig`] says how
//! to launch the external analysis engine; [`DocumentSettings`] fills the
//! header of written documents.
//!
//! ## Environment overrides
//!
//! | variable                     | field          |
//! |------------------------------|----------------|
//! | `STRUX_ENGINE_PATH`          | `executable`   |
//! | `STRUX_ENGINE_TIMEOUT_SECS`  | `timeout_secs` (0 disables) |
//! | `STRUX_ENGINE_MODULE`        | `module`       |

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default engine executable, resolved through `PATH`
pub const DEFAULT_ENGINE: &str = "fd3dstruct";

/// Settings for launching the external analysis engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub executable: PathBuf,
    /// Seconds before the engine is killed; `None` waits forever
    pub timeout_secs: Option<u64>,
    /// How often the running engine is polled for exit
    pub poll_interval_ms: u64,
    /// Module named in the job script header
    pub module: String,
    /// Log file named in the job script header; relative paths are placed
    /// next to the script
    pub log_file: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            executable: PathBuf::from(DEFAULT_ENGINE),
            timeout_secs: Some(3600),
            poll_interval_ms: 100,
            module: "SFRAME".to_string(),
            log_file: "logfile.log".to_string(),
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `STRUX_ENGINE_*` environment variables
    pub fn from_env() -> Self {
        let mut config = EngineConfig::default();
        if let Ok(path) = std::env::var("STRUX_ENGINE_PATH") {
            config.executable = PathBuf::from(path);
        }
        if let Ok(raw) = std::env::var("STRUX_ENGINE_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(0) => config.timeout_secs = None,
                Ok(secs) => config.timeout_secs = Some(secs),
                Err(_) => warn!(value = %raw, "ignoring invalid STRUX_ENGINE_TIMEOUT_SECS"),
            }
        }
        if let Ok(module) = std::env::var("STRUX_ENGINE_MODULE") {
            config.module = module;
        }
        config
    }

    pub fn with_executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

/// Header values of a written document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSettings {
    /// Design code family, e.g. `EC`
    pub standard: String,
    /// National annex, e.g. `S`, `D`, `N`
    pub country: String,
    pub source_software: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        DocumentSettings {
            standard: crate::materials::DEFAULT_STANDARD.to_string(),
            country: crate::materials::DEFAULT_COUNTRY.to_string(),
            source_software: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.timeout(), Some(Duration::from_secs(3600)));
        assert_eq!(config.poll_interval(), Duration::from_millis(100));

        let settings = DocumentSettings::default();
        assert_eq!(settings.standard, "EC");
        assert!(settings.source_software.starts_with("strux_core "));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{"timeout_secs": null}"#).unwrap();
        assert_eq!(config.timeout(), None);
        assert_eq!(config.module, "SFRAME");
    }

    #[test]
    fn test_zero_poll_interval_is_clamped() {
        let config = EngineConfig {
            poll_interval_ms: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }
}
