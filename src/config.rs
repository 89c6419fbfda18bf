//=====================================================
// File: config.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Runtime configuration
// Objective: Load the recursion cap, worker pool size, default item delimiter,
//            busy-wait timings and log filter from TOML with defaults
//=====================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

const CONFIG_DIR: &str = "hypertalk";
const CONFIG_FILE: &str = "runtime.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Deepest allowed call stack before "Too much recursion."
    pub max_call_depth: usize,
    /// Scripts that may run at the same time.
    pub worker_threads: usize,
    pub item_delimiter: String,
    /// Pause between repeated beeps.
    pub beep_interval_ms: u64,
    /// Slice length when sleeping commands poll for an abort.
    pub abort_poll_ms: u64,
    pub log_filter: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            worker_threads: 4,
            item_delimiter: ",".to_string(),
            beep_interval_ms: 250,
            abort_poll_ms: 10,
            log_filter: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Reads and validates a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading configuration from {}", path.display()))?;
        let config: Self = toml::from_str(&data)
            .with_context(|| format!("parsing configuration {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("validating configuration {}", path.display()))?;
        Ok(config)
    }

    /// Loads the per-user file when present, defaults otherwise.
    pub fn load_default() -> anyhow::Result<(Self, Option<PathBuf>)> {
        let Some(path) = Self::default_path() else {
            return Ok((Self::default(), None));
        };
        if !path.exists() {
            return Ok((Self::default(), Some(path)));
        }
        let config = Self::load(&path)?;
        Ok((config, Some(path)))
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_call_depth == 0 {
            bail!("max_call_depth must be at least 1");
        }
        if self.worker_threads == 0 {
            bail!("worker_threads must be at least 1");
        }
        if self.item_delimiter.is_empty() {
            bail!("item_delimiter must not be empty");
        }
        if self.abort_poll_ms == 0 {
            bail!("abort_poll_ms must be at least 1");
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let serialized = toml::to_string_pretty(self)?;
        fs::write(path, serialized)
            .with_context(|| format!("writing configuration to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_take_defaults() {
        let config: RuntimeConfig = toml::from_str("max_call_depth = 16").unwrap();
        assert_eq!(config.max_call_depth, 16);
        assert_eq!(config.item_delimiter, ",");
        assert_eq!(config.worker_threads, 4);
    }

    #[test]
    fn validation_rejects_zero_depth() {
        let config = RuntimeConfig {
            max_call_depth: 0,
            ..RuntimeConfig::default()
        };
        assert!(config.validate().is_err());
        assert!(RuntimeConfig::default().validate().is_ok());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runtime.toml");
        let config = RuntimeConfig {
            item_delimiter: ";".into(),
            ..RuntimeConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(RuntimeConfig::load(&path).unwrap(), config);
    }
}

//=====================================================
// End of file
//=====================================================
