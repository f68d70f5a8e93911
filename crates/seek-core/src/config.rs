//! Engine configuration: defaults, validation, loading from YAML or JSON.

use crate::{ConfigError, ConfigResult, OffsetRange, PacingRange};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Immutable engine settings, handed to a [`Seeker`](crate::Seeker) at
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Match similarity passed to finders. Valid: `0.0..=1.0`.
    pub similarity: f64,
    /// Budget used when a caller does not supply one.
    pub default_timeout_ms: u64,
    /// Delay between two probes of the poll loop. Valid: `min_ms <= max_ms`.
    pub pacing: PacingRange,
    /// Pointer offset applied when parking after a click. Valid: `min <= max`.
    pub reset_offset: OffsetRange,
    /// Pause after each trajectory sample.
    pub sample_pause_ms: u64,
    /// Fixed RNG seed for reproducible jitter. `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            similarity: 0.9,
            default_timeout_ms: 5000,
            pacing: PacingRange::default(),
            reset_offset: OffsetRange::default(),
            sample_pause_ms: 1,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn sample_pause(&self) -> Duration {
        Duration::from_millis(self.sample_pause_ms)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !(0.0..=1.0).contains(&self.similarity) {
            return Err(ConfigError::Invalid {
                field: "similarity",
                reason: format!("{} is outside 0.0..=1.0", self.similarity),
            });
        }
        if self.pacing.min_ms > self.pacing.max_ms {
            return Err(ConfigError::Invalid {
                field: "pacing",
                reason: format!(
                    "min_ms {} exceeds max_ms {}",
                    self.pacing.min_ms, self.pacing.max_ms
                ),
            });
        }
        if self.reset_offset.min > self.reset_offset.max {
            return Err(ConfigError::Invalid {
                field: "reset_offset",
                reason: format!(
                    "min {} exceeds max {}",
                    self.reset_offset.min, self.reset_offset.max
                ),
            });
        }
        Ok(())
    }

    /// Parse and validate a YAML document.
    pub fn parse_yaml(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn parse_json(content: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk. `.json` files are read as JSON, anything else as YAML.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::parse_json(&content)?,
            _ => Self::parse_yaml(&content)?,
        };
        debug!(?path, "Loaded engine config");
        Ok(config)
    }

    /// Load the user config file if it exists; fall back to defaults when it
    /// is missing or invalid.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);

        if !path.exists() {
            debug!(?path, "No config file, using defaults");
            return Self::default();
        }

        match Self::load(&path) {
            Ok(config) => {
                info!(?path, "Loaded config");
                config
            }
            Err(e) => {
                warn!(?path, "Failed to load config: {}, using defaults", e);
                Self::default()
            }
        }
    }
}

/// `<config dir>/seek/config.yaml`.
pub fn default_config_path() -> PathBuf {
    let base = dirs_next::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("seek").join("config.yaml")
}
