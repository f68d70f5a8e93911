//! Error types for seek-core.
//!
//! "Not found" is never an error here: exhausted searches are reported through
//! [`Outcome`](crate::Outcome) and [`SweepOutcome`](crate::SweepOutcome).

use crate::Capability;
use thiserror::Error;

/// Engine-level errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The finder or input backend failed. Propagated as-is, never retried.
    #[error("backend failure: {0}")]
    Backend(String),
    /// No registered provider handles the requested capability.
    #[error("no provider handles {0}")]
    NoProvider(Capability),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EngineError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
