//! Common error types for seek-platform.

use seek_core::EngineError;
use thiserror::Error;

/// Platform-level errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("not implemented on this platform: {0}")]
    NotImplemented(&'static str),
    #[error("injection failed: {0}")]
    InjectionFailed(String),
    #[error("screen capture failed: {0}")]
    CaptureFailed(String),
    #[error("cursor query failed: {0}")]
    CursorQueryFailed(String),
    #[error("invalid color: {0}")]
    InvalidColor(String),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;

impl From<PlatformError> for EngineError {
    fn from(err: PlatformError) -> Self {
        EngineError::Backend(err.to_string())
    }
}
