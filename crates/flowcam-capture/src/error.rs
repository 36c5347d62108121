//! Error types for camera capture.

use thiserror::Error;

/// Errors that can occur while opening a frame source.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// No usable FFmpeg binary was found.
    #[error("FFmpeg not found; install it or put it on PATH")]
    FfmpegMissing,

    /// FFmpeg could not be started.
    #[error("Failed to start capture for {device}: {reason}")]
    Spawn { device: String, reason: String },

    /// The capture configuration is unusable.
    #[error("Invalid capture config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for capture operations.
pub type CaptureResult<T> = std::result::Result<T, CaptureError>;
