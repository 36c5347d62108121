//! Error types for FlowCam.

use thiserror::Error;

/// Main error type for FlowCam frame operations.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum FlowCamError {
    #[error("Buffer size mismatch: expected {expected} bytes, got {actual}")]
    BufferSize { expected: usize, actual: usize },
}

/// Result type alias for FlowCam operations.
pub type Result<T> = std::result::Result<T, FlowCamError>;
