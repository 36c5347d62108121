//! Error types for the tracking subsystem.

use thiserror::Error;

/// Errors raised while configuring the update loop.
#[derive(Debug, Error, PartialEq)]
pub enum TrackingError {
    #[error("Invalid tracker config: {field} {reason}")]
    InvalidConfig { field: &'static str, reason: String },
}

/// Result type alias for tracking operations.
pub type TrackingResult<T> = std::result::Result<T, TrackingError>;
