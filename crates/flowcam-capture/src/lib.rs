//! FlowCam Capture - live frame sources
//!
//! This crate handles:
//! - Camera capture through an FFmpeg subprocess
//! - A synthetic moving test pattern for demos and tests

pub mod camera;
pub mod config;
pub mod error;
pub mod synthetic;

pub use camera::CameraCapture;
pub use config::CaptureConfig;
pub use error::{CaptureError, CaptureResult};
pub use synthetic::SyntheticSource;

use flowcam_core::FrameBuffer;

/// Anything that produces camera-like frames.
pub trait FrameSource {
    /// The newest frame if one arrived since the last call.
    fn next_frame(&mut self) -> Option<FrameBuffer>;

    /// Frame dimensions in pixels.
    fn dimensions(&self) -> (u32, u32);
}
