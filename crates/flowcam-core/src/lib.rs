//! FlowCam Core - Foundation types for live optical flow
//!
//! This crate provides the fundamental types used throughout FlowCam:
//! - Frame buffers (RGBA camera frames and 8-bit grayscale frames)
//! - Colors used for overlay tints
//! - Geometric primitives (feature points, viewport rectangles)

pub mod color;
pub mod error;
pub mod frame;
pub mod geometry;

pub use color::Color;
pub use error::{FlowCamError, Result};
pub use frame::{FrameBuffer, FramePlane, GrayFrame, PixelFormat};
pub use geometry::{Point2, Rect};

/// Camera defaults shared by capture and the app window.
pub mod defaults {
    /// Capture width requested from the camera.
    pub const CAPTURE_WIDTH: u32 = 640;

    /// Capture height requested from the camera.
    pub const CAPTURE_HEIGHT: u32 = 480;

    /// Capture frame rate requested from the camera.
    pub const CAPTURE_FPS: u32 = 30;
}
