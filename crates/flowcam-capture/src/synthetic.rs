//! Synthetic frame source: a bright square drifting over a dark background.
//!
//! Edges are anti-aliased by pixel coverage so sub-pixel motion is visible to
//! the tracker.

use crate::FrameSource;
use flowcam_core::{FrameBuffer, GrayFrame, PixelFormat, Point2};
use glam::Vec2;

const BACKGROUND: f32 = 20.0;
const FOREGROUND: f32 = 220.0;

/// Deterministic moving test pattern.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: u32,
    height: u32,
    /// Top-left corner of the square in frame 0.
    origin: Point2,
    side: f32,
    /// Displacement per frame in pixels.
    velocity: Vec2,
    frame_index: u64,
}

impl SyntheticSource {
    /// A 96 px square starting near the upper-left third, drifting right.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            origin: Point2::new(width as f32 / 3.0, height as f32 / 3.0),
            side: 96.0f32.min(width as f32 / 3.0).min(height as f32 / 3.0),
            velocity: Vec2::new(1.0, 0.0),
            frame_index: 0,
        }
    }

    pub fn with_square(mut self, origin: Point2, side: f32) -> Self {
        self.origin = origin;
        self.side = side.max(0.0);
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    /// Top-left corner of the square in frame `index`, wrapped to stay on screen.
    pub fn square_origin(&self, index: u64) -> Point2 {
        let travel = self.origin + self.velocity * index as f32;
        let span_x = (self.width as f32 - self.side).max(1.0);
        let span_y = (self.height as f32 - self.side).max(1.0);
        Point2::new(travel.x.rem_euclid(span_x), travel.y.rem_euclid(span_y))
    }

    /// Render frame `index` as an 8-bit grayscale image.
    pub fn gray_frame_at(&self, index: u64) -> GrayFrame {
        let o = self.square_origin(index);
        let side = self.side;
        GrayFrame::from_fn(self.width, self.height, |x, y| {
            let cover_x = coverage(x as f32, o.x, side);
            let cover_y = coverage(y as f32, o.y, side);
            (BACKGROUND + (FOREGROUND - BACKGROUND) * cover_x * cover_y).round() as u8
        })
    }

    /// Render frame `index` as an RGB frame, as the camera would deliver it.
    pub fn frame_at(&self, index: u64) -> FrameBuffer {
        let gray = self.gray_frame_at(index);
        let rgb: Vec<u8> = gray.data.iter().flat_map(|&v| [v, v, v]).collect();
        // Sizes match by construction
        FrameBuffer::from_packed(self.width, self.height, PixelFormat::Rgb8, &rgb)
            .unwrap_or_else(|_| FrameBuffer::new(self.width, self.height, PixelFormat::Rgb8))
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

/// Fraction of the unit pixel span `[p, p + 1)` covered by `[start, start + len)`.
#[inline]
fn coverage(p: f32, start: f32, len: f32) -> f32 {
    ((p + 1.0).min(start + len) - p.max(start)).clamp(0.0, 1.0)
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Option<FrameBuffer> {
        let frame = self.frame_at(self.frame_index);
        self.frame_index += 1;
        Some(frame)
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
