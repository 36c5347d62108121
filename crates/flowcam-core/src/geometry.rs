//! Geometric primitives for feature points and viewport layout.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// 2D image point in pixel coordinates, origin at the top-left corner.
pub type Point2 = Vec2;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from center and size.
    pub fn from_center_size(center: Point2, size: Vec2) -> Self {
        Self {
            x: center.x - size.x * 0.5,
            y: center.y - size.y * 0.5,
            width: size.x,
            height: size.y,
        }
    }

    /// Minimum corner (top-left).
    #[inline]
    pub fn min(self) -> Point2 {
        Vec2::new(self.x, self.y)
    }

    /// Maximum corner (bottom-right).
    #[inline]
    pub fn max(self) -> Point2 {
        Vec2::new(self.x + self.width, self.y + self.height)
    }

    /// Center point.
    #[inline]
    pub fn center(self) -> Point2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Size as a vector.
    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Largest rectangle with the aspect ratio of `content` that fits inside
    /// `self`, centered (letterboxing).
    pub fn fit_aspect(self, content: Vec2) -> Self {
        if content.x <= 0.0 || content.y <= 0.0 || self.width <= 0.0 || self.height <= 0.0 {
            return Self::from_center_size(self.center(), Vec2::ZERO);
        }
        let scale = (self.width / content.x).min(self.height / content.y);
        Self::from_center_size(self.center(), content * scale)
    }

    /// Map a point in `content` pixel space into this rectangle.
    #[inline]
    pub fn map_from(self, content: Vec2, point: Point2) -> Point2 {
        if content.x <= 0.0 || content.y <= 0.0 {
            return self.min();
        }
        self.min() + point * (self.size() / content)
    }
}
