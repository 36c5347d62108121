//! Renderer-agnostic drawing model for tracked features.

use crate::tracker::FeatureSet;
use flowcam_core::{Color, Point2};
use serde::{Deserialize, Serialize};

/// Tints and sizes for the overlay, in frame pixel units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    /// Tint applied to the camera image underneath the overlay.
    pub background: Color,
    pub previous: Color,
    pub current: Color,
    pub flow: Color,
    pub point_radius: f32,
    pub line_width: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            background: Color::WHITE.with_alpha(0.55),
            previous: Color::RED.with_alpha(0.55),
            current: Color::BLUE.with_alpha(0.5),
            flow: Color::GREEN.with_alpha(0.5),
            point_radius: 3.0,
            line_width: 1.0,
        }
    }
}

/// A single drawing command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    StrokedCircle {
        center: Point2,
        radius: f32,
        color: Color,
        width: f32,
    },
    FilledCircle {
        center: Point2,
        radius: f32,
        color: Color,
    },
    Segment {
        from: Point2,
        to: Point2,
        color: Color,
        width: f32,
    },
}

/// Drawing commands in paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub primitives: Vec<Primitive>,
}

impl Overlay {
    /// Previous features as outlines, then current features as dots, then a
    /// segment for every matched pair.
    pub fn build(features: &FeatureSet, style: &OverlayStyle) -> Self {
        let segments = features.matched_count();
        let mut primitives =
            Vec::with_capacity(features.previous.len() + features.current.len() + segments);

        primitives.extend(features.previous.iter().map(|&center| Primitive::StrokedCircle {
            center,
            radius: style.point_radius,
            color: style.previous,
            width: style.line_width,
        }));
        primitives.extend(features.current.iter().map(|&center| Primitive::FilledCircle {
            center,
            radius: style.point_radius,
            color: style.current,
        }));
        primitives.extend(features.flow_segments().map(|(from, to)| Primitive::Segment {
            from,
            to,
            color: style.flow,
            width: style.line_width,
        }));

        Self { primitives }
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = (Point2, Point2)> + '_ {
        self.primitives.iter().filter_map(|p| match *p {
            Primitive::Segment { from, to, .. } => Some((from, to)),
            _ => None,
        })
    }
}
