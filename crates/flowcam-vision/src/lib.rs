//! FlowCam Vision - corner detection and sparse optical flow.
//!
//! The frame update loop only sees the two traits defined here. The bundled
//! backends are [`GoodFeatures`] (Shi-Tomasi corners) and [`PyramidalLk`]
//! (pyramidal Lucas-Kanade).

pub mod features;
pub mod lk;
pub mod pyramid;

use flowcam_core::{GrayFrame, Point2};
use serde::{Deserialize, Serialize};

pub use features::GoodFeatures;
pub use lk::{LkParams, PyramidalLk};
pub use pyramid::{compute_gradients, FloatImage, ImagePyramid};

/// Parameters for a feature detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectParams {
    /// Maximum number of features returned.
    pub max_count: usize,
    /// Minimum accepted corner quality, relative to the best corner found.
    pub quality_level: f32,
    /// Minimum Euclidean distance between returned features, in pixels.
    pub min_distance: f32,
}

impl Default for DetectParams {
    fn default() -> Self {
        Self {
            max_count: 300,
            quality_level: 0.005,
            min_distance: 3.0,
        }
    }
}

/// Finds features worth tracking in a single frame.
pub trait FeatureDetector {
    /// Return up to `params.max_count` points, strongest first.
    fn detect(&self, image: &GrayFrame, params: &DetectParams) -> Vec<Point2>;
}

/// Propagates features from one frame to the next.
pub trait FlowEstimator {
    /// Estimate where each of `points` (in `prev`) moved to in `next`.
    ///
    /// The result is index-aligned with `points`.
    fn estimate(&self, prev: &GrayFrame, next: &GrayFrame, points: &[Point2]) -> FlowResult;
}

/// Output of a flow estimation, index-aligned with the input points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowResult {
    /// Estimated positions in the next frame. Lost features keep their input position.
    pub points: Vec<Point2>,
    /// `true` where the feature was found in the next frame.
    pub status: Vec<bool>,
    /// Per-feature tracking error (mean absolute intensity difference).
    pub errors: Vec<f32>,
}

impl FlowResult {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            points: Vec::with_capacity(n),
            status: Vec::with_capacity(n),
            errors: Vec::with_capacity(n),
        }
    }

    /// Every feature lost, positions unchanged.
    pub fn all_lost(points: &[Point2]) -> Self {
        Self {
            points: points.to_vec(),
            status: vec![false; points.len()],
            errors: vec![f32::MAX; points.len()],
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of features that were found.
    pub fn found_count(&self) -> usize {
        self.status.iter().filter(|&&s| s).count()
    }
}
