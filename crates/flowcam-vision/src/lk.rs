//! Pyramidal Lucas-Kanade sparse optical flow.

use crate::pyramid::{compute_gradients, FloatImage, ImagePyramid};
use crate::{FlowEstimator, FlowResult};
use flowcam_core::{GrayFrame, Point2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Parameters for the Lucas-Kanade estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LkParams {
    /// Side of the square integration window in pixels (forced odd).
    pub window_size: u32,
    /// Number of pyramid levels including full resolution.
    pub pyramid_levels: u32,
    /// Gauss-Newton iterations per level.
    pub max_iterations: u32,
    /// Stop iterating once the update is shorter than this (pixels).
    pub epsilon: f32,
    /// Features whose window min eigenvalue, divided by the window area,
    /// falls below this are reported lost.
    pub min_eigen_threshold: f32,
}

impl Default for LkParams {
    fn default() -> Self {
        Self {
            window_size: 21,
            pyramid_levels: 3,
            max_iterations: 30,
            epsilon: 0.01,
            min_eigen_threshold: 1e-4,
        }
    }
}

/// Outcome for a single feature.
#[derive(Debug, Clone, Copy)]
struct Track {
    position: Point2,
    found: bool,
    error: f32,
}

impl Track {
    fn lost(position: Point2) -> Self {
        Self {
            position,
            found: false,
            error: f32::MAX,
        }
    }
}

/// Gradients of one level of the previous frame's pyramid.
struct LevelGradients {
    ix: FloatImage,
    iy: FloatImage,
}

/// Lucas-Kanade optical flow estimator with pyramidal support.
#[derive(Debug, Clone, Default)]
pub struct PyramidalLk {
    pub params: LkParams,
}

impl PyramidalLk {
    pub fn new(params: LkParams) -> Self {
        Self { params }
    }

    fn half_window(&self) -> i32 {
        (self.params.window_size.max(3) / 2) as i32
    }

    fn track_point(
        &self,
        prev_pyr: &ImagePyramid,
        next_pyr: &ImagePyramid,
        grads: &[LevelGradients],
        point: Point2,
    ) -> Track {
        let levels = prev_pyr.len();
        let hw = self.half_window();
        let area = ((2 * hw + 1) * (2 * hw + 1)) as f32;
        let mut guess = Point2::ZERO;

        for level in (0..levels).rev() {
            let scale = 1.0 / (1u32 << level) as f32;
            let p = point * scale;
            let prev_img = &prev_pyr.levels[level];
            let next_img = &next_pyr.levels[level];
            let LevelGradients { ix, iy } = &grads[level];

            // Window gradients and structure tensor at the previous position
            let mut win_i = Vec::with_capacity(area as usize);
            let mut win_ix = Vec::with_capacity(area as usize);
            let mut win_iy = Vec::with_capacity(area as usize);
            let (mut g11, mut g12, mut g22) = (0.0f32, 0.0f32, 0.0f32);
            for wy in -hw..=hw {
                for wx in -hw..=hw {
                    let sx = p.x + wx as f32;
                    let sy = p.y + wy as f32;
                    let gx = ix.sample(sx, sy);
                    let gy = iy.sample(sx, sy);
                    win_i.push(prev_img.sample(sx, sy));
                    win_ix.push(gx);
                    win_iy.push(gy);
                    g11 += gx * gx;
                    g12 += gx * gy;
                    g22 += gy * gy;
                }
            }

            let det = g11 * g22 - g12 * g12;
            let half_trace = (g11 + g22) * 0.5;
            let min_eig = half_trace - (((g11 - g22) * 0.5).powi(2) + g12 * g12).sqrt();
            if min_eig / area < self.params.min_eigen_threshold || det.abs() < f32::EPSILON {
                if level == 0 {
                    return Track::lost(point);
                }
                guess *= 2.0;
                continue;
            }
            let inv_det = 1.0 / det;

            let mut d = guess;
            for _ in 0..self.params.max_iterations {
                let q = p + d;
                if !in_bounds(next_img, q, hw as f32) {
                    return Track::lost(point);
                }
                let (mut bx, mut by) = (0.0f32, 0.0f32);
                let mut k = 0;
                for wy in -hw..=hw {
                    for wx in -hw..=hw {
                        let it = next_img.sample(q.x + wx as f32, q.y + wy as f32) - win_i[k];
                        bx += win_ix[k] * it;
                        by += win_iy[k] * it;
                        k += 1;
                    }
                }
                let ddx = inv_det * (g22 * bx - g12 * by);
                let ddy = inv_det * (-g12 * bx + g11 * by);
                d.x -= ddx;
                d.y -= ddy;
                if ddx * ddx + ddy * ddy < self.params.epsilon * self.params.epsilon {
                    break;
                }
            }

            guess = if level > 0 { d * 2.0 } else { d };
        }

        let next = point + guess;
        let base = &next_pyr.levels[0];
        if next.x < 0.0 || next.y < 0.0 || next.x >= base.width as f32 || next.y >= base.height as f32 {
            return Track::lost(point);
        }

        Track {
            position: next,
            found: true,
            error: window_error(&prev_pyr.levels[0], base, point, next, hw),
        }
    }
}

impl FlowEstimator for PyramidalLk {
    fn estimate(&self, prev: &GrayFrame, next: &GrayFrame, points: &[Point2]) -> FlowResult {
        if prev.dimensions() != next.dimensions() || prev.is_empty() {
            return FlowResult::all_lost(points);
        }

        let prev_pyr = ImagePyramid::build(prev, self.params.pyramid_levels);
        let next_pyr = ImagePyramid::build(next, self.params.pyramid_levels);
        let grads: Vec<LevelGradients> = prev_pyr
            .levels
            .iter()
            .map(|level| {
                let (ix, iy) = compute_gradients(level);
                LevelGradients { ix, iy }
            })
            .collect();

        let tracks: Vec<Track> = points
            .par_iter()
            .map(|&p| self.track_point(&prev_pyr, &next_pyr, &grads, p))
            .collect();

        let mut result = FlowResult::with_capacity(tracks.len());
        for t in tracks {
            result.points.push(t.position);
            result.status.push(t.found);
            result.errors.push(t.error);
        }
        result
    }
}

/// Whether a window of half-size `hw` centered at `q` overlaps the image.
#[inline]
fn in_bounds(img: &FloatImage, q: Point2, hw: f32) -> bool {
    q.x >= -hw && q.y >= -hw && q.x <= img.width as f32 - 1.0 + hw && q.y <= img.height as f32 - 1.0 + hw
}

/// Mean absolute intensity difference over the window, in 8-bit units.
fn window_error(prev: &FloatImage, next: &FloatImage, from: Point2, to: Point2, hw: i32) -> f32 {
    let mut sum = 0.0f32;
    let mut n = 0u32;
    for wy in -hw..=hw {
        for wx in -hw..=hw {
            let (ox, oy) = (wx as f32, wy as f32);
            sum += (next.sample(to.x + ox, to.y + oy) - prev.sample(from.x + ox, from.y + oy)).abs();
            n += 1;
        }
    }
    sum / n as f32 * 255.0
}
