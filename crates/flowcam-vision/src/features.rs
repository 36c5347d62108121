//! Shi-Tomasi "good features to track" corner detection.
//!
//! Corner response is the minimum eigenvalue of the gradient structure tensor
//! accumulated over a small block. Candidates are thresholded relative to the
//! strongest response, reduced to 3x3 local maxima, ranked, and thinned so no
//! two accepted corners are closer than the minimum distance.

use crate::{DetectParams, FeatureDetector};
use flowcam_core::{GrayFrame, Point2};
use rayon::prelude::*;

/// Shi-Tomasi corner detector.
#[derive(Debug, Clone)]
pub struct GoodFeatures {
    /// Side of the square neighbourhood the structure tensor is summed over.
    pub block_size: u32,
}

impl Default for GoodFeatures {
    fn default() -> Self {
        Self { block_size: 3 }
    }
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    x: u32,
    y: u32,
    response: f32,
}

impl GoodFeatures {
    pub fn new(block_size: u32) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    /// Minimum-eigenvalue corner response for every pixel, row-major.
    pub fn corner_response(&self, image: &GrayFrame) -> Vec<f32> {
        let (w, h) = image.dimensions();
        if w == 0 || h == 0 {
            return Vec::new();
        }

        let (gx, gy) = sobel(image);
        let r = (self.block_size / 2) as i32;
        let at = |buf: &[f32], x: i32, y: i32| -> f32 {
            let x = x.clamp(0, w as i32 - 1) as usize;
            let y = y.clamp(0, h as i32 - 1) as usize;
            buf[y * w as usize + x]
        };

        let mut response = vec![0.0f32; w as usize * h as usize];
        response
            .par_chunks_mut(w as usize)
            .enumerate()
            .for_each(|(y, row)| {
                let y = y as i32;
                for (x, out) in row.iter_mut().enumerate() {
                    let x = x as i32;
                    let (mut a, mut b, mut c) = (0.0f32, 0.0f32, 0.0f32);
                    for dy in -r..=r {
                        for dx in -r..=r {
                            let ix = at(&gx, x + dx, y + dy);
                            let iy = at(&gy, x + dx, y + dy);
                            a += ix * ix;
                            b += ix * iy;
                            c += iy * iy;
                        }
                    }
                    let half_trace = (a + c) * 0.5;
                    let disc = ((a - c) * 0.5).powi(2) + b * b;
                    *out = (half_trace - disc.sqrt()).max(0.0);
                }
            });
        response
    }
}

impl FeatureDetector for GoodFeatures {
    fn detect(&self, image: &GrayFrame, params: &DetectParams) -> Vec<Point2> {
        let (w, h) = image.dimensions();
        if params.max_count == 0 || w < 3 || h < 3 {
            return Vec::new();
        }

        let response = self.corner_response(image);
        let max_response = response.iter().copied().fold(0.0f32, f32::max);
        if max_response <= f32::EPSILON {
            return Vec::new();
        }
        let threshold = max_response * params.quality_level.max(0.0);

        // 3x3 local maxima above threshold, border excluded
        let stride = w as usize;
        let mut candidates = Vec::new();
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let idx = y as usize * stride + x as usize;
                let v = response[idx];
                if v <= threshold {
                    continue;
                }
                let is_max = (-1i32..=1).all(|dy| {
                    (-1i32..=1).all(|dx| {
                        let n = (y as i32 + dy) as usize * stride + (x as i32 + dx) as usize;
                        response[n] <= v
                    })
                });
                if is_max {
                    candidates.push(Candidate { x, y, response: v });
                }
            }
        }

        // Strongest first; the sort is stable so ties stay in row-major order
        candidates.sort_by(|a, b| b.response.total_cmp(&a.response));

        select_with_min_distance(&candidates, w, h, params.min_distance, params.max_count)
    }
}

/// Greedy selection on a grid of `min_distance`-sized cells.
fn select_with_min_distance(
    candidates: &[Candidate],
    width: u32,
    height: u32,
    min_distance: f32,
    max_count: usize,
) -> Vec<Point2> {
    let mut accepted = Vec::with_capacity(max_count.min(candidates.len()));

    if min_distance.is_nan() || min_distance < 1.0 {
        accepted.extend(
            candidates
                .iter()
                .take(max_count)
                .map(|c| Point2::new(c.x as f32, c.y as f32)),
        );
        return accepted;
    }
    if min_distance.is_infinite() {
        // Every pair is too close; only the strongest survives
        accepted.extend(
            candidates
                .first()
                .filter(|_| max_count > 0)
                .map(|c| Point2::new(c.x as f32, c.y as f32)),
        );
        return accepted;
    }

    let cell = min_distance;
    let grid_w = ((width as f32 / cell).ceil() as usize).max(1);
    let grid_h = ((height as f32 / cell).ceil() as usize).max(1);
    let mut grid: Vec<Vec<Point2>> = vec![Vec::new(); grid_w * grid_h];
    let min_dist_sq = min_distance * min_distance;

    for c in candidates {
        if accepted.len() >= max_count {
            break;
        }
        let p = Point2::new(c.x as f32, c.y as f32);
        let cx = ((p.x / cell) as usize).min(grid_w - 1);
        let cy = ((p.y / cell) as usize).min(grid_h - 1);

        let too_close = (cy.saturating_sub(1)..=(cy + 1).min(grid_h - 1)).any(|gy| {
            (cx.saturating_sub(1)..=(cx + 1).min(grid_w - 1))
                .any(|gx| grid[gy * grid_w + gx].iter().any(|q| q.distance_squared(p) < min_dist_sq))
        });
        if too_close {
            continue;
        }

        grid[cy * grid_w + cx].push(p);
        accepted.push(p);
    }
    accepted
}

/// 3x3 Sobel gradients with replicated borders.
fn sobel(image: &GrayFrame) -> (Vec<f32>, Vec<f32>) {
    let (w, h) = image.dimensions();
    let len = w as usize * h as usize;
    let mut gx = vec![0.0f32; len];
    let mut gy = vec![0.0f32; len];
    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let p = |dx: i32, dy: i32| image.get(x + dx, y + dy) as f32 / 255.0;
            let idx = y as usize * w as usize + x as usize;
            gx[idx] = (p(1, -1) + 2.0 * p(1, 0) + p(1, 1)) - (p(-1, -1) + 2.0 * p(-1, 0) + p(-1, 1));
            gy[idx] = (p(-1, 1) + 2.0 * p(0, 1) + p(1, 1)) - (p(-1, -1) + 2.0 * p(0, -1) + p(1, -1));
        }
    }
    (gx, gy)
}
