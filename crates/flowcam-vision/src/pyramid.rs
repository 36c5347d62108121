//! Image pyramid utilities for multi-scale tracking.

use flowcam_core::GrayFrame;

/// Smallest side length a pyramid level may have.
const MIN_LEVEL_SIZE: u32 = 8;

/// A grayscale image stored as f32 values in [0, 1].
#[derive(Debug, Clone)]
pub struct FloatImage {
    pub data: Vec<f32>,
    pub width: u32,
    pub height: u32,
}

impl FloatImage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0.0; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Normalize an 8-bit frame into [0, 1].
    pub fn from_gray(frame: &GrayFrame) -> Self {
        Self {
            data: frame.data.iter().map(|&v| v as f32 / 255.0).collect(),
            width: frame.width,
            height: frame.height,
        }
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> f32 {
        let x = x.clamp(0, self.width as i32 - 1) as u32;
        let y = y.clamp(0, self.height as i32 - 1) as u32;
        self.data[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, val: f32) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = val;
        }
    }

    /// Bilinear sample with border clamping.
    #[inline]
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (ix, iy) = (x0 as i32, y0 as i32);
        let top = self.get(ix, iy) * (1.0 - fx) + self.get(ix + 1, iy) * fx;
        let bottom = self.get(ix, iy + 1) * (1.0 - fx) + self.get(ix + 1, iy + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }

    /// Half-resolution copy using a 2x2 box filter.
    pub fn downsample(&self) -> Self {
        let nw = self.width.div_ceil(2);
        let nh = self.height.div_ceil(2);
        let mut level = Self::new(nw, nh);
        for y in 0..nh {
            for x in 0..nw {
                let sx = (x * 2) as i32;
                let sy = (y * 2) as i32;
                let avg = (self.get(sx, sy)
                    + self.get(sx + 1, sy)
                    + self.get(sx, sy + 1)
                    + self.get(sx + 1, sy + 1))
                    * 0.25;
                level.set(x, y, avg);
            }
        }
        level
    }
}

/// Spatial gradients (Ix, Iy) using central differences.
pub fn compute_gradients(img: &FloatImage) -> (FloatImage, FloatImage) {
    let mut ix = FloatImage::new(img.width, img.height);
    let mut iy = FloatImage::new(img.width, img.height);
    for y in 0..img.height as i32 {
        for x in 0..img.width as i32 {
            let idx = (y as u32 * img.width + x as u32) as usize;
            ix.data[idx] = (img.get(x + 1, y) - img.get(x - 1, y)) * 0.5;
            iy.data[idx] = (img.get(x, y + 1) - img.get(x, y - 1)) * 0.5;
        }
    }
    (ix, iy)
}

/// Multi-scale image pyramid. Level 0 is full resolution.
pub struct ImagePyramid {
    pub levels: Vec<FloatImage>,
}

impl ImagePyramid {
    /// Build up to `num_levels` levels, stopping early once a level would
    /// shrink below a usable size.
    pub fn build(frame: &GrayFrame, num_levels: u32) -> Self {
        let mut levels = vec![FloatImage::from_gray(frame)];
        for _ in 1..num_levels.max(1) {
            let Some(prev) = levels.last() else { break };
            if prev.width.div_ceil(2) < MIN_LEVEL_SIZE || prev.height.div_ceil(2) < MIN_LEVEL_SIZE {
                break;
            }
            let next = prev.downsample();
            levels.push(next);
        }
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_gray_normalizes() {
        let frame = GrayFrame::from_vec(2, 1, vec![0, 255]).unwrap();
        let img = FloatImage::from_gray(&frame);
        assert_eq!(img.data, vec![0.0, 1.0]);
    }

    #[test]
    fn test_bilinear_sample() {
        let frame = GrayFrame::from_vec(2, 1, vec![0, 255]).unwrap();
        let img = FloatImage::from_gray(&frame);
        assert!((img.sample(0.5, 0.0) - 0.5).abs() < 1e-6);
        assert!((img.sample(0.25, 0.0) - 0.25).abs() < 1e-6);
        // Clamped outside the image
        assert!((img.sample(5.0, 3.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_pyramid_build() {
        let frame = GrayFrame::new(64, 64);
        let pyr = ImagePyramid::build(&frame, 3);
        assert_eq!(pyr.len(), 3);
        assert_eq!(pyr.levels[1].width, 32);
        assert_eq!(pyr.levels[2].width, 16);
    }

    #[test]
    fn test_pyramid_stops_on_small_images() {
        let frame = GrayFrame::new(20, 20);
        let pyr = ImagePyramid::build(&frame, 5);
        // 20 -> 10 -> (5 is too small)
        assert_eq!(pyr.len(), 2);
    }

    #[test]
    fn test_gradients() {
        let frame = GrayFrame::from_fn(8, 8, |x, _| (x * 30) as u8);
        let (ix, iy) = compute_gradients(&FloatImage::from_gray(&frame));
        assert!(ix.data[(4 * 8 + 4) as usize] > 0.0);
        assert_eq!(iy.data[(4 * 8 + 4) as usize], 0.0);
    }
}
