//! Frame buffer types for camera frames in CPU memory.
//!
//! Camera frames arrive as packed RGB/RGBA and are stored with a 64-byte
//! aligned stride. The vision code works on [`GrayFrame`], a tightly packed
//! single-channel 8-bit image.

use crate::error::{FlowCamError, Result};
use serde::{Deserialize, Serialize};

/// Pixel format enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// 8-bit RGBA (32 bits per pixel)
    #[default]
    Rgba8,
    /// 8-bit RGB (24 bits per pixel), as delivered by FFmpeg rawvideo
    Rgb8,
    /// 8-bit grayscale
    Gray8,
}

impl PixelFormat {
    /// Bytes per pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Rgba8 => 4,
            Self::Rgb8 => 3,
            Self::Gray8 => 1,
        }
    }

    /// Bytes needed for a tightly packed frame of this format.
    pub fn packed_size(self, width: u32, height: u32) -> usize {
        width as usize * height as usize * self.bytes_per_pixel()
    }
}

/// A plane of pixel data with stride information.
#[derive(Debug, Clone)]
pub struct FramePlane {
    /// Raw pixel data
    pub data: Vec<u8>,
    /// Bytes per row (may include padding)
    pub stride: usize,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    bytes_per_pixel: usize,
}

impl FramePlane {
    /// Create a zeroed plane with the given dimensions.
    pub fn new(width: u32, height: u32, bytes_per_pixel: usize) -> Self {
        // Align stride to 64 bytes for SIMD and texture upload
        let min_stride = (width as usize) * bytes_per_pixel;
        let stride = (min_stride + 63) & !63;
        Self {
            data: vec![0u8; stride * height as usize],
            stride,
            width,
            height,
            bytes_per_pixel,
        }
    }

    /// Get a row of pixel data (padding excluded).
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.row_bytes()]
    }

    /// Get a mutable row of pixel data (padding excluded).
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let end = start + self.row_bytes();
        &mut self.data[start..end]
    }

    #[inline]
    fn row_bytes(&self) -> usize {
        self.width as usize * self.bytes_per_pixel
    }
}

/// A camera frame in CPU memory.
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    /// Pixel format
    pub format: PixelFormat,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel data
    pub plane: FramePlane,
}

impl FrameBuffer {
    /// Create a zeroed frame buffer with the given dimensions and format.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            format,
            width,
            height,
            plane: FramePlane::new(width, height, format.bytes_per_pixel()),
        }
    }

    /// Build a frame from tightly packed pixel bytes.
    pub fn from_packed(width: u32, height: u32, format: PixelFormat, bytes: &[u8]) -> Result<Self> {
        let expected = format.packed_size(width, height);
        if bytes.len() != expected {
            return Err(FlowCamError::BufferSize {
                expected,
                actual: bytes.len(),
            });
        }

        let mut frame = Self::new(width, height, format);
        let row_bytes = width as usize * format.bytes_per_pixel();
        if row_bytes == 0 {
            return Ok(frame);
        }
        for (y, src) in bytes.chunks_exact(row_bytes).enumerate() {
            frame.plane.row_mut(y as u32).copy_from_slice(src);
        }
        Ok(frame)
    }

    /// Total memory usage of this frame in bytes.
    pub fn memory_size(&self) -> usize {
        self.plane.data.len()
    }

    /// Read one pixel as RGBA regardless of the storage format.
    pub fn pixel_rgba(&self, x: u32, y: u32) -> [u8; 4] {
        let row = self.plane.row(y);
        let bpp = self.format.bytes_per_pixel();
        let p = &row[x as usize * bpp..(x as usize + 1) * bpp];
        match self.format {
            PixelFormat::Rgba8 => [p[0], p[1], p[2], p[3]],
            PixelFormat::Rgb8 => [p[0], p[1], p[2], 255],
            PixelFormat::Gray8 => [p[0], p[0], p[0], 255],
        }
    }

    /// Pack the frame into contiguous RGBA8 bytes for texture upload.
    pub fn to_rgba8_packed(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PixelFormat::Rgba8.packed_size(self.width, self.height));
        for y in 0..self.height {
            let row = self.plane.row(y);
            match self.format {
                PixelFormat::Rgba8 => out.extend_from_slice(row),
                PixelFormat::Rgb8 => {
                    for p in row.chunks_exact(3) {
                        out.extend_from_slice(&[p[0], p[1], p[2], 255]);
                    }
                }
                PixelFormat::Gray8 => {
                    for &v in row {
                        out.extend_from_slice(&[v, v, v, 255]);
                    }
                }
            }
        }
        out
    }

    /// Convert to a single-channel 8-bit frame using Rec.601 luma weights.
    pub fn to_gray(&self) -> GrayFrame {
        let mut gray = GrayFrame::new(self.width, self.height);
        for y in 0..self.height {
            let row = self.plane.row(y);
            let dst = &mut gray.data[(y * self.width) as usize..((y + 1) * self.width) as usize];
            match self.format {
                PixelFormat::Gray8 => dst.copy_from_slice(row),
                PixelFormat::Rgb8 | PixelFormat::Rgba8 => {
                    let bpp = self.format.bytes_per_pixel();
                    for (d, p) in dst.iter_mut().zip(row.chunks_exact(bpp)) {
                        *d = luma(p[0], p[1], p[2]);
                    }
                }
            }
        }
        gray
    }
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

/// A tightly packed single-channel 8-bit image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayFrame {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl GrayFrame {
    /// Create a black frame.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    /// Create a frame filled with one value.
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width as usize * height as usize],
        }
    }

    /// Create a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> u8) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap existing packed bytes.
    pub fn from_vec(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(FlowCamError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Pixel value with coordinates clamped to the image border.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        let x = x.clamp(0, self.width as i32 - 1) as u32;
        let y = y.clamp(0, self.height as i32 - 1) as u32;
        self.data[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: u32, y: u32, val: u8) {
        if x < self.width && y < self.height {
            self.data[(y * self.width + x) as usize] = val;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stride_is_aligned() {
        let frame = FrameBuffer::new(640, 480, PixelFormat::Rgb8);
        assert_eq!(frame.plane.stride % 64, 0);
        assert!(frame.memory_size() >= 640 * 480 * 3);
    }

    #[test]
    fn test_from_packed_rejects_short_buffer() {
        let err = FrameBuffer::from_packed(4, 4, PixelFormat::Rgb8, &[0u8; 10]).unwrap_err();
        assert!(matches!(
            err,
            FlowCamError::BufferSize {
                expected: 48,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_rgb_to_gray() {
        let bytes = [255, 255, 255, 0, 0, 0, 255, 0, 0];
        let frame = FrameBuffer::from_packed(3, 1, PixelFormat::Rgb8, &bytes).unwrap();
        let gray = frame.to_gray();
        assert_eq!(gray.data, vec![255, 0, 76]);
    }

    #[test]
    fn test_rgba_packing_drops_padding() {
        let bytes: Vec<u8> = (0..5 * 2 * 3).map(|v| v as u8).collect();
        let frame = FrameBuffer::from_packed(5, 2, PixelFormat::Rgb8, &bytes).unwrap();
        let packed = frame.to_rgba8_packed();
        assert_eq!(packed.len(), 5 * 2 * 4);
        assert_eq!(&packed[0..4], &[0, 1, 2, 255]);
        // First pixel of the second row
        assert_eq!(&packed[20..24], &[15, 16, 17, 255]);
        assert_eq!(frame.pixel_rgba(0, 1), [15, 16, 17, 255]);
    }

    #[test]
    fn test_gray_frame_clamped_access() {
        let mut img = GrayFrame::new(4, 4);
        img.set(3, 3, 200);
        assert_eq!(img.get(3, 3), 200);
        assert_eq!(img.get(100, 100), 200);
        assert_eq!(img.get(-1, -1), 0);
        // Out of range writes are ignored
        img.set(10, 10, 1);
        assert_eq!(img.data.iter().filter(|&&v| v != 0).count(), 1);
    }

    #[test]
    fn test_gray_from_vec_checks_len() {
        assert!(GrayFrame::from_vec(2, 2, vec![0; 4]).is_ok());
        assert!(GrayFrame::from_vec(2, 2, vec![0; 3]).is_err());
    }
}
