//! Integration tests for frame sources feeding the vision pipeline.

use flowcam_capture::{CaptureConfig, FrameSource, SyntheticSource};
use flowcam_core::{FrameBuffer, PixelFormat, Point2};
use flowcam_vision::{DetectParams, FeatureDetector, GoodFeatures};

#[test]
fn synthetic_frames_convert_to_matching_gray() {
    let mut source = SyntheticSource::new(96, 72);
    let expected = source.gray_frame_at(0);
    let frame = source.next_frame().unwrap();
    assert_eq!(frame.format, PixelFormat::Rgb8);
    assert_eq!(frame.to_gray(), expected);
    assert_eq!(source.dimensions(), (96, 72));
}

#[test]
fn raw_rgb24_bytes_roundtrip_through_gray() {
    // What the FFmpeg reader receives: packed RGB24 rows
    let (w, h) = (8u32, 4u32);
    let bytes: Vec<u8> = (0..w * h).flat_map(|i| [i as u8 * 4, 0, 0]).collect();
    let frame = FrameBuffer::from_packed(w, h, PixelFormat::Rgb8, &bytes).unwrap();
    let gray = frame.to_gray();
    assert_eq!(gray.dimensions(), (w, h));
    assert_eq!(gray.get(0, 0), 0);
    // 0.299 * 124 = 37.08
    assert_eq!(gray.get(7, 3), 37);
    assert_eq!(frame.to_rgba8_packed().len(), (w * h * 4) as usize);
}

#[test]
fn wrong_sized_payload_is_rejected() {
    assert!(FrameBuffer::from_packed(8, 8, PixelFormat::Rgb8, &[0u8; 10]).is_err());
}

#[test]
fn synthetic_square_corners_are_detected() {
    let source = SyntheticSource::new(160, 120).with_square(Point2::new(50.0, 40.0), 40.0);
    let features = GoodFeatures::default().detect(&source.gray_frame_at(0), &DetectParams::default());
    assert!(!features.is_empty());

    let corners = [
        Point2::new(50.0, 40.0),
        Point2::new(89.0, 40.0),
        Point2::new(50.0, 79.0),
        Point2::new(89.0, 79.0),
    ];
    for p in &features {
        let nearest = corners.iter().map(|c| c.distance(*p)).fold(f32::MAX, f32::min);
        assert!(nearest <= 3.0, "{p:?} is not near a square corner");
    }
}

#[test]
fn default_capture_matches_vga_30fps() {
    let config = CaptureConfig::default();
    assert_eq!((config.width, config.height, config.fps), (640, 480, 30));
    let args = config.input_args();
    assert!(args.contains(&"640x480".to_string()));
}
