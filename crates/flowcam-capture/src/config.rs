//! Capture configuration with per-platform camera defaults.

use flowcam_core::defaults::{CAPTURE_FPS, CAPTURE_HEIGHT, CAPTURE_WIDTH};
use serde::{Deserialize, Serialize};

/// How to open the camera.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// FFmpeg input name, e.g. `/dev/video0`, `0` or `video=Integrated Camera`.
    pub device: String,
    /// FFmpeg input format (`v4l2`, `avfoundation`, `dshow`).
    pub input_format: String,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        let (input_format, device) = platform_default_input();
        Self {
            device: device.to_string(),
            input_format: input_format.to_string(),
            width: CAPTURE_WIDTH,
            height: CAPTURE_HEIGHT,
            fps: CAPTURE_FPS,
        }
    }
}

impl CaptureConfig {
    /// FFmpeg arguments that must precede `-i`.
    pub fn input_args(&self) -> Vec<String> {
        vec![
            "-f".to_string(),
            self.input_format.clone(),
            "-video_size".to_string(),
            format!("{}x{}", self.width, self.height),
            "-framerate".to_string(),
            self.fps.to_string(),
        ]
    }
}

fn platform_default_input() -> (&'static str, &'static str) {
    if cfg!(target_os = "macos") {
        ("avfoundation", "0")
    } else if cfg!(target_os = "windows") {
        ("dshow", "video=Integrated Camera")
    } else {
        ("v4l2", "/dev/video0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_vga() {
        let config = CaptureConfig::default();
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.fps, 30);
        assert!(!config.device.is_empty());
    }

    #[test]
    fn test_input_args_order() {
        let config = CaptureConfig {
            device: "/dev/video2".into(),
            input_format: "v4l2".into(),
            width: 320,
            height: 240,
            fps: 15,
        };
        assert_eq!(
            config.input_args(),
            vec!["-f", "v4l2", "-video_size", "320x240", "-framerate", "15"]
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CaptureConfig = serde_json::from_str(r#"{ "device": "/dev/video1" }"#).unwrap();
        assert_eq!(config.device, "/dev/video1");
        assert_eq!(config.width, 640);
    }
}
