//! Camera capture using FFmpeg via ffmpeg-sidecar.
//!
//! FFmpeg runs as a subprocess reading the platform camera and writing raw
//! RGB24 frames to its stdout. A reader thread turns those into
//! [`FrameBuffer`]s and hands only the newest one to the UI thread.

use crate::config::CaptureConfig;
use crate::error::{CaptureError, CaptureResult};
use crate::FrameSource;
use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};
use ffmpeg_sidecar::command::{ffmpeg_is_installed, FfmpegCommand};
use ffmpeg_sidecar::child::FfmpegChild;
use ffmpeg_sidecar::event::{FfmpegEvent, LogLevel};
use flowcam_core::{FrameBuffer, PixelFormat};
use std::thread::JoinHandle;
use tracing::{debug, info, warn};

/// An open camera. Dropping it stops FFmpeg and the reader thread.
pub struct CameraCapture {
    config: CaptureConfig,
    child: FfmpegChild,
    frames: Receiver<FrameBuffer>,
    reader: Option<JoinHandle<()>>,
    stream_ended: bool,
}

impl CameraCapture {
    /// Start capturing from the configured camera.
    pub fn open(config: &CaptureConfig) -> CaptureResult<Self> {
        if config.width == 0 || config.height == 0 || config.fps == 0 {
            return Err(CaptureError::InvalidConfig(format!(
                "{}x{} @ {} fps",
                config.width, config.height, config.fps
            )));
        }
        if !ffmpeg_is_installed() {
            return Err(CaptureError::FfmpegMissing);
        }

        info!(
            "Opening camera {} ({}) at {}x{} {} fps",
            config.device, config.input_format, config.width, config.height, config.fps
        );

        let spawn_error = |reason: String| CaptureError::Spawn {
            device: config.device.clone(),
            reason,
        };

        let mut child = FfmpegCommand::new()
            .hide_banner()
            .args(config.input_args())
            .input(&config.device)
            .rawvideo()
            .spawn()
            .map_err(|e| spawn_error(e.to_string()))?;

        let events = child.iter().map_err(|e| spawn_error(e.to_string()))?;

        // Capacity 1: the consumer only ever wants the newest frame
        let (tx, rx) = crossbeam_channel::bounded(1);
        let stale = rx.clone();
        let (width, height) = (config.width, config.height);
        let reader = std::thread::Builder::new()
            .name("flowcam-capture".into())
            .spawn(move || read_frames(events, tx, stale, width, height))?;

        Ok(Self {
            config: config.clone(),
            child,
            frames: rx,
            reader: Some(reader),
            stream_ended: false,
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Whether FFmpeg stopped delivering frames.
    pub fn stream_ended(&self) -> bool {
        self.stream_ended
    }
}

impl FrameSource for CameraCapture {
    fn next_frame(&mut self) -> Option<FrameBuffer> {
        match self.frames.try_recv() {
            Ok(frame) => Some(frame),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                if !self.stream_ended {
                    warn!("Camera stream ended: {}", self.config.device);
                    self.stream_ended = true;
                }
                None
            }
        }
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if let Err(e) = self.child.kill() {
            debug!("FFmpeg already stopped: {}", e);
        }
        let _ = self.child.wait();
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        info!("Camera released: {}", self.config.device);
    }
}

fn read_frames(
    events: impl Iterator<Item = FfmpegEvent>,
    tx: Sender<FrameBuffer>,
    stale: Receiver<FrameBuffer>,
    width: u32,
    height: u32,
) {
    let mut size_check = SizeCheck::new(width, height);
    for event in events {
        match event {
            FfmpegEvent::OutputFrame(frame) => {
                if size_check.first_mismatch(frame.width, frame.height) {
                    warn!(
                        "Camera delivered {}x{}, expected {}x{}",
                        frame.width, frame.height, width, height
                    );
                }
                let buffer = match FrameBuffer::from_packed(
                    frame.width,
                    frame.height,
                    PixelFormat::Rgb8,
                    &frame.data,
                ) {
                    Ok(buffer) => buffer,
                    Err(e) => {
                        warn!(frame = frame.frame_num, "Dropping camera frame: {}", e);
                        continue;
                    }
                };
                publish_latest(&tx, &stale, buffer);
            }
            FfmpegEvent::Log(LogLevel::Error | LogLevel::Fatal, msg) | FfmpegEvent::Error(msg) => {
                warn!("FFmpeg: {}", msg);
            }
            FfmpegEvent::Done => break,
            _ => {}
        }
    }
    debug!("Capture reader finished");
}

/// Tracks whether an unexpected frame size was already reported.
struct SizeCheck {
    expected: (u32, u32),
    reported: bool,
}

impl SizeCheck {
    fn new(width: u32, height: u32) -> Self {
        Self {
            expected: (width, height),
            reported: false,
        }
    }

    /// True only for the first frame whose size differs from the configured one.
    fn first_mismatch(&mut self, width: u32, height: u32) -> bool {
        if self.reported || (width, height) == self.expected {
            return false;
        }
        self.reported = true;
        true
    }
}

/// Send `frame`, replacing a frame the consumer has not picked up yet.
fn publish_latest(tx: &Sender<FrameBuffer>, stale: &Receiver<FrameBuffer>, frame: FrameBuffer) {
    if let Err(TrySendError::Full(frame)) = tx.try_send(frame) {
        let _ = stale.try_recv();
        let _ = tx.try_send(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_latest_keeps_newest() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let stale = rx.clone();
        for width in 1..=3 {
            publish_latest(&tx, &stale, FrameBuffer::new(width, 1, PixelFormat::Rgb8));
        }
        assert_eq!(rx.try_recv().unwrap().width, 3);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_size_mismatch_reported_once() {
        let mut check = SizeCheck::new(640, 480);
        assert!(!check.first_mismatch(640, 480));
        assert!(check.first_mismatch(1280, 720));
        for _ in 0..30 {
            assert!(!check.first_mismatch(1280, 720));
        }
        assert!(!check.first_mismatch(320, 240));
    }

    #[test]
    fn test_invalid_config_rejected_before_spawn() {
        let config = CaptureConfig {
            width: 0,
            ..CaptureConfig::default()
        };
        assert!(matches!(
            CameraCapture::open(&config),
            Err(CaptureError::InvalidConfig(_))
        ));
    }
}
