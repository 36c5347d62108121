//! Application configuration: optional JSON file plus command-line overrides.

use crate::Args;
use anyhow::{bail, Context, Result};
use flowcam_capture::CaptureConfig;
use flowcam_tracking::{OverlayStyle, TrackerConfig};
use flowcam_vision::LkParams;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub capture: CaptureConfig,
    pub tracker: TrackerConfig,
    pub lk: LkParams,
    pub style: OverlayStyle,
}

impl AppConfig {
    /// Read `path` if given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = Self::from_json(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Command-line flags win over the file.
    pub fn apply_args(&mut self, args: &Args) {
        let capture = &mut self.capture;
        if let Some(device) = &args.device {
            capture.device.clone_from(device);
        }
        if let Some(format) = &args.input_format {
            capture.input_format.clone_from(format);
        }
        if let Some(width) = args.width {
            capture.width = width;
        }
        if let Some(height) = args.height {
            capture.height = height;
        }
        if let Some(fps) = args.fps {
            capture.fps = fps;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.tracker.validate()?;
        let capture = &self.capture;
        if capture.width == 0 || capture.height == 0 {
            bail!("capture size {}x{} is empty", capture.width, capture.height);
        }
        if capture.fps == 0 {
            bail!("capture fps must be positive");
        }
        if self.lk.pyramid_levels == 0 {
            bail!("lk.pyramid_levels must be at least 1");
        }
        Ok(())
    }
}
