//! FlowCam - live sparse optical flow viewer
//!
//! Entry point: command line, logging, configuration and the window.

mod app;
mod config;
mod viewer;

use anyhow::Result;
use app::FlowCamApp;
use clap::Parser;
use config::AppConfig;
use eframe::egui;
use flowcam_capture::{CameraCapture, FrameSource, SyntheticSource};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Track corner features in a live camera feed and draw their motion.
#[derive(Debug, Parser)]
#[command(name = "flowcam", version, about)]
pub struct Args {
    /// JSON configuration file with `capture`, `tracker`, `lk` and `style` sections
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Camera device as FFmpeg names it (e.g. /dev/video0)
    #[arg(long)]
    pub device: Option<String>,

    /// FFmpeg input format (v4l2, avfoundation, dshow)
    #[arg(long)]
    pub input_format: Option<String>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub fps: Option<u32>,

    /// Use a generated moving pattern instead of a camera
    #[arg(long)]
    pub synthetic: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("FlowCam starting...");

    let mut config = AppConfig::load(args.config.as_deref())?;
    config.apply_args(&args);
    config.validate()?;

    let source = open_source(&config, args.synthetic);
    let (width, height) = (config.capture.width, config.capture.height);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([width as f32, height as f32])
            .with_title("FlowCam"),
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    eframe::run_native(
        "FlowCam",
        options,
        Box::new(move |cc| Ok(Box::new(FlowCamApp::new(cc, config, source)))),
    )?;

    info!("FlowCam exiting");
    Ok(())
}

fn open_source(config: &AppConfig, synthetic: bool) -> Option<Box<dyn FrameSource>> {
    let capture = &config.capture;
    if synthetic {
        info!("Using synthetic source at {}x{}", capture.width, capture.height);
        return Some(Box::new(SyntheticSource::new(capture.width, capture.height)));
    }
    match CameraCapture::open(capture) {
        Ok(camera) => Some(Box::new(camera)),
        Err(e) => {
            error!("Failed to open camera: {}", e);
            None
        }
    }
}
