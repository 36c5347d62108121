//! The eframe application: one tracking tick per painted frame.

use crate::config::AppConfig;
use crate::viewer::{show_viewer, ViewerState};
use eframe::egui;
use egui::{ColorImage, TextureHandle, TextureOptions};
use flowcam_capture::FrameSource;
use flowcam_core::FrameBuffer;
use flowcam_tracking::{FlowTracker, Overlay, OverlayStyle, Tick};
use flowcam_vision::{GoodFeatures, PyramidalLk};
use tracing::info;

pub struct FlowCamApp {
    source: Option<Box<dyn FrameSource>>,
    tracker: FlowTracker,
    style: OverlayStyle,
    texture: Option<TextureHandle>,
    frame_size: Option<(u32, u32)>,
    last_tick: Option<Tick>,
}

impl FlowCamApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        source: Option<Box<dyn FrameSource>>,
    ) -> Self {
        let AppConfig {
            tracker, lk, style, ..
        } = config;
        Self {
            source,
            tracker: FlowTracker::new(tracker, GoodFeatures::default(), PyramidalLk::new(lk)),
            style,
            texture: None,
            frame_size: None,
            last_tick: None,
        }
    }

    /// Pull the newest frame, if any, and run one tracking tick on it.
    fn poll_source(&mut self, ctx: &egui::Context) {
        let Some(frame) = self.source.as_mut().and_then(|s| s.next_frame()) else {
            return;
        };
        self.upload_texture(ctx, &frame);
        self.frame_size = Some((frame.width, frame.height));
        self.last_tick = Some(self.tracker.update(frame.to_gray()));
    }

    fn upload_texture(&mut self, ctx: &egui::Context, frame: &FrameBuffer) {
        let image = ColorImage::from_rgba_unmultiplied(
            [frame.width as usize, frame.height as usize],
            &frame.to_rgba8_packed(),
        );
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::LINEAR),
            None => {
                info!("First frame {}x{}", frame.width, frame.height);
                self.texture = Some(ctx.load_texture("camera", image, TextureOptions::LINEAR));
            }
        }
    }

    fn status_line(&self) -> Option<String> {
        let tick = self.last_tick?;
        let features = self.tracker.features();
        let state = match tick {
            Tick::Primed => "primed",
            Tick::Reseeded { .. } => "re-seeded",
            Tick::Tracked { reseeded: true, .. } => "re-seeded + tracked",
            Tick::Tracked { .. } => "tracked",
        };
        Some(format!(
            "frame {} | {} features | {} matched | {}",
            self.tracker.frame_count(),
            features.len(),
            features.matched_count(),
            state
        ))
    }
}

impl eframe::App for FlowCamApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_source(ctx);

        let overlay = Overlay::build(self.tracker.features(), &self.style);
        let status = self.status_line();

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::BLACK))
            .show(ctx, |ui| {
                show_viewer(
                    ui,
                    &ViewerState {
                        texture: self.texture.as_ref(),
                        frame_size: self.frame_size,
                        overlay: &overlay,
                        style: &self.style,
                        has_source: self.source.is_some(),
                        status,
                    },
                );
            });

        if self.source.is_some() {
            ctx.request_repaint();
        }
    }
}
