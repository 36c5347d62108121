//! Viewport: camera texture with the feature overlay painted on top.

use egui::{self, Color32, Pos2, Stroke, TextureHandle};
use flowcam_core::{Color, Point2, Rect};
use flowcam_tracking::{Overlay, OverlayStyle, Primitive};

// ── Local domain constants ──────────────────────────────────────
const HINT_FONT_SIZE: f32 = 16.0;
const STATUS_FONT_SIZE: f32 = 12.0;
const STATUS_MARGIN: f32 = 8.0;

// ── State ──────────────────────────────────────────────────────

/// Everything the viewport needs for one paint.
pub struct ViewerState<'a> {
    pub texture: Option<&'a TextureHandle>,
    /// Frame size in pixels; overlay coordinates live in this space.
    pub frame_size: Option<(u32, u32)>,
    pub overlay: &'a Overlay,
    pub style: &'a OverlayStyle,
    pub has_source: bool,
    pub status: Option<String>,
}

// ── Rendering ──────────────────────────────────────────────────

pub fn show_viewer(ui: &mut egui::Ui, state: &ViewerState<'_>) {
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
    let rect = response.rect;

    painter.rect_filled(rect, 0.0, Color32::BLACK);

    let Some((width, height)) = state.frame_size.filter(|&(w, h)| w > 0 && h > 0) else {
        let hint = if state.has_source {
            "Waiting for frames..."
        } else {
            "No camera\nRun with --synthetic to use a test pattern"
        };
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            hint,
            egui::FontId::proportional(HINT_FONT_SIZE),
            Color32::GRAY,
        );
        return;
    };

    let content = Point2::new(width as f32, height as f32);
    let view = from_egui_rect(rect).fit_aspect(content);
    let scale = if content.x > 0.0 { view.width / content.x } else { 1.0 };

    if let Some(texture) = state.texture {
        let uv = egui::Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
        painter.image(texture.id(), to_egui_rect(view), uv, to_color32(state.style.background));
    }

    let to_screen = |p: Point2| to_pos2(view.map_from(content, p));
    for primitive in &state.overlay.primitives {
        match *primitive {
            Primitive::StrokedCircle {
                center,
                radius,
                color,
                width,
            } => {
                painter.circle_stroke(
                    to_screen(center),
                    radius * scale,
                    Stroke::new((width * scale).max(1.0), to_color32(color)),
                );
            }
            Primitive::FilledCircle {
                center,
                radius,
                color,
            } => {
                painter.circle_filled(to_screen(center), radius * scale, to_color32(color));
            }
            Primitive::Segment {
                from,
                to,
                color,
                width,
            } => {
                painter.line_segment(
                    [to_screen(from), to_screen(to)],
                    Stroke::new((width * scale).max(1.0), to_color32(color)),
                );
            }
        }
    }

    if let Some(status) = &state.status {
        painter.text(
            Pos2::new(rect.left() + STATUS_MARGIN, rect.top() + STATUS_MARGIN),
            egui::Align2::LEFT_TOP,
            status,
            egui::FontId::monospace(STATUS_FONT_SIZE),
            Color32::from_gray(200),
        );
    }
}

// ── Conversions ────────────────────────────────────────────────

pub fn to_color32(color: Color) -> Color32 {
    let [r, g, b, a] = color.to_rgba8();
    Color32::from_rgba_unmultiplied(r, g, b, a)
}

fn to_pos2(p: Point2) -> Pos2 {
    Pos2::new(p.x, p.y)
}

fn to_egui_rect(rect: Rect) -> egui::Rect {
    egui::Rect::from_min_max(to_pos2(rect.min()), to_pos2(rect.max()))
}

fn from_egui_rect(rect: egui::Rect) -> Rect {
    Rect::new(rect.left(), rect.top(), rect.width(), rect.height())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_conversion_keeps_alpha() {
        let c = to_color32(Color::RED.with_alpha(0.5));
        assert_eq!(c.a(), 128);
        assert_eq!(c, Color32::from_rgba_unmultiplied(255, 0, 0, 128));
    }

    #[test]
    fn test_rect_roundtrip() {
        let r = egui::Rect::from_min_max(Pos2::new(10.0, 20.0), Pos2::new(110.0, 70.0));
        assert_eq!(to_egui_rect(from_egui_rect(r)), r);
    }
}
