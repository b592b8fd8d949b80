use super::palette::Palette;
use super::raster::text_width;
use super::surface::{Rect, Surface};
use crate::player::SurfaceSize;

use sentinel_model::{BoundingBox, Detection, Event};

/// Map a normalized box onto a surface of `size` pixels.
///
/// The box is clamped to the frame first; `None` when nothing of it remains
/// visible or the surface has no area.
pub fn project(bbox: &BoundingBox, size: SurfaceSize) -> Option<Rect> {
    if size.is_empty() {
        return None;
    }
    let clamped = bbox.clamped();
    if clamped.is_empty() {
        return None;
    }
    let (w, h) = (size.width as f32, size.height as f32);
    Some(Rect::new(
        clamped.x * w,
        clamped.y * h,
        clamped.w * w,
        clamped.h * h,
    ))
}

/// Paints detection boxes and their captions.
///
/// Every call clears the surface and repaints it from scratch; nothing from
/// a previous event survives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRenderer {
    pub line_width: f32,
    pub font_size: f32,
    pub label_padding: f32,
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self {
            line_width: 2.0,
            font_size: 7.0,
            label_padding: 2.0,
        }
    }
}

impl OverlayRenderer {
    /// Redraw for one event, choosing the palette from its kind. Returns the
    /// number of boxes drawn.
    pub fn render_event(&self, surface: &mut dyn Surface, event: &Event) -> usize {
        self.render(
            surface,
            event.detections(),
            Palette::for_anomalous(event.is_anomalous()),
        )
    }

    pub fn render(
        &self,
        surface: &mut dyn Surface,
        detections: &[Detection],
        palette: Palette,
    ) -> usize {
        surface.clear();
        let size = surface.size();
        if size.is_empty() {
            return 0;
        }

        let mut drawn = 0;
        for detection in detections {
            let Some(rect) = project(&detection.bbox, size) else {
                continue;
            };
            surface.fill_rect(rect, palette.fill);
            surface.stroke_rect(rect, palette.stroke, self.line_width);
            self.label(surface, size, rect, &detection.label_text(), palette);
            drawn += 1;
        }
        drawn
    }

    /// Caption plate above the box, or just inside it when the box touches
    /// the top edge.
    pub fn label_rect(&self, size: SurfaceSize, rect: Rect, text: &str) -> Rect {
        let width = text_width(text, self.font_size) + 2.0 * self.label_padding;
        let height = self.font_size + 2.0 * self.label_padding;

        let y = if rect.y >= height { rect.y - height } else { rect.y };
        let max_x = (size.width as f32 - width).max(0.0);
        Rect::new(rect.x.min(max_x), y, width, height)
    }

    fn label(
        &self,
        surface: &mut dyn Surface,
        size: SurfaceSize,
        rect: Rect,
        text: &str,
        palette: Palette,
    ) {
        let plate = self.label_rect(size, rect, text);
        surface.fill_rect(plate, palette.label_background);
        surface.text(
            plate.x + self.label_padding,
            plate.y + self.label_padding,
            text,
            palette.label_text,
            self.font_size,
        );
    }
}
