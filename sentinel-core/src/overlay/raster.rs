use super::palette::Color;
use super::surface::{Rect, Surface};
use crate::player::SurfaceSize;

use image::{Pixel, Rgba, RgbaImage};

const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;

/// Width in pixels of `text` rendered at `size`.
pub fn text_width(text: &str, size: f32) -> f32 {
    (text.chars().count() as u32 * GLYPH_ADVANCE * glyph_scale(size)) as f32
}

fn glyph_scale(size: f32) -> u32 {
    ((size / GLYPH_HEIGHT as f32).round() as u32).max(1)
}

/// Transparent RGBA layer composited over a video frame.
#[derive(Debug, Clone)]
pub struct RasterLayer {
    image: RgbaImage,
}

impl RasterLayer {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            image: RgbaImage::new(size.width, size.height),
        }
    }

    /// Reallocate for a new size; contents are discarded.
    pub fn resize(&mut self, size: SurfaceSize) {
        if self.size() != size {
            self.image = RgbaImage::new(size.width, size.height);
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        let [r, g, b, a] = self.image.get_pixel(x, y).0;
        Some(Color::rgba(r, g, b, a))
    }

    /// Pixel bounds of `rect`, clipped to the layer.
    fn clip(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let (w, h) = (self.image.width() as f32, self.image.height() as f32);
        let x0 = rect.x.round().clamp(0.0, w) as u32;
        let y0 = rect.y.round().clamp(0.0, h) as u32;
        let x1 = rect.right().round().clamp(0.0, w) as u32;
        let y1 = rect.bottom().round().clamp(0.0, h) as u32;
        (x1 > x0 && y1 > y0).then_some((x0, y0, x1, y1))
    }

    fn blend(&mut self, x: u32, y: u32, color: Color) {
        if x < self.image.width() && y < self.image.height() {
            self.image
                .get_pixel_mut(x, y)
                .blend(&Rgba(color.to_array()));
        }
    }
}

impl Surface for RasterLayer {
    fn size(&self) -> SurfaceSize {
        SurfaceSize::new(self.image.width(), self.image.height())
    }

    fn clear(&mut self) {
        for pixel in self.image.pixels_mut() {
            *pixel = Rgba(Color::TRANSPARENT.to_array());
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        let line = line_width.max(1.0);
        let edges = [
            Rect::new(rect.x, rect.y, rect.width, line),
            Rect::new(rect.x, rect.bottom() - line, rect.width, line),
            Rect::new(rect.x, rect.y + line, line, rect.height - 2.0 * line),
            Rect::new(rect.right() - line, rect.y + line, line, rect.height - 2.0 * line),
        ];
        for edge in edges {
            self.fill_rect(edge, color);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some((x0, y0, x1, y1)) = self.clip(rect) else {
            return;
        };
        for y in y0..y1 {
            for x in x0..x1 {
                self.blend(x, y, color);
            }
        }
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Color, size: f32) {
        let scale = glyph_scale(size);
        let origin_x = x.round() as i64;
        let origin_y = y.round() as i64;

        for (index, ch) in text.chars().enumerate() {
            let glyph_x = origin_x + (index as u32 * GLYPH_ADVANCE * scale) as i64;
            for (row, &bits) in glyph(ch).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                        continue;
                    }
                    for dy in 0..scale {
                        for dx in 0..scale {
                            let px = glyph_x + (col * scale + dx) as i64;
                            let py = origin_y + (row as u32 * scale + dy) as i64;
                            if px >= 0 && py >= 0 {
                                self.blend(px as u32, py as u32, color);
                            }
                        }
                    }
                }
            }
        }
    }
}

/// 5x7 bitmap rows, most significant of the low five bits on the left.
fn glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_uppercase() {
        'A' => [0x0e, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11],
        'B' => [0x1e, 0x11, 0x11, 0x1e, 0x11, 0x11, 0x1e],
        'C' => [0x0e, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0e],
        'D' => [0x1e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1e],
        'E' => [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x1f],
        'F' => [0x1f, 0x10, 0x10, 0x1e, 0x10, 0x10, 0x10],
        'G' => [0x0e, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0f],
        'H' => [0x11, 0x11, 0x11, 0x1f, 0x11, 0x11, 0x11],
        'I' => [0x0e, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0e],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0c],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1f],
        'M' => [0x11, 0x1b, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x19, 0x15, 0x13, 0x11, 0x11, 0x11],
        'O' => [0x0e, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e],
        'P' => [0x1e, 0x11, 0x11, 0x1e, 0x10, 0x10, 0x10],
        'Q' => [0x0e, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0d],
        'R' => [0x1e, 0x11, 0x11, 0x1e, 0x14, 0x12, 0x11],
        'S' => [0x0f, 0x10, 0x10, 0x0e, 0x01, 0x01, 0x1e],
        'T' => [0x1f, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0e],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0a, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x1b, 0x11],
        'X' => [0x11, 0x11, 0x0a, 0x04, 0x0a, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0a, 0x04, 0x04, 0x04],
        'Z' => [0x1f, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1f],
        '0' => [0x0e, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0e],
        '1' => [0x04, 0x0c, 0x04, 0x04, 0x04, 0x04, 0x0e],
        '2' => [0x0e, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1f],
        '3' => [0x1f, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0e],
        '4' => [0x02, 0x06, 0x0a, 0x12, 0x1f, 0x02, 0x02],
        '5' => [0x1f, 0x10, 0x1e, 0x01, 0x01, 0x11, 0x0e],
        '6' => [0x06, 0x08, 0x10, 0x1e, 0x11, 0x11, 0x0e],
        '7' => [0x1f, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0e, 0x11, 0x11, 0x0e, 0x11, 0x11, 0x0e],
        '9' => [0x0e, 0x11, 0x11, 0x0f, 0x01, 0x02, 0x0c],
        '%' => [0x19, 0x1a, 0x02, 0x04, 0x08, 0x0b, 0x13],
        '-' => [0x00, 0x00, 0x00, 0x1f, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1f],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0c, 0x0c],
        '#' => [0x0a, 0x0a, 0x1f, 0x0a, 0x1f, 0x0a, 0x0a],
        ' ' => [0x00; 7],
        _ => [0x1f, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1f],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stroke_leaves_interior_transparent() {
        let mut layer = RasterLayer::new(SurfaceSize::new(20, 20));
        layer.stroke_rect(Rect::new(2.0, 2.0, 10.0, 10.0), Color::WHITE, 1.0);

        assert_eq!(layer.pixel(2, 2), Some(Color::WHITE));
        assert_eq!(layer.pixel(11, 11), Some(Color::WHITE));
        assert_eq!(layer.pixel(6, 6), Some(Color::TRANSPARENT));
        assert_eq!(layer.pixel(12, 12), Some(Color::TRANSPARENT));
    }

    #[test]
    fn drawing_is_clipped_to_the_layer() {
        let mut layer = RasterLayer::new(SurfaceSize::new(8, 8));
        layer.fill_rect(Rect::new(-4.0, -4.0, 100.0, 100.0), Color::BLACK);
        layer.text(6.0, 6.0, "car 87%", Color::WHITE, 7.0);
        assert_eq!(layer.pixel(0, 0), Some(Color::BLACK));
        assert_eq!(layer.pixel(8, 8), None);
    }

    #[test]
    fn clear_resets_to_transparent() {
        let mut layer = RasterLayer::new(SurfaceSize::new(4, 4));
        layer.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::WHITE);
        layer.clear();
        assert!(layer.image().pixels().all(|p| p.0 == [0, 0, 0, 0]));
    }

    #[test]
    fn zero_sized_layer_accepts_draw_calls() {
        let mut layer = RasterLayer::new(SurfaceSize::new(0, 0));
        layer.clear();
        layer.stroke_rect(Rect::new(0.0, 0.0, 5.0, 5.0), Color::WHITE, 2.0);
        layer.text(0.0, 0.0, "x", Color::WHITE, 14.0);
        assert_eq!(layer.image().width(), 0);
    }

    #[test]
    fn text_width_scales_with_size() {
        assert_eq!(text_width("ab", 7.0), 12.0);
        assert_eq!(text_width("ab", 14.0), 24.0);
    }
}
