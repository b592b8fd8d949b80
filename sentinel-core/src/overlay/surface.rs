use super::palette::Color;
use crate::player::SurfaceSize;

/// Axis-aligned rectangle in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Something an overlay can be painted onto.
pub trait Surface {
    fn size(&self) -> SurfaceSize;

    /// Reset every pixel to transparent.
    fn clear(&mut self);

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn text(&mut self, x: f32, y: f32, text: &str, color: Color, size: f32);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear,
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f32,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    Text {
        x: f32,
        y: f32,
        text: String,
        color: Color,
        size: f32,
    },
}

/// Records draw calls so any UI toolkit can replay them.
///
/// A `Clear` drops everything recorded before it, so the list always holds
/// exactly one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn rects(&self) -> impl Iterator<Item = &Rect> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::StrokeRect { rect, .. } => Some(rect),
            _ => None,
        })
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for DisplayList {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f32) {
        self.commands.push(DrawCommand::StrokeRect {
            rect,
            color,
            line_width,
        });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect { rect, color });
    }

    fn text(&mut self, x: f32, y: f32, text: &str, color: Color, size: f32) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            color,
            size,
        });
    }
}
