/// Straight (non-premultiplied) RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Colors shared by every box of one redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub stroke: Color,
    pub fill: Color,
    pub label_background: Color,
    pub label_text: Color,
}

impl Palette {
    pub const fn normal() -> Self {
        let green = Color::rgb(0x22, 0xc5, 0x5e);
        Self {
            stroke: green,
            fill: green.with_alpha(0x26),
            label_background: green,
            label_text: Color::BLACK,
        }
    }

    pub const fn alert() -> Self {
        let red = Color::rgb(0xef, 0x44, 0x44);
        Self {
            stroke: red,
            fill: red.with_alpha(0x33),
            label_background: red,
            label_text: Color::WHITE,
        }
    }

    pub const fn for_anomalous(anomalous: bool) -> Self {
        if anomalous { Self::alert() } else { Self::normal() }
    }
}
