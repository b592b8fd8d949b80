use crate::error::{ModelError, Result};

/// Object location as fractions of frame width/height: `[x, y, w, h]`.
///
/// Producers are expected to keep `x + w <= 1` and `y + h <= 1` but nothing
/// upstream enforces it, so consumers must go through [`BoundingBox::clamped`]
/// before mapping onto pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "Vec<f32>", into = "[f32; 4]")
)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl BoundingBox {
    /// The whole frame.
    pub const FULL_FRAME: BoundingBox = BoundingBox {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_slice(values: &[f32]) -> Result<Self> {
        match values {
            [x, y, w, h] => {
                if values.iter().any(|v| !v.is_finite()) {
                    return Err(ModelError::InvalidBoundingBox(
                        "coordinates must be finite".into(),
                    ));
                }
                Ok(Self::new(*x, *y, *w, *h))
            }
            other => Err(ModelError::InvalidBoundingBox(format!(
                "expected 4 values, got {}",
                other.len()
            ))),
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.w, self.h]
    }

    /// Clips the box to the unit square. Boxes that fall completely outside
    /// collapse to zero width or height.
    pub fn clamped(&self) -> Self {
        let left = self.x.min(self.x + self.w).clamp(0.0, 1.0);
        let right = self.x.max(self.x + self.w).clamp(0.0, 1.0);
        let top = self.y.min(self.y + self.h).clamp(0.0, 1.0);
        let bottom = self.y.max(self.y + self.h).clamp(0.0, 1.0);
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn is_within_frame(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.w >= 0.0
            && self.h >= 0.0
            && self.x + self.w <= 1.0
            && self.y + self.h <= 1.0
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }
}

impl TryFrom<Vec<f32>> for BoundingBox {
    type Error = ModelError;

    fn try_from(values: Vec<f32>) -> Result<Self> {
        Self::from_slice(&values)
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(value: BoundingBox) -> Self {
        value.to_array()
    }
}

/// One detected object inside a frame.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Detection {
    #[cfg_attr(feature = "serde", serde(rename = "class", alias = "class_name"))]
    pub class_name: String,
    pub confidence: f32,
    pub bbox: BoundingBox,
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            rename = "trackId",
            alias = "track_id",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub track_id: Option<u64>,
}

impl Detection {
    pub fn new(
        class_name: impl Into<String>,
        confidence: f32,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            confidence,
            bbox,
            track_id: None,
        }
    }

    /// Confidence as a whole percentage, clamped to 0..=100.
    pub fn confidence_percent(&self) -> u8 {
        if !self.confidence.is_finite() {
            return 0;
        }
        (self.confidence.clamp(0.0, 1.0) * 100.0).round() as u8
    }

    /// Overlay caption, e.g. `car 87%`.
    pub fn label_text(&self) -> String {
        format!("{} {}%", self.class_name, self.confidence_percent())
    }
}
