//! Detection overlays drawn over a camera's video surface.

mod palette;
mod raster;
mod renderer;
mod surface;

pub use palette::{Color, Palette};
pub use raster::{RasterLayer, text_width};
pub use renderer::{OverlayRenderer, project};
pub use surface::{DisplayList, DrawCommand, Rect, Surface};
