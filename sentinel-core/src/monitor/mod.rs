//! Compositions of the core pieces that a dashboard shows.

mod card;
mod health;

pub use card::CameraCard;
pub use health::{CameraActivity, HealthBoard, HealthSnapshot, RECENT_EVENTS};
