//! Core data model definitions shared across Sentinel crates.
//!
//! Everything here mirrors what the backend emits (camera roster, detection
//! and system events, triage queue items) or accepts (validation
//! submissions). Wire compatibility lives behind the `serde` feature so
//! presentation-only consumers can skip it.
#![allow(missing_docs)]

pub use ::chrono;

pub mod camera;
pub mod detection;
pub mod error;
pub mod events;
pub mod ids;
pub mod prelude;
pub mod timestamp;
pub mod triage;

// Intentionally curated re-exports for downstream consumers.
pub use camera::{Camera, CameraStatus, GeoPoint};
pub use detection::{BoundingBox, Detection};
pub use error::{ModelError, Result as ModelResult};
pub use events::{
    CameraEvent, CameraEventKind, Event, EventKind, MetricStatus, MetricType,
    SystemEvent,
};
pub use ids::{CameraId, EventId, TaskId};
pub use timestamp::Timestamp;
pub use triage::{
    TriageItem, TriageTask, ValidationRequest, ValidationSubmission, Verdict,
};
