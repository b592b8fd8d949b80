//! Client-focused snapshot of the types surface.
//! Prefer importing from this module instead of individual tree nodes when
//! working in sentinel-core or the CLI.

pub use super::camera::{Camera, CameraStatus, GeoPoint};
pub use super::detection::{BoundingBox, Detection};
pub use super::events::{
    CameraEvent, CameraEventKind, Event, EventKind, MetricStatus, MetricType,
    SystemEvent,
};
pub use super::ids::{CameraId, EventId, TaskId};
pub use super::timestamp::Timestamp;
pub use super::triage::{
    TriageItem, TriageTask, UNKNOWN_LABEL, ValidationRequest,
    ValidationSubmission, Verdict,
};
