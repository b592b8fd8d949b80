use crate::detection::Detection;
use crate::ids::{CameraId, EventId};
use crate::timestamp::Timestamp;

use std::fmt;

/// Discriminator of a camera-scoped event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraEventKind {
    #[default]
    Detection,
    Anomaly,
    Alert,
}

/// Flat view over every `eventType` the feed can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Detection,
    Anomaly,
    Alert,
    System,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EventKind::Detection => "detection",
            EventKind::Anomaly => "anomaly",
            EventKind::Alert => "alert",
            EventKind::System => "system",
        };
        f.write_str(label)
    }
}

impl From<CameraEventKind> for EventKind {
    fn from(kind: CameraEventKind) -> Self {
        match kind {
            CameraEventKind::Detection => EventKind::Detection,
            CameraEventKind::Anomaly => EventKind::Anomaly,
            CameraEventKind::Alert => EventKind::Alert,
        }
    }
}

/// Event produced by the inference pipeline for a single camera.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct CameraEvent {
    /// Filled from the wire discriminator, see [`Event`].
    #[cfg_attr(feature = "serde", serde(skip))]
    pub kind: CameraEventKind,
    pub id: EventId,
    pub timestamp: Timestamp,
    #[cfg_attr(feature = "serde", serde(alias = "camera_id"))]
    pub camera_id: CameraId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub message: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub detections: Vec<Detection>,
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            alias = "anomaly_type",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub anomaly_type: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            alias = "image_url",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub image_url: Option<String>,
}

impl CameraEvent {
    pub fn new(
        kind: CameraEventKind,
        id: impl Into<EventId>,
        camera_id: impl Into<CameraId>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            id: id.into(),
            timestamp: Timestamp::now(),
            camera_id: camera_id.into(),
            message: message.into(),
            detections: Vec::new(),
            anomaly_type: None,
            image_url: None,
        }
    }

    pub fn with_detections(mut self, detections: Vec<Detection>) -> Self {
        self.detections = detections;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MetricType {
    CpuUsage,
    MemoryUsage,
    KafkaLag,
}

impl MetricType {
    pub const ALL: [MetricType; 3] = [
        MetricType::CpuUsage,
        MetricType::MemoryUsage,
        MetricType::KafkaLag,
    ];
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MetricType::CpuUsage => "cpu_usage",
            MetricType::MemoryUsage => "memory_usage",
            MetricType::KafkaLag => "kafka_lag",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum MetricStatus {
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "ok", alias = "healthy"))]
    Normal,
    Warning,
    #[cfg_attr(feature = "serde", serde(alias = "error"))]
    Critical,
}

impl fmt::Display for MetricStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MetricStatus::Normal => "normal",
            MetricStatus::Warning => "warning",
            MetricStatus::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// Platform health sample. Not bound to any camera.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct SystemEvent {
    pub id: EventId,
    pub timestamp: Timestamp,
    #[cfg_attr(feature = "serde", serde(alias = "metric_type"))]
    pub metric_type: MetricType,
    pub value: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub unit: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: MetricStatus,
}

/// Everything the inbound feed can carry.
///
/// Camera-scoped and system events share nothing but `id`/`timestamp`, so
/// they are separate variants rather than one struct with optional fields.
/// On the wire both are flat objects discriminated by `eventType`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "wire::WireEvent", into = "wire::WireEvent"))]
pub enum Event {
    Camera(CameraEvent),
    System(SystemEvent),
}

impl Event {
    pub fn id(&self) -> &EventId {
        match self {
            Event::Camera(event) => &event.id,
            Event::System(event) => &event.id,
        }
    }

    pub fn timestamp(&self) -> Timestamp {
        match self {
            Event::Camera(event) => event.timestamp,
            Event::System(event) => event.timestamp,
        }
    }

    /// Camera the event belongs to; `None` for system events.
    pub fn camera_id(&self) -> Option<&CameraId> {
        match self {
            Event::Camera(event) => Some(&event.camera_id),
            Event::System(_) => None,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::Camera(event) => event.kind.into(),
            Event::System(_) => EventKind::System,
        }
    }

    /// Anomalies and alerts switch overlays to the alert palette.
    pub fn is_anomalous(&self) -> bool {
        matches!(self.kind(), EventKind::Anomaly | EventKind::Alert)
    }

    pub fn detections(&self) -> &[Detection] {
        match self {
            Event::Camera(event) => &event.detections,
            Event::System(_) => &[],
        }
    }

    pub fn as_camera(&self) -> Option<&CameraEvent> {
        match self {
            Event::Camera(event) => Some(event),
            Event::System(_) => None,
        }
    }

    pub fn as_system(&self) -> Option<&SystemEvent> {
        match self {
            Event::Camera(_) => None,
            Event::System(event) => Some(event),
        }
    }
}

impl From<CameraEvent> for Event {
    fn from(event: CameraEvent) -> Self {
        Event::Camera(event)
    }
}

impl From<SystemEvent> for Event {
    fn from(event: SystemEvent) -> Self {
        Event::System(event)
    }
}

#[cfg(feature = "serde")]
mod wire {
    use super::{CameraEvent, CameraEventKind, Event, SystemEvent};

    #[derive(serde::Serialize, serde::Deserialize)]
    #[serde(tag = "eventType", rename_all = "lowercase")]
    pub(super) enum WireEvent {
        Detection(CameraEvent),
        Anomaly(CameraEvent),
        Alert(CameraEvent),
        System(SystemEvent),
    }

    impl From<WireEvent> for Event {
        fn from(wire: WireEvent) -> Self {
            let (kind, mut event) = match wire {
                WireEvent::Detection(event) => {
                    (CameraEventKind::Detection, event)
                }
                WireEvent::Anomaly(event) => (CameraEventKind::Anomaly, event),
                WireEvent::Alert(event) => (CameraEventKind::Alert, event),
                WireEvent::System(event) => return Event::System(event),
            };
            event.kind = kind;
            Event::Camera(event)
        }
    }

    impl From<Event> for WireEvent {
        fn from(event: Event) -> Self {
            match event {
                Event::Camera(event) => match event.kind {
                    CameraEventKind::Detection => WireEvent::Detection(event),
                    CameraEventKind::Anomaly => WireEvent::Anomaly(event),
                    CameraEventKind::Alert => WireEvent::Alert(event),
                },
                Event::System(event) => WireEvent::System(event),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn system() -> SystemEvent {
        SystemEvent {
            id: "sys-1".into(),
            timestamp: Timestamp::now(),
            metric_type: MetricType::CpuUsage,
            value: 42.0,
            unit: "%".into(),
            status: MetricStatus::Normal,
        }
    }

    #[test]
    fn only_camera_events_are_scoped() {
        let cam: Event =
            CameraEvent::new(CameraEventKind::Alert, "e1", "cam_01", "x").into();
        assert_eq!(cam.camera_id().map(CameraId::as_str), Some("cam_01"));
        assert!(cam.is_anomalous());

        let sys: Event = system().into();
        assert!(sys.camera_id().is_none());
        assert!(!sys.is_anomalous());
        assert!(sys.detections().is_empty());
    }

    #[test]
    fn detection_kind_is_not_anomalous() {
        let event: Event = CameraEvent::new(
            CameraEventKind::Detection,
            "e2",
            "cam_02",
            "car",
        )
        .into();
        assert_eq!(event.kind(), EventKind::Detection);
        assert!(!event.is_anomalous());
    }
}
