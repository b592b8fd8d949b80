use super::EventIngress;
use crate::bus::EventMultiplexer;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sentinel_model::{
    BoundingBox, Camera, CameraEvent, CameraEventKind, CameraId, CameraStatus,
    Detection, Event, MetricStatus, MetricType, SystemEvent, Timestamp,
};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const CLASSES: [&str; 6] = ["car", "truck", "bus", "person", "bicycle", "motorcycle"];
const ANOMALIES: [&str; 4] = [
    "stalled_vehicle",
    "wrong_way_driver",
    "pedestrian_on_roadway",
    "debris",
];

#[derive(Debug, Clone)]
pub struct SyntheticConfig {
    pub interval: Duration,
    /// Emit one system metric every `system_every` ticks; 0 disables them.
    pub system_every: u32,
    /// Fixed seed for reproducible feeds.
    pub seed: Option<u64>,
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            system_every: 3,
            seed: None,
        }
    }
}

/// Offline stand-in for the live feed. Produces the same event shapes the
/// backend does, for the cameras of the configured roster.
#[derive(Debug)]
pub struct SyntheticIngress {
    cameras: Vec<CameraId>,
    config: SyntheticConfig,
    rng: StdRng,
    tick: u64,
}

impl SyntheticIngress {
    pub fn new(cameras: &[Camera], config: SyntheticConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            cameras: cameras
                .iter()
                .filter(|camera| camera.status != CameraStatus::Offline)
                .map(|camera| camera.id.clone())
                .collect(),
            config,
            rng,
            tick: 0,
        }
    }

    /// Events for the next tick: at most one camera event and at most one
    /// system metric.
    pub fn next_batch(&mut self) -> Vec<Event> {
        self.tick += 1;
        let mut batch = Vec::with_capacity(2);

        if !self.cameras.is_empty() {
            batch.push(self.camera_event().into());
        }
        let every = u64::from(self.config.system_every);
        if every > 0 && self.tick % every == 0 {
            batch.push(self.system_event().into());
        }
        batch
    }

    fn camera_event(&mut self) -> CameraEvent {
        let index = self.rng.random_range(0..self.cameras.len());
        let camera_id = self.cameras[index].clone();

        let roll: f32 = self.rng.random();
        let kind = if roll < 0.7 {
            CameraEventKind::Detection
        } else if roll < 0.9 {
            CameraEventKind::Anomaly
        } else {
            CameraEventKind::Alert
        };

        let count = self.rng.random_range(1..=3);
        let detections: Vec<Detection> =
            (0..count).map(|_| self.detection()).collect();

        let message = match kind {
            CameraEventKind::Detection => {
                format!("{} object(s) detected", detections.len())
            }
            CameraEventKind::Anomaly => "Unusual traffic pattern".to_string(),
            CameraEventKind::Alert => "Operator attention required".to_string(),
        };

        let mut event =
            CameraEvent::new(kind, Uuid::new_v4().to_string(), camera_id, message)
                .with_detections(detections);
        if kind != CameraEventKind::Detection {
            let anomaly = ANOMALIES[self.rng.random_range(0..ANOMALIES.len())];
            event.anomaly_type = Some(anomaly.to_string());
        }
        event
    }

    fn detection(&mut self) -> Detection {
        let class = CLASSES[self.rng.random_range(0..CLASSES.len())];
        let bbox = BoundingBox::new(
            self.rng.random_range(0.0..0.8),
            self.rng.random_range(0.0..0.8),
            self.rng.random_range(0.05..0.25),
            self.rng.random_range(0.05..0.25),
        );
        Detection::new(class, self.rng.random_range(0.35..0.99), bbox)
    }

    fn system_event(&mut self) -> SystemEvent {
        let metric_type =
            MetricType::ALL[self.rng.random_range(0..MetricType::ALL.len())];
        let (value, unit, warn_at, critical_at) = match metric_type {
            MetricType::CpuUsage => (self.rng.random_range(5.0..95.0), "%", 70.0, 85.0),
            MetricType::MemoryUsage => {
                (self.rng.random_range(20.0..92.0), "%", 75.0, 90.0)
            }
            MetricType::KafkaLag => {
                (self.rng.random_range(0.0..5000.0_f64).round(), "msgs", 500.0, 2000.0)
            }
        };
        let status = if value >= critical_at {
            MetricStatus::Critical
        } else if value >= warn_at {
            MetricStatus::Warning
        } else {
            MetricStatus::Normal
        };

        SystemEvent {
            id: Uuid::new_v4().to_string().into(),
            timestamp: Timestamp::now(),
            metric_type,
            value,
            unit: unit.to_string(),
            status,
        }
    }
}

#[async_trait]
impl EventIngress for SyntheticIngress {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn run(self: Box<Self>, sink: EventMultiplexer, cancel: CancellationToken) {
        let mut feed = *self;
        let mut ticker = tokio::time::interval(feed.config.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately.
        ticker.tick().await;

        tracing::info!(
            cameras = feed.cameras.len(),
            interval_ms = feed.config.interval.as_millis() as u64,
            "synthetic feed running"
        );
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    for event in feed.next_batch() {
                        sink.publish(&event);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Camera> {
        vec![
            Camera::new("cam_01", "A"),
            Camera::new("cam_02", "B").with_status(CameraStatus::Offline),
        ]
    }

    fn seeded(system_every: u32) -> SyntheticIngress {
        SyntheticIngress::new(
            &roster(),
            SyntheticConfig {
                system_every,
                seed: Some(7),
                ..SyntheticConfig::default()
            },
        )
    }

    #[test]
    fn offline_cameras_are_silent() {
        let mut feed = seeded(0);
        for _ in 0..50 {
            for event in feed.next_batch() {
                assert_eq!(event.camera_id().map(CameraId::as_str), Some("cam_01"));
            }
        }
    }

    #[test]
    fn generated_detections_are_well_formed() {
        let mut feed = seeded(0);
        for _ in 0..50 {
            for event in feed.next_batch() {
                assert!(!event.detections().is_empty());
                for detection in event.detections() {
                    assert!((0.0..=1.0).contains(&detection.confidence));
                    assert!(detection.bbox.w > 0.0 && detection.bbox.h > 0.0);
                }
                if event.is_anomalous() {
                    assert!(event.as_camera().and_then(|c| c.anomaly_type.as_ref()).is_some());
                }
            }
        }
    }

    #[test]
    fn system_metrics_follow_cadence() {
        let mut feed = seeded(3);
        let system_ticks: Vec<usize> = (1..=9)
            .filter(|_| feed.next_batch().iter().any(|e| e.as_system().is_some()))
            .collect();
        assert_eq!(system_ticks, vec![3, 6, 9]);
    }

    #[test]
    fn seeded_feeds_repeat() {
        let a: Vec<_> = seeded(2).next_batch().iter().map(|e| e.kind()).collect();
        let b: Vec<_> = seeded(2).next_batch().iter().map(|e| e.kind()).collect();
        assert_eq!(a, b);
    }
}
