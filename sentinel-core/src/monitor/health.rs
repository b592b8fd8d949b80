use crate::bus::{EventMultiplexer, Subscription, Topic};

use parking_lot::Mutex;
use sentinel_model::{CameraId, Event, MetricStatus, MetricType, SystemEvent, Timestamp};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;

pub const RECENT_EVENTS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CameraActivity {
    pub events: u64,
    pub anomalies: u64,
    pub last_seen: Option<Timestamp>,
}

/// Point-in-time copy of a [`HealthBoard`].
#[derive(Debug, Clone, Default)]
pub struct HealthSnapshot {
    pub metrics: HashMap<MetricType, SystemEvent>,
    pub cameras: HashMap<CameraId, CameraActivity>,
    /// Newest first.
    pub recent: VecDeque<Event>,
    pub total: u64,
}

impl HealthSnapshot {
    pub fn metric(&self, metric: MetricType) -> Option<&SystemEvent> {
        self.metrics.get(&metric)
    }

    /// Worst status across the latest value of every metric.
    pub fn overall(&self) -> MetricStatus {
        self.metrics
            .values()
            .map(|event| event.status)
            .max_by_key(|status| match status {
                MetricStatus::Normal => 0,
                MetricStatus::Warning => 1,
                MetricStatus::Critical => 2,
            })
            .unwrap_or_default()
    }

    fn record(&mut self, event: &Event) {
        self.total += 1;
        match event {
            Event::System(system) => {
                self.metrics.insert(system.metric_type, system.clone());
            }
            Event::Camera(camera) => {
                let activity = self.cameras.entry(camera.camera_id.clone()).or_default();
                activity.events += 1;
                if event.is_anomalous() {
                    activity.anomalies += 1;
                }
                activity.last_seen = Some(camera.timestamp);
            }
        }

        self.recent.push_front(event.clone());
        self.recent.truncate(RECENT_EVENTS);
    }
}

/// Wildcard subscriber keeping system metrics and per-camera activity.
pub struct HealthBoard {
    state: Arc<Mutex<HealthSnapshot>>,
    subscription: Subscription,
}

impl fmt::Debug for HealthBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HealthBoard")
            .field("total", &self.state.lock().total)
            .field("subscription", &self.subscription)
            .finish()
    }
}

impl HealthBoard {
    pub fn attach(mux: &EventMultiplexer) -> Self {
        let state = Arc::new(Mutex::new(HealthSnapshot::default()));
        let target = Arc::clone(&state);
        let subscription = mux.subscribe(Topic::All, move |event| {
            target.lock().record(event);
        });
        Self {
            state,
            subscription,
        }
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        self.state.lock().clone()
    }

    pub fn detach(&self) {
        self.subscription.unsubscribe();
    }
}
