use std::time::Duration;

use anyhow::{Context, Result};
use sentinel_config::SentinelConfig;
use sentinel_core::bus::{EventMultiplexer, Topic};
use sentinel_core::ingress::IngressHandle;
use sentinel_core::monitor::{HealthBoard, HealthSnapshot};
use sentinel_model::{Event, MetricType};

pub async fn run(
    config: SentinelConfig,
    camera: Option<String>,
    summary_every: Duration,
) -> Result<()> {
    let topic = match camera.as_deref() {
        Some(id) => {
            if !config.cameras.iter().any(|c| c.id.as_str() == id) {
                tracing::warn!(camera_id = id, "camera is not in the roster");
            }
            Topic::camera(id)
        }
        None => Topic::All,
    };

    let mux = EventMultiplexer::new();
    let board = HealthBoard::attach(&mux);
    let (_subscription, mut events) = mux.subscribe_channel(topic.clone());
    let ingress = IngressHandle::spawn(super::ingress::build(&config), mux.clone());
    tracing::info!(ingress = ingress.name(), topic = %topic, "watching events");

    let mut summary = tokio::time::interval(summary_every);
    summary.tick().await;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal.context("failed to listen for Ctrl-C")?;
                break;
            }
            Some(event) = events.recv() => println!("{}", format_event(&event)),
            _ = summary.tick() => println!("{}", format_summary(&board.snapshot())),
        }
    }

    ingress.shutdown().await;
    board.detach();
    Ok(())
}

pub fn format_event(event: &Event) -> String {
    match event {
        Event::Camera(camera) => {
            let detections: Vec<String> =
                camera.detections.iter().map(|d| d.label_text()).collect();
            let mut line = format!(
                "{} {:<9} {:<8} {}",
                camera.timestamp,
                event.kind(),
                camera.camera_id,
                camera.message
            );
            if let Some(anomaly) = &camera.anomaly_type {
                line.push_str(&format!(" <{anomaly}>"));
            }
            if !detections.is_empty() {
                line.push_str(&format!(" [{}]", detections.join(", ")));
            }
            line
        }
        Event::System(system) => format!(
            "{} {:<9} {}={}{} ({})",
            system.timestamp,
            event.kind(),
            system.metric_type,
            system.value,
            system.unit,
            system.status
        ),
    }
}

pub fn format_summary(health: &HealthSnapshot) -> String {
    let metrics: Vec<String> = MetricType::ALL
        .iter()
        .filter_map(|metric| health.metric(*metric))
        .map(|sample| format!("{}={}{}", sample.metric_type, sample.value, sample.unit))
        .collect();
    let anomalies: u64 = health.cameras.values().map(|c| c.anomalies).sum();
    format!(
        "-- health {} | events {} | cameras {} | anomalies {} | {}",
        health.overall(),
        health.total,
        health.cameras.len(),
        anomalies,
        if metrics.is_empty() { "no metrics yet".to_string() } else { metrics.join(" ") }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_model::{
        BoundingBox, CameraEvent, CameraEventKind, Detection, MetricStatus,
        SystemEvent, Timestamp,
    };

    #[test]
    fn camera_lines_carry_labels_and_anomaly() {
        let mut event = CameraEvent::new(
            CameraEventKind::Anomaly,
            "evt-1",
            "cam_03",
            "Unusual traffic pattern",
        )
        .with_detections(vec![Detection::new(
            "truck",
            0.5,
            BoundingBox::new(0.1, 0.1, 0.2, 0.2),
        )]);
        event.anomaly_type = Some("stalled_vehicle".into());

        let line = format_event(&event.into());
        assert!(line.contains("anomaly"));
        assert!(line.contains("cam_03"));
        assert!(line.contains("<stalled_vehicle>"));
        assert!(line.ends_with("[truck 50%]"));
    }

    #[test]
    fn summary_reports_worst_metric() {
        let mux = EventMultiplexer::new();
        let board = HealthBoard::attach(&mux);
        mux.publish(&Event::System(SystemEvent {
            id: "sys-1".into(),
            timestamp: Timestamp::now(),
            metric_type: MetricType::KafkaLag,
            value: 2400.0,
            unit: "msgs".into(),
            status: MetricStatus::Critical,
        }));

        let line = format_summary(&board.snapshot());
        assert!(line.contains("health critical"));
        assert!(line.contains("kafka_lag=2400msgs"));
    }
}
