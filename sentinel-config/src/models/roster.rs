use anyhow::{Context, anyhow};
use sentinel_model::{Camera, CameraStatus};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use url::Url;

/// Source that produced the camera roster.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CameraRosterSource {
    #[default]
    Demo,
    EnvPath(PathBuf),
    EnvInline,
}

/// Camera list as written in a roster file.
///
/// TOML rosters use `[[cameras]]` tables; JSON rosters may be either
/// `{"cameras": [...]}` or a bare array.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CameraRoster {
    #[serde(default)]
    pub cameras: Vec<Camera>,
}

impl CameraRoster {
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read camera roster from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents).with_context(|| {
                format!("invalid camera roster {}", path.display())
            }),
            Some("toml") => toml::from_str(&contents).map_err(|err| {
                anyhow!("invalid camera roster {}: {}", path.display(), err)
            }),
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        if let Ok(cameras) = serde_json::from_str::<Vec<Camera>>(raw) {
            return Ok(Self { cameras });
        }
        serde_json::from_str::<Self>(raw).map_err(Into::into)
    }

    pub fn parse_from_str(contents: &str, origin: &str) -> anyhow::Result<Self> {
        // Try TOML first, then JSON for convenience.
        toml::from_str(contents).or_else(|toml_err| {
            Self::parse_json(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse camera roster {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }
}

/// Built-in roster used by the synthetic ingress when nothing is configured.
pub fn demo_cameras() -> Vec<Camera> {
    let demo_stream = Url::parse("http://localhost:8888/cam_01/index.m3u8").ok();

    let mut cameras = vec![
        Camera::new("cam_01", "Main St & 1st Ave")
            .with_location(40.7128, -74.0060),
        Camera::new("cam_02", "Harbor Bridge North")
            .with_location(40.7061, -73.9969),
        Camera::new("cam_03", "Central Station Plaza")
            .with_location(40.7527, -73.9772)
            .with_status(CameraStatus::Alert),
        Camera::new("cam_04", "Riverside Tunnel")
            .with_location(40.7411, -74.0080)
            .with_status(CameraStatus::Offline),
    ];
    if let (Some(first), Some(url)) = (cameras.first_mut(), demo_stream) {
        first.stream_url = Some(url);
    }
    cameras
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_toml_roster() {
        let raw = r#"
[[cameras]]
id = "cam_10"
name = "Airport Road"
status = "alert"
streamUrl = "rtsp://10.0.0.5/stream"

[cameras.location]
lat = 1.5
lng = 2.5
"#;
        let roster = CameraRoster::parse_from_str(raw, "inline").unwrap();
        assert_eq!(roster.cameras.len(), 1);
        let cam = &roster.cameras[0];
        assert_eq!(cam.id.as_str(), "cam_10");
        assert_eq!(cam.status, CameraStatus::Alert);
        assert_eq!(cam.location.lng, 2.5);
        assert!(cam.stream_url.is_some());
    }

    #[test]
    fn parses_bare_json_array() {
        let raw = r#"[{"id": "cam_01", "name": "A", "stream_url": "http://h/a.m3u8"}]"#;
        let roster = CameraRoster::parse_json(raw).unwrap();
        assert_eq!(roster.cameras[0].status, CameraStatus::Online);
        assert_eq!(
            roster.cameras[0].stream_url.as_ref().map(Url::as_str),
            Some("http://h/a.m3u8")
        );
    }

    #[test]
    fn demo_roster_has_unique_ids() {
        let cameras = demo_cameras();
        let mut ids: Vec<_> = cameras.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), cameras.len());
    }
}
