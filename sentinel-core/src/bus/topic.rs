use sentinel_model::{CameraId, Event};
use std::fmt;

/// Spelling of the wildcard topic in configuration and on the command line.
pub const WILDCARD: &str = "*";

/// Routing key of a subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Every event, camera-scoped and system.
    All,
    /// Only camera-scoped events of one camera.
    Camera(CameraId),
}

impl Topic {
    pub fn camera(id: impl Into<CameraId>) -> Self {
        Topic::Camera(id.into())
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            WILDCARD | "" => Topic::All,
            id => Topic::Camera(CameraId::from(id)),
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Topic::All => true,
            Topic::Camera(id) => event.camera_id() == Some(id),
        }
    }
}

impl From<CameraId> for Topic {
    fn from(id: CameraId) -> Self {
        Topic::Camera(id)
    }
}

impl From<&CameraId> for Topic {
    fn from(id: &CameraId) -> Self {
        Topic::Camera(id.clone())
    }
}

impl From<&str> for Topic {
    fn from(raw: &str) -> Self {
        Topic::parse(raw)
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::All => f.write_str(WILDCARD),
            Topic::Camera(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_model::{CameraEvent, CameraEventKind};

    #[test]
    fn wildcard_spelling_parses_to_all() {
        assert_eq!(Topic::parse("*"), Topic::All);
        assert_eq!(Topic::parse(" cam_01 "), Topic::camera("cam_01"));
        assert_eq!(Topic::All.to_string(), "*");
    }

    #[test]
    fn camera_topic_matches_only_its_camera() {
        let event: Event =
            CameraEvent::new(CameraEventKind::Detection, "e1", "cam_01", "car")
                .into();
        assert!(Topic::camera("cam_01").matches(&event));
        assert!(!Topic::camera("cam_02").matches(&event));
        assert!(Topic::All.matches(&event));
    }
}
