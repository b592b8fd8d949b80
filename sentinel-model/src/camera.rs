use crate::ids::CameraId;

use std::fmt;
use url::Url;

/// Operational status reported by the camera registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CameraStatus {
    #[default]
    Online,
    Offline,
    Alert,
}

impl fmt::Display for CameraStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CameraStatus::Online => "online",
            CameraStatus::Offline => "offline",
            CameraStatus::Alert => "alert",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A camera as published by the registry. Read-only to the client.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Camera {
    pub id: CameraId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub location: GeoPoint,
    #[cfg_attr(feature = "serde", serde(default))]
    pub status: CameraStatus,
    #[cfg_attr(
        feature = "serde",
        serde(
            default,
            alias = "stream_url",
            skip_serializing_if = "Option::is_none"
        )
    )]
    pub stream_url: Option<Url>,
}

impl Camera {
    pub fn new(id: impl Into<CameraId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location: GeoPoint::default(),
            status: CameraStatus::Online,
            stream_url: None,
        }
    }

    pub fn with_stream(mut self, url: Url) -> Self {
        self.stream_url = Some(url);
        self
    }

    pub fn with_status(mut self, status: CameraStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_location(mut self, lat: f64, lng: f64) -> Self {
        self.location = GeoPoint { lat, lng };
        self
    }

    /// Whether a player should try to connect at all.
    pub fn is_streamable(&self) -> bool {
        self.stream_url.is_some() && self.status != CameraStatus::Offline
    }
}
