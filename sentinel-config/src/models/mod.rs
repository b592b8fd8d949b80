pub mod roster;

use crate::constants::DEFAULT_API_URL;
use roster::CameraRosterSource;

use sentinel_model::Camera;
use std::time::Duration;
use url::Url;

/// Fully resolved client configuration.
#[derive(Debug, Clone)]
pub struct SentinelConfig {
    pub api: ApiConfig,
    pub ingress: IngressConfig,
    pub player: PlayerConfig,
    pub triage: TriageConfig,
    pub cameras: Vec<Camera>,
    pub metadata: ConfigMetadata,
}

impl Default for SentinelConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            ingress: IngressConfig::default(),
            player: PlayerConfig::default(),
            triage: TriageConfig::default(),
            cameras: roster::demo_cameras(),
            metadata: ConfigMetadata::default(),
        }
    }
}

/// Backend HTTP settings (triage queue and validation endpoints).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_API_URL)
                .expect("default API url is a valid URL"),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Which ingress feeds the event multiplexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngressMode {
    /// Locally generated events for offline/demo operation.
    Synthetic,
    /// Server-sent events over `http(s)`.
    ServerSentEvents(Url),
    /// Text frames over `ws(s)`.
    WebSocket(Url),
}

impl IngressMode {
    pub fn is_live(&self) -> bool {
        !matches!(self, IngressMode::Synthetic)
    }

    pub fn endpoint(&self) -> Option<&Url> {
        match self {
            IngressMode::Synthetic => None,
            IngressMode::ServerSentEvents(url)
            | IngressMode::WebSocket(url) => Some(url),
        }
    }
}

#[derive(Debug, Clone)]
pub struct IngressConfig {
    pub mode: IngressMode,
    /// Cadence of the synthetic generator.
    pub synthetic_interval: Duration,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            mode: IngressMode::Synthetic,
            synthetic_interval: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Ceiling for the reconnect backoff.
    pub backoff_cap: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            backoff_cap: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TriageConfig {
    /// How long the accept/reject confirmation stays visible before the
    /// submission is sent.
    pub confirm_delay: Duration,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            confirm_delay: Duration::from_millis(300),
        }
    }
}

/// Where the resolved values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub env_file_loaded: bool,
    pub roster_source: CameraRosterSource,
}
