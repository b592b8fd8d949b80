use crate::models::{IngressMode, SentinelConfig};

use std::collections::HashSet;
use thiserror::Error;

/// Hard failures that stop the client from starting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigGuardRailError {
    #[error("unsupported scheme '{scheme}' for {key}")]
    UnsupportedScheme { key: &'static str, scheme: String },
    #[error("live ingress requested but SENTINEL_EVENTS_URL is not set")]
    MissingEventsEndpoint,
    #[error("backoff cap must be greater than zero")]
    ZeroBackoffCap,
    #[error("duplicate camera id '{0}' in roster")]
    DuplicateCamera(String),
}

impl SentinelConfig {
    /// Checks invariants that individual parsers cannot see.
    pub fn validate(&self) -> Result<(), ConfigGuardRailError> {
        let api_scheme = self.api.base_url.scheme();
        if !matches!(api_scheme, "http" | "https") {
            return Err(ConfigGuardRailError::UnsupportedScheme {
                key: crate::constants::API_URL,
                scheme: api_scheme.to_owned(),
            });
        }

        if let IngressMode::ServerSentEvents(url) = &self.ingress.mode
            && !matches!(url.scheme(), "http" | "https")
        {
            return Err(ConfigGuardRailError::UnsupportedScheme {
                key: crate::constants::EVENTS_URL,
                scheme: url.scheme().to_owned(),
            });
        }

        if self.player.backoff_cap.is_zero() {
            return Err(ConfigGuardRailError::ZeroBackoffCap);
        }

        let mut seen = HashSet::new();
        for camera in &self.cameras {
            if !seen.insert(camera.id.as_str()) {
                return Err(ConfigGuardRailError::DuplicateCamera(
                    camera.id.to_string(),
                ));
            }
        }

        Ok(())
    }
}
