pub mod error;

use crate::constants;
use crate::models::roster::{self, CameraRoster, CameraRosterSource};
use crate::models::{
    ApiConfig, ConfigMetadata, IngressConfig, IngressMode, PlayerConfig,
    SentinelConfig, TriageConfig,
};
use crate::validation::ConfigGuardRailError;
use error::ConfigLoadError;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

/// Result of a successful load.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: SentinelConfig,
}

/// Resolves [`SentinelConfig`] from an optional `.env` file, the process
/// environment and explicit overrides (highest precedence).
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    env_file: Option<PathBuf>,
    overrides: HashMap<String, String>,
    read_process_env: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            env_file: None,
            overrides: HashMap::new(),
            read_process_env: true,
        }
    }

    /// Loader that only sees `overrides`; used by tests and embedders that
    /// manage their own settings.
    pub fn isolated() -> Self {
        Self {
            read_process_env: false,
            ..Self::new()
        }
    }

    pub fn with_env_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.env_file = Some(path.into());
        self
    }

    pub fn with_override(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = self.load_env_file()?;

        let api = ApiConfig {
            base_url: self
                .url(constants::API_URL)?
                .unwrap_or_else(|| ApiConfig::default().base_url),
            request_timeout: self
                .duration(constants::REQUEST_TIMEOUT)?
                .unwrap_or(ApiConfig::default().request_timeout),
        };

        let ingress = IngressConfig {
            mode: self.ingress_mode()?,
            synthetic_interval: self
                .duration(constants::SYNTHETIC_INTERVAL)?
                .unwrap_or(IngressConfig::default().synthetic_interval),
        };

        let player = PlayerConfig {
            backoff_cap: self
                .duration(constants::BACKOFF_CAP)?
                .unwrap_or(PlayerConfig::default().backoff_cap),
        };

        let triage = TriageConfig {
            confirm_delay: self
                .duration(constants::TRIAGE_CONFIRM_DELAY)?
                .unwrap_or(TriageConfig::default().confirm_delay),
        };

        let (cameras, roster_source) = self.roster()?;

        let config = SentinelConfig {
            api,
            ingress,
            player,
            triage,
            cameras,
            metadata: ConfigMetadata {
                env_file_loaded,
                roster_source,
            },
        };
        config.validate()?;

        tracing::debug!(
            ingress = ?config.ingress.mode,
            cameras = config.cameras.len(),
            "configuration resolved"
        );
        Ok(ConfigLoad { config })
    }

    fn load_env_file(&self) -> Result<bool, ConfigLoadError> {
        if !self.read_process_env {
            return Ok(false);
        }
        let outcome = match &self.env_file {
            Some(path) => dotenvy::from_path(path),
            None => dotenvy::dotenv().map(|_| ()),
        };
        match outcome {
            Ok(()) => Ok(true),
            Err(err) if err.not_found() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn var(&self, key: &str) -> Option<String> {
        let value = match self.overrides.get(key) {
            Some(value) => Some(value.clone()),
            None if self.read_process_env => std::env::var(key).ok(),
            None => None,
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn url(&self, key: &'static str) -> Result<Option<Url>, ConfigLoadError> {
        self.var(key)
            .map(|raw| {
                Url::parse(raw.trim()).map_err(|source| {
                    ConfigLoadError::InvalidUrl {
                        key,
                        value: raw.clone(),
                        source,
                    }
                })
            })
            .transpose()
    }

    fn duration(
        &self,
        key: &'static str,
    ) -> Result<Option<Duration>, ConfigLoadError> {
        self.var(key)
            .map(|raw| {
                humantime::parse_duration(raw.trim()).map_err(|source| {
                    ConfigLoadError::InvalidDuration {
                        key,
                        value: raw.clone(),
                        source,
                    }
                })
            })
            .transpose()
    }

    fn flag(&self, key: &'static str) -> Result<Option<bool>, ConfigLoadError> {
        self.var(key)
            .map(|raw| parse_bool(&raw).ok_or(ConfigLoadError::InvalidBool {
                key,
                value: raw.clone(),
            }))
            .transpose()
    }

    fn ingress_mode(&self) -> Result<IngressMode, ConfigLoadError> {
        let use_synthetic = self.flag(constants::USE_SYNTHETIC)?;
        let endpoint = self.url(constants::EVENTS_URL)?;

        match (use_synthetic, endpoint) {
            (Some(true), _) | (None, None) => Ok(IngressMode::Synthetic),
            (Some(false), None) => {
                Err(ConfigGuardRailError::MissingEventsEndpoint.into())
            }
            (_, Some(url)) => match url.scheme() {
                "http" | "https" => Ok(IngressMode::ServerSentEvents(url)),
                "ws" | "wss" => Ok(IngressMode::WebSocket(url)),
                other => Err(ConfigGuardRailError::UnsupportedScheme {
                    key: constants::EVENTS_URL,
                    scheme: other.to_owned(),
                }
                .into()),
            },
        }
    }

    fn roster(
        &self,
    ) -> Result<(Vec<sentinel_model::Camera>, CameraRosterSource), ConfigLoadError>
    {
        if let Some(path) = self.var(constants::CAMERAS_PATH) {
            let path = PathBuf::from(path.trim());
            let roster = CameraRoster::load_from_file(&path)
                .map_err(ConfigLoadError::Roster)?;
            return Ok((roster.cameras, CameraRosterSource::EnvPath(path)));
        }

        if let Some(raw) = self.var(constants::CAMERAS_JSON) {
            let roster = CameraRoster::parse_json(&raw)
                .map_err(ConfigLoadError::Roster)?;
            return Ok((roster.cameras, CameraRosterSource::EnvInline));
        }

        Ok((roster::demo_cameras(), CameraRosterSource::Demo))
    }
}

/// Accepts the usual spellings of a boolean toggle.
pub fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_spellings() {
        assert_eq!(parse_bool(" YES "), Some(true));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn defaults_to_synthetic_without_endpoint() {
        let load = ConfigLoader::isolated().load().unwrap();
        assert_eq!(load.config.ingress.mode, IngressMode::Synthetic);
        assert_eq!(load.config.metadata.roster_source, CameraRosterSource::Demo);
        assert!(!load.config.metadata.env_file_loaded);
    }
}
