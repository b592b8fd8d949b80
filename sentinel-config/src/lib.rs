//! Shared configuration library for Sentinel.
//!
//! Centralizes `.env` handling, environment parsing, camera roster loading
//! and guard-rail validation so the CLI and any embedding UI resolve settings
//! the same way.

pub mod constants;
pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, error::ConfigLoadError};
pub use models::roster::{CameraRoster, CameraRosterSource};
pub use models::{
    ApiConfig, ConfigMetadata, IngressConfig, IngressMode, PlayerConfig,
    SentinelConfig, TriageConfig,
};
pub use validation::ConfigGuardRailError;
