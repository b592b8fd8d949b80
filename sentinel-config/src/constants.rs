//! Environment keys understood by the loader.

pub const API_URL: &str = "SENTINEL_API_URL";
pub const EVENTS_URL: &str = "SENTINEL_EVENTS_URL";
pub const USE_SYNTHETIC: &str = "SENTINEL_USE_SYNTHETIC";
pub const SYNTHETIC_INTERVAL: &str = "SENTINEL_SYNTHETIC_INTERVAL";
pub const TRIAGE_CONFIRM_DELAY: &str = "SENTINEL_TRIAGE_CONFIRM_DELAY";
pub const BACKOFF_CAP: &str = "SENTINEL_BACKOFF_CAP";
pub const REQUEST_TIMEOUT: &str = "SENTINEL_REQUEST_TIMEOUT";
pub const CAMERAS_PATH: &str = "SENTINEL_CAMERAS_PATH";
pub const CAMERAS_JSON: &str = "SENTINEL_CAMERAS_JSON";

/// Every key above, in the order `sentinelctl check` prints them.
pub const MANAGED_KEYS: &[&str] = &[
    API_URL,
    EVENTS_URL,
    USE_SYNTHETIC,
    SYNTHETIC_INTERVAL,
    TRIAGE_CONFIRM_DELAY,
    BACKOFF_CAP,
    REQUEST_TIMEOUT,
    CAMERAS_PATH,
    CAMERAS_JSON,
];

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
