use std::{fs, sync::Mutex, time::Duration};

use once_cell::sync::Lazy;
use sentinel_config::{
    CameraRosterSource, ConfigGuardRailError, ConfigLoadError, ConfigLoader,
    IngressMode, constants::MANAGED_KEYS,
};
use tempfile::tempdir;

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn clear_sentinel_env() {
    for key in MANAGED_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
fn live_sse_endpoint_selects_server_sent_events() {
    let load = ConfigLoader::isolated()
        .with_override("SENTINEL_EVENTS_URL", "https://feed.local/events")
        .load()
        .expect("load");
    assert!(matches!(
        load.config.ingress.mode,
        IngressMode::ServerSentEvents(ref url) if url.host_str() == Some("feed.local")
    ));
}

#[test]
fn websocket_endpoint_selects_websocket() {
    let load = ConfigLoader::isolated()
        .with_override("SENTINEL_EVENTS_URL", "ws://feed.local:9000/ws")
        .load()
        .expect("load");
    assert!(matches!(load.config.ingress.mode, IngressMode::WebSocket(_)));
}

#[test]
fn synthetic_flag_wins_over_endpoint() {
    let load = ConfigLoader::isolated()
        .with_override("SENTINEL_EVENTS_URL", "http://feed.local/events")
        .with_override("SENTINEL_USE_SYNTHETIC", "true")
        .load()
        .expect("load");
    assert_eq!(load.config.ingress.mode, IngressMode::Synthetic);
}

#[test]
fn live_without_endpoint_is_rejected() {
    let err = ConfigLoader::isolated()
        .with_override("SENTINEL_USE_SYNTHETIC", "false")
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::MissingEventsEndpoint)
    ));
}

#[test]
fn unsupported_events_scheme_is_rejected() {
    let err = ConfigLoader::isolated()
        .with_override("SENTINEL_EVENTS_URL", "kafka://broker:9092/events")
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::UnsupportedScheme { .. })
    ));
}

#[test]
fn durations_use_humantime() {
    let load = ConfigLoader::isolated()
        .with_override("SENTINEL_BACKOFF_CAP", "45s")
        .with_override("SENTINEL_TRIAGE_CONFIRM_DELAY", "150ms")
        .with_override("SENTINEL_SYNTHETIC_INTERVAL", "1s 500ms")
        .load()
        .expect("load");
    assert_eq!(load.config.player.backoff_cap, Duration::from_secs(45));
    assert_eq!(load.config.triage.confirm_delay, Duration::from_millis(150));
    assert_eq!(
        load.config.ingress.synthetic_interval,
        Duration::from_millis(1500)
    );
}

#[test]
fn zero_backoff_cap_is_a_guard_rail() {
    let err = ConfigLoader::isolated()
        .with_override("SENTINEL_BACKOFF_CAP", "0s")
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::ZeroBackoffCap)
    ));
}

#[test]
fn malformed_duration_reports_key() {
    let err = ConfigLoader::isolated()
        .with_override("SENTINEL_REQUEST_TIMEOUT", "soon")
        .load()
        .unwrap_err();
    assert!(err.to_string().contains("SENTINEL_REQUEST_TIMEOUT"));
}

#[test]
fn inline_roster_with_duplicates_is_rejected() {
    let err = ConfigLoader::isolated()
        .with_override(
            "SENTINEL_CAMERAS_JSON",
            r#"[{"id":"cam_01","name":"A"},{"id":"cam_01","name":"B"}]"#,
        )
        .load()
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigLoadError::GuardRail(ConfigGuardRailError::DuplicateCamera(ref id)) if id == "cam_01"
    ));
}

#[test]
fn roster_file_is_loaded_from_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cameras.toml");
    fs::write(
        &path,
        r#"
[[cameras]]
id = "cam_21"
name = "Depot Gate"
streamUrl = "http://cams.local/depot/index.m3u8"
"#,
    )
    .expect("write roster");

    let load = ConfigLoader::isolated()
        .with_override("SENTINEL_CAMERAS_PATH", path.display().to_string())
        .load()
        .expect("load");
    assert_eq!(load.config.cameras.len(), 1);
    assert_eq!(
        load.config.metadata.roster_source,
        CameraRosterSource::EnvPath(path)
    );
}

#[test]
fn env_file_populates_process_environment() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_sentinel_env();

    let dir = tempdir().expect("tempdir");
    let env_path = dir.path().join(".env");
    fs::write(
        &env_path,
        "SENTINEL_API_URL=http://gateway.internal:8080\nSENTINEL_USE_SYNTHETIC=yes\n",
    )
    .expect("write env");

    let load = ConfigLoader::new()
        .with_env_file(&env_path)
        .load()
        .expect("load");

    clear_sentinel_env();

    assert!(load.config.metadata.env_file_loaded);
    assert_eq!(
        load.config.api.base_url.as_str(),
        "http://gateway.internal:8080/"
    );
    assert_eq!(load.config.ingress.mode, IngressMode::Synthetic);
}

#[test]
fn missing_env_file_is_not_an_error() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    clear_sentinel_env();

    let dir = tempdir().expect("tempdir");
    let load = ConfigLoader::new()
        .with_env_file(dir.path().join("absent.env"))
        .load()
        .expect("load");
    assert!(!load.config.metadata.env_file_loaded);
}
