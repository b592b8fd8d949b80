use std::path::Path;

use anyhow::Result;
use sentinel_config::{CameraRosterSource, IngressMode, SentinelConfig};

pub fn run(env_file: &Path) -> Result<()> {
    let config = super::load_config(env_file)?;
    for line in describe(&config) {
        println!("{line}");
    }
    Ok(())
}

/// Human-readable summary of the resolved settings.
pub fn describe(config: &SentinelConfig) -> Vec<String> {
    let ingress = match &config.ingress.mode {
        IngressMode::Synthetic => format!(
            "synthetic (every {})",
            humantime::format_duration(config.ingress.synthetic_interval)
        ),
        IngressMode::ServerSentEvents(url) => format!("server-sent events {url}"),
        IngressMode::WebSocket(url) => format!("websocket {url}"),
    };
    let roster = match &config.metadata.roster_source {
        CameraRosterSource::Demo => "built-in demo roster".to_string(),
        CameraRosterSource::EnvPath(path) => path.display().to_string(),
        CameraRosterSource::EnvInline => "inline JSON".to_string(),
    };

    let mut lines = vec![
        format!("api            {}", config.api.base_url),
        format!(
            "timeout        {}",
            humantime::format_duration(config.api.request_timeout)
        ),
        format!("ingress        {ingress}"),
        format!(
            "backoff cap    {}",
            humantime::format_duration(config.player.backoff_cap)
        ),
        format!(
            "confirm delay  {}",
            humantime::format_duration(config.triage.confirm_delay)
        ),
        format!(
            "env file       {}",
            if config.metadata.env_file_loaded { "loaded" } else { "not found" }
        ),
        format!("cameras        {} ({roster})", config.cameras.len()),
    ];
    for camera in &config.cameras {
        let stream = camera
            .stream_url
            .as_ref()
            .map(|url| url.as_str())
            .unwrap_or("-");
        lines.push(format!(
            "  {:<10} {:<8} {:<28} {stream}",
            camera.id.as_str(),
            camera.status,
            camera.name
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_config::ConfigLoader;

    #[test]
    fn summary_lists_every_camera() {
        let config = ConfigLoader::isolated()
            .with_override("SENTINEL_BACKOFF_CAP", "45s")
            .load()
            .unwrap()
            .config;
        let lines = describe(&config);

        assert!(lines.iter().any(|l| l.starts_with("ingress") && l.contains("synthetic")));
        assert!(lines.iter().any(|l| l.starts_with("backoff cap") && l.contains("45s")));
        assert!(lines.iter().any(|l| l.contains("built-in demo roster")));
        assert_eq!(
            lines.iter().filter(|l| l.starts_with("  cam_")).count(),
            config.cameras.len()
        );
    }
}
