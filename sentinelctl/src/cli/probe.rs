use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sentinel_core::Backoff;
use sentinel_core::player::{HttpDecoderFactory, PlayerSnapshot, PlayerState, StreamPlayer};
use url::Url;

pub async fn run(url: Url, camera: String, backoff_cap: Duration) -> Result<()> {
    let mut player = StreamPlayer::spawn(
        camera.into(),
        url,
        Arc::new(HttpDecoderFactory::default()),
        Backoff::new(backoff_cap),
    );
    let mut updates = player.subscribe();
    println!("{}", describe(&updates.borrow_and_update()));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            signal = &mut shutdown => {
                signal.context("failed to listen for Ctrl-C")?;
                break;
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                println!("{}", describe(&snapshot));
            }
        }
    }

    player.dispose().await;
    println!("{}", describe(&player.snapshot()));
    Ok(())
}

/// One status line per player transition.
pub fn describe(snapshot: &PlayerSnapshot) -> String {
    let status = snapshot.status();
    match snapshot.state {
        PlayerState::Playing => match snapshot.frame {
            Some(frame) => format!("{status} {frame}"),
            None => status.to_string(),
        },
        PlayerState::Error => {
            let retry = snapshot
                .next_retry_in
                .map(|delay| format!(", retry in {}s", delay.as_secs()))
                .unwrap_or_default();
            format!(
                "{status} (attempt {}{retry}): {}",
                snapshot.attempt,
                snapshot.last_error.as_deref().unwrap_or("unknown error")
            )
        }
        PlayerState::Connecting if snapshot.attempt > 0 => {
            format!("{status} (attempt {})", snapshot.attempt)
        }
        PlayerState::Connecting | PlayerState::Offline => status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::player::SurfaceSize;

    #[test]
    fn error_lines_show_the_scheduled_retry() {
        let snapshot = PlayerSnapshot {
            state: PlayerState::Error,
            attempt: 3,
            next_retry_in: Some(Duration::from_secs(8)),
            last_error: Some("connection refused".into()),
            ..PlayerSnapshot::default()
        };
        assert_eq!(
            describe(&snapshot),
            "error (attempt 3, retry in 8s): connection refused"
        );
    }

    #[test]
    fn playing_lines_show_the_frame() {
        let snapshot = PlayerSnapshot {
            state: PlayerState::Playing,
            frame: Some(SurfaceSize::new(1280, 720)),
            ..PlayerSnapshot::default()
        };
        assert_eq!(describe(&snapshot), "playing 1280x720");
        assert_eq!(describe(&PlayerSnapshot::offline()), "offline");
    }
}
