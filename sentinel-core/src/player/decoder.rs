use super::playlist::{MediaPlaylist, Playlist, parse_playlist};
use super::state::SurfaceSize;
use super::transport::TransportKind;
use crate::error::{MonitorError, Result};

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// What a decoder learned while opening a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaInfo {
    pub frame: Option<SurfaceSize>,
}

/// One connection attempt to a stream. Dropping it releases the connection.
#[async_trait]
pub trait Decoder: Send {
    /// Connect and wait for the first media.
    async fn open(&mut self) -> Result<MediaInfo>;

    /// Keep media flowing. Only returns when the stream faults or ends.
    async fn pump(&mut self) -> MonitorError;
}

pub trait DecoderFactory: Send + Sync {
    fn create(&self, kind: TransportKind, url: &Url) -> Box<dyn Decoder>;
}

/// Builds reqwest-backed decoders.
#[derive(Debug, Clone, Default)]
pub struct HttpDecoderFactory {
    client: Client,
}

impl HttpDecoderFactory {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl DecoderFactory for HttpDecoderFactory {
    fn create(&self, kind: TransportKind, url: &Url) -> Box<dyn Decoder> {
        match kind {
            TransportKind::SegmentedPlaylist => {
                Box::new(PlaylistDecoder::new(self.client.clone(), url.clone()))
            }
            TransportKind::Progressive => {
                Box::new(ProgressiveDecoder::new(self.client.clone(), url.clone()))
            }
        }
    }
}

fn ensure_http(url: &Url) -> Result<()> {
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(MonitorError::UnsupportedMedia(format!(
            "{} streams are not playable here",
            other
        ))),
    }
}

async fn fetch_text(client: &Client, url: &Url) -> Result<String> {
    let response = client.get(url.clone()).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(MonitorError::Status {
            status,
            url: url.to_string(),
        });
    }
    Ok(response.text().await?)
}

/// Follows a live playlist, refreshing it every target duration.
#[derive(Debug)]
pub struct PlaylistDecoder {
    client: Client,
    url: Url,
    media_url: Option<Url>,
    last: Option<MediaPlaylist>,
    stalled_refreshes: u32,
}

/// Refreshes without a new segment before the stream counts as stalled.
const MAX_STALLED_REFRESHES: u32 = 3;

impl PlaylistDecoder {
    pub fn new(client: Client, url: Url) -> Self {
        Self {
            client,
            url,
            media_url: None,
            last: None,
            stalled_refreshes: 0,
        }
    }

    async fn fetch_media(&self, url: &Url) -> Result<MediaPlaylist> {
        match parse_playlist(&fetch_text(&self.client, url).await?)? {
            Playlist::Media(media) => Ok(media),
            Playlist::Master(_) => Err(MonitorError::UnsupportedMedia(
                "variant playlist is itself a master playlist".to_string(),
            )),
        }
    }

    fn refresh_interval(&self) -> Duration {
        let secs = self
            .last
            .as_ref()
            .map(|media| media.target_duration)
            .unwrap_or(4.0)
            .clamp(0.5, 30.0);
        Duration::from_secs_f64(secs)
    }
}

#[async_trait]
impl Decoder for PlaylistDecoder {
    async fn open(&mut self) -> Result<MediaInfo> {
        ensure_http(&self.url)?;

        let (media_url, media, frame) =
            match parse_playlist(&fetch_text(&self.client, &self.url).await?)? {
                Playlist::Media(media) => (self.url.clone(), media, None),
                Playlist::Master(master) => {
                    let variant = master.highest().ok_or_else(|| {
                        MonitorError::UnsupportedMedia("empty master playlist".into())
                    })?;
                    let media_url = self.url.join(&variant.uri)?;
                    let frame = variant
                        .resolution
                        .map(|(width, height)| SurfaceSize::new(width, height));
                    tracing::debug!(
                        variant = %media_url,
                        bandwidth = variant.bandwidth,
                        "selected playlist variant"
                    );
                    let media = self.fetch_media(&media_url).await?;
                    (media_url, media, frame)
                }
            };

        if media.segments.is_empty() {
            return Err(MonitorError::Transport(
                "playlist has no segments yet".to_string(),
            ));
        }

        self.media_url = Some(media_url);
        self.last = Some(media);
        self.stalled_refreshes = 0;
        Ok(MediaInfo { frame })
    }

    async fn pump(&mut self) -> MonitorError {
        let Some(media_url) = self.media_url.clone() else {
            return MonitorError::Internal("pump before open".to_string());
        };

        loop {
            if self.last.as_ref().is_some_and(|media| media.ended) {
                return MonitorError::Transport("stream ended".to_string());
            }
            tokio::time::sleep(self.refresh_interval()).await;

            let media = match self.fetch_media(&media_url).await {
                Ok(media) => media,
                Err(err) => return err,
            };

            let advanced = self
                .last
                .as_ref()
                .is_none_or(|last| media.next_sequence() > last.next_sequence());
            if advanced {
                self.stalled_refreshes = 0;
            } else {
                self.stalled_refreshes += 1;
                if self.stalled_refreshes >= MAX_STALLED_REFRESHES {
                    return MonitorError::Transport("playlist stalled".to_string());
                }
            }
            self.last = Some(media);
        }
    }
}

/// Streams a directly playable resource.
#[derive(Debug)]
pub struct ProgressiveDecoder {
    client: Client,
    url: Url,
    response: Option<reqwest::Response>,
}

impl ProgressiveDecoder {
    pub fn new(client: Client, url: Url) -> Self {
        Self {
            client,
            url,
            response: None,
        }
    }
}

/// Content types the player accepts for progressive playback.
pub fn is_playable_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    essence.starts_with("video/")
        || essence == "application/octet-stream"
        || essence == "application/mp2t"
}

#[async_trait]
impl Decoder for ProgressiveDecoder {
    async fn open(&mut self) -> Result<MediaInfo> {
        ensure_http(&self.url)?;

        let response = self.client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(MonitorError::Status {
                status,
                url: self.url.to_string(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        if let Some(content_type) = content_type {
            if !is_playable_content_type(&content_type) {
                return Err(MonitorError::UnsupportedMedia(content_type));
            }
        }

        self.response = Some(response);
        Ok(MediaInfo::default())
    }

    async fn pump(&mut self) -> MonitorError {
        let Some(response) = self.response.as_mut() else {
            return MonitorError::Internal("pump before open".to_string());
        };
        loop {
            match response.chunk().await {
                Ok(Some(_)) => {}
                Ok(None) => return MonitorError::Transport("stream ended".to_string()),
                Err(err) => return MonitorError::Http(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_type_gate() {
        assert!(is_playable_content_type("video/mp4"));
        assert!(is_playable_content_type("Video/MP2T; charset=binary"));
        assert!(is_playable_content_type("application/octet-stream"));
        assert!(!is_playable_content_type("text/html; charset=utf-8"));
    }

    #[tokio::test]
    async fn non_http_streams_are_unsupported_media() {
        let url = Url::parse("rtsp://10.0.0.5/stream").unwrap();
        let mut decoder = HttpDecoderFactory::default()
            .create(TransportKind::detect(&url), &url);
        assert!(matches!(
            decoder.open().await,
            Err(MonitorError::UnsupportedMedia(_))
        ));
    }
}
