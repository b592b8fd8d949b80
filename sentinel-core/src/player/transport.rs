use std::fmt;
use url::Url;

/// Decoding strategy, chosen once per stream URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    /// HLS-style `.m3u8` playlist of media segments.
    SegmentedPlaylist,
    /// Any directly playable resource.
    Progressive,
}

impl TransportKind {
    pub fn detect(url: &Url) -> Self {
        let path_is_playlist = url.path().to_ascii_lowercase().ends_with(".m3u8");
        let query_is_playlist = url.query_pairs().any(|(key, value)| {
            key.eq_ignore_ascii_case("format") && value.eq_ignore_ascii_case("m3u8")
        });

        if path_is_playlist || query_is_playlist {
            TransportKind::SegmentedPlaylist
        } else {
            TransportKind::Progressive
        }
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::SegmentedPlaylist => f.write_str("segmented-playlist"),
            TransportKind::Progressive => f.write_str("progressive"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind(raw: &str) -> TransportKind {
        TransportKind::detect(&Url::parse(raw).unwrap())
    }

    #[test]
    fn playlist_urls_are_segmented() {
        assert_eq!(
            kind("http://localhost:8888/cam_01/index.m3u8"),
            TransportKind::SegmentedPlaylist
        );
        assert_eq!(
            kind("https://cdn.example/live/INDEX.M3U8?token=abc"),
            TransportKind::SegmentedPlaylist
        );
        assert_eq!(
            kind("https://cdn.example/live?format=m3u8"),
            TransportKind::SegmentedPlaylist
        );
    }

    #[test]
    fn everything_else_is_progressive() {
        assert_eq!(kind("http://cams.local/cam_02.mp4"), TransportKind::Progressive);
        assert_eq!(kind("rtsp://10.0.0.5/stream"), TransportKind::Progressive);
        assert_eq!(
            kind("http://cams.local/m3u8/live.ts"),
            TransportKind::Progressive
        );
    }
}
