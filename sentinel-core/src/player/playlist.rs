//! Minimal M3U8 parsing: enough to pick a variant, learn its resolution and
//! follow a live media playlist.

use crate::error::{MonitorError, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Playlist {
    Master(MasterPlaylist),
    Media(MediaPlaylist),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MasterPlaylist {
    /// Sorted by ascending bandwidth.
    pub variants: Vec<Variant>,
}

impl MasterPlaylist {
    pub fn highest(&self) -> Option<&Variant> {
        self.variants.last()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub bandwidth: u64,
    pub resolution: Option<(u32, u32)>, // width, height
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MediaPlaylist {
    pub segments: Vec<Segment>,
    pub target_duration: f64,
    pub media_sequence: u64,
    /// `#EXT-X-ENDLIST` seen; no more segments will be appended.
    pub ended: bool,
}

impl MediaPlaylist {
    /// Sequence number just past the newest segment.
    pub fn next_sequence(&self) -> u64 {
        self.media_sequence + self.segments.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub duration: f64,
    pub uri: String,
    pub sequence_number: u64,
}

const DEFAULT_TARGET_DURATION: f64 = 4.0;

pub fn parse_playlist(content: &str) -> Result<Playlist> {
    let mut lines = content.lines().map(str::trim).filter(|l| !l.is_empty());
    if lines.next() != Some("#EXTM3U") {
        return Err(MonitorError::UnsupportedMedia(
            "playlist does not start with #EXTM3U".to_string(),
        ));
    }

    if content.contains("#EXT-X-STREAM-INF:") {
        parse_master(content).map(Playlist::Master)
    } else {
        Ok(Playlist::Media(parse_media(content)))
    }
}

fn parse_master(content: &str) -> Result<MasterPlaylist> {
    let mut variants = Vec::new();
    let mut pending: Option<(u64, Option<(u32, u32)>)> = None;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(info) = line.strip_prefix("#EXT-X-STREAM-INF:") {
            let mut bandwidth = 0;
            let mut resolution = None;
            for (key, value) in attributes(info) {
                match key {
                    "BANDWIDTH" => bandwidth = value.parse().unwrap_or(0),
                    "RESOLUTION" => resolution = parse_resolution(value),
                    _ => {}
                }
            }
            pending = Some((bandwidth, resolution));
        } else if !line.starts_with('#') {
            // URI line following a stream-inf tag
            if let Some((bandwidth, resolution)) = pending.take() {
                variants.push(Variant {
                    bandwidth,
                    resolution,
                    uri: line.to_string(),
                });
            }
        }
    }

    if variants.is_empty() {
        return Err(MonitorError::UnsupportedMedia(
            "no variants found in master playlist".to_string(),
        ));
    }
    variants.sort_by_key(|v| v.bandwidth);
    Ok(MasterPlaylist { variants })
}

fn parse_media(content: &str) -> MediaPlaylist {
    let mut segments = Vec::new();
    let mut target_duration = DEFAULT_TARGET_DURATION;
    let mut media_sequence = 0;
    let mut ended = false;
    let mut pending_duration: Option<f64> = None;

    for line in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if let Some(value) = line.strip_prefix("#EXT-X-TARGETDURATION:") {
            target_duration = value.parse().unwrap_or(DEFAULT_TARGET_DURATION);
        } else if let Some(value) = line.strip_prefix("#EXT-X-MEDIA-SEQUENCE:") {
            media_sequence = value.parse().unwrap_or(0);
        } else if let Some(value) = line.strip_prefix("#EXTINF:") {
            pending_duration = Some(
                value
                    .split(',')
                    .next()
                    .and_then(|s| s.trim().parse::<f64>().ok())
                    .unwrap_or(target_duration),
            );
        } else if line == "#EXT-X-ENDLIST" {
            ended = true;
        } else if !line.starts_with('#') {
            if let Some(duration) = pending_duration.take() {
                segments.push(Segment {
                    duration,
                    uri: line.to_string(),
                    sequence_number: media_sequence + segments.len() as u64,
                });
            }
        }
    }

    MediaPlaylist {
        segments,
        target_duration,
        media_sequence,
        ended,
    }
}

/// Split an attribute list on commas that are not inside quotes.
fn attributes(list: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    for (i, ch) in list.char_indices() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                push_attribute(&list[start..i], &mut out);
                start = i + 1;
            }
            _ => {}
        }
    }
    push_attribute(&list[start..], &mut out);
    out
}

fn push_attribute<'a>(raw: &'a str, out: &mut Vec<(&'a str, &'a str)>) {
    if let Some((key, value)) = raw.split_once('=') {
        out.push((key.trim(), value.trim().trim_matches('"')));
    }
}

fn parse_resolution(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.split_once(['x', 'X'])?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MASTER: &str = "#EXTM3U
#EXT-X-STREAM-INF:BANDWIDTH=2500000,RESOLUTION=1280x720,CODECS=\"avc1.4d401f,mp4a.40.2\"
720p/index.m3u8
#EXT-X-STREAM-INF:BANDWIDTH=800000,RESOLUTION=640x360
360p/index.m3u8
";

    const MEDIA: &str = "#EXTM3U
#EXT-X-VERSION:3
#EXT-X-TARGETDURATION:2
#EXT-X-MEDIA-SEQUENCE:41
#EXTINF:2.000,
segment41.ts
#EXTINF:1.960,
segment42.ts
";

    #[test]
    fn master_variants_are_sorted_and_quoted_codecs_survive() {
        let Playlist::Master(master) = parse_playlist(MASTER).unwrap() else {
            panic!("expected master playlist");
        };
        assert_eq!(master.variants.len(), 2);
        assert_eq!(master.variants[0].resolution, Some((640, 360)));
        let best = master.highest().unwrap();
        assert_eq!(best.bandwidth, 2_500_000);
        assert_eq!(best.resolution, Some((1280, 720)));
        assert_eq!(best.uri, "720p/index.m3u8");
    }

    #[test]
    fn media_playlist_tracks_sequence_numbers() {
        let Playlist::Media(media) = parse_playlist(MEDIA).unwrap() else {
            panic!("expected media playlist");
        };
        assert_eq!(media.target_duration, 2.0);
        assert_eq!(media.segments[1].sequence_number, 42);
        assert_eq!(media.next_sequence(), 43);
        assert!(!media.ended);
    }

    #[test]
    fn endlist_marks_playlist_finished() {
        let content = format!("{}#EXT-X-ENDLIST\n", MEDIA);
        let Playlist::Media(media) = parse_playlist(&content).unwrap() else {
            panic!("expected media playlist");
        };
        assert!(media.ended);
    }

    #[test]
    fn non_playlists_are_unsupported_media() {
        assert!(matches!(
            parse_playlist("<html></html>"),
            Err(MonitorError::UnsupportedMedia(_))
        ));
        assert!(matches!(
            parse_playlist("#EXTM3U\n#EXT-X-STREAM-INF:BANDWIDTH=1\n"),
            Err(MonitorError::UnsupportedMedia(_))
        ));
    }
}
