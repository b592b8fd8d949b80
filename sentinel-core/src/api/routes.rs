macro_rules! api_path {
    ($path:literal) => {
        concat!("/api", $path)
    };
}

/// Backend routes consumed by the monitoring core.
pub mod triage {
    pub const QUEUE: &str = api_path!("/triage/queue");
    /// Parent of the per-task routes (`{ROOT}/{id}/validate`).
    pub const ROOT: &str = api_path!("/triage");
    pub const VALIDATE_SUFFIX: &str = "validate";
}

pub mod utils {
    use url::Url;

    /// Append path segments to `base`, percent-encoding each one so ids
    /// containing `/`, `?` or `#` stay a single segment.
    pub fn push_segments(base: &str, segments: &[&str]) -> Option<Url> {
        let mut url = Url::parse(base).ok()?;
        {
            let mut path = url.path_segments_mut().ok()?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_route_keeps_task_id_in_one_segment() {
        let url = utils::push_segments(
            "http://localhost:8000/api/triage",
            &["task_123", triage::VALIDATE_SUFFIX],
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/triage/task_123/validate");

        let url = utils::push_segments(
            "http://localhost:8000/api/triage/",
            &["a/b?c#d", triage::VALIDATE_SUFFIX],
        )
        .unwrap();
        assert_eq!(url.path(), "/api/triage/a%2Fb%3Fc%23d/validate");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
        assert_eq!(triage::QUEUE, "/api/triage/queue");
    }

    #[test]
    fn relative_base_is_rejected() {
        assert!(utils::push_segments("api/triage", &["t1"]).is_none());
    }
}
