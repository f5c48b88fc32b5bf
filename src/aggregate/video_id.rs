//! Video ID extraction from indexed URLs.
//!
//! Index metadata carries the watch URL, not the ID. Watch URLs
//! (`https://www.youtube.com/watch?v=<id>&...`) carry the ID in the `v` query
//! pair; short URLs (`https://youtu.be/<id>`) in the last path segment. A
//! missing scheme is tolerated. The ID must consist only of the characters
//! YouTube uses in IDs.

use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid video id regex"))
}

/// Extract the video ID from a match URL, or `None` if it names no video.
pub fn video_id_from_url(url: &str) -> Option<String> {
    let parsed = parse_lenient(url.trim())?;

    let id = match parsed.query_pairs().find(|(key, _)| key == "v") {
        Some((_, value)) => value.into_owned(),
        None => parsed
            .path_segments()?
            .filter(|segment| !segment.is_empty())
            .last()
            .filter(|segment| *segment != "watch")?
            .to_string(),
    };

    id_pattern().is_match(&id).then_some(id)
}

fn parse_lenient(url: &str) -> Option<Url> {
    match Url::parse(url) {
        Ok(parsed) => Some(parsed),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{}", url)).ok()
        }
        Err(_) => None,
    }
}

/// Thumbnail image for a video.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/maxresdefault.jpg", video_id)
}
