//! Result aggregation: turns a flat, ranked match list into one display
//! record per video.
//!
//! Videos appear in the order of their first match in the retrieved list.
//! Within a video, overlapping transcript windows are folded into readable
//! lines with clickable timestamps (see [`merge`]).

pub mod merge;
mod video_id;

pub use merge::{format_timestamp, merge_segments};
pub use video_id::{thumbnail_url, video_id_from_url};

use crate::vector_index::Match;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// One transcript segment inside a video group. Times are whole seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: u64,
    pub end: u64,
    /// Watch URL that jumps to `start`.
    pub url: String,
    pub text: String,
}

impl Segment {
    fn from_match(m: &Match) -> Self {
        let start = m.start as u64;
        Self {
            start,
            end: m.end as u64,
            url: format!("{}&t={}", m.url, start),
            text: m.text.clone(),
        }
    }
}

/// All matches for one video, in retrieval order.
#[derive(Debug, Clone)]
pub struct VideoGroup {
    pub video_id: String,
    pub title: String,
    pub segments: Vec<Segment>,
}

/// One rendered unit of a video card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayLine {
    /// Section break between unrelated passages.
    Break,
    /// `[MM:SS] text` linked to the moment it starts.
    Text { text: String, url: String },
}

/// Display-ready card for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoGroupDisplay {
    pub video_id: String,
    pub title: String,
    /// Link for the thumbnail: the video's first retrieved segment.
    pub url: String,
    pub thumbnail_url: String,
    pub lines: Vec<DisplayLine>,
}

impl VideoGroup {
    /// Merge the group's segments into a display record.
    pub fn to_display(&self) -> VideoGroupDisplay {
        VideoGroupDisplay {
            video_id: self.video_id.clone(),
            title: self.title.clone(),
            url: self
                .segments
                .first()
                .map(|s| s.url.clone())
                .unwrap_or_default(),
            thumbnail_url: thumbnail_url(&self.video_id),
            lines: merge_segments(&self.segments),
        }
    }
}

/// Group matches by video, preserving first-seen order.
///
/// Matches whose URL does not yield a video ID are skipped.
pub fn group_matches(matches: &[Match]) -> Vec<VideoGroup> {
    let mut groups: Vec<VideoGroup> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for m in matches {
        let Some(video_id) = video_id_from_url(&m.url) else {
            warn!(id = %m.id, url = %m.url, "Skipping match with unrecognised video URL");
            continue;
        };

        let segment = Segment::from_match(m);
        match positions.get(&video_id) {
            Some(&pos) => groups[pos].segments.push(segment),
            None => {
                positions.insert(video_id.clone(), groups.len());
                groups.push(VideoGroup {
                    video_id,
                    title: m.title.clone(),
                    segments: vec![segment],
                });
            }
        }
    }

    groups
}

/// Group and merge matches into ordered per-video display records.
pub fn aggregate(matches: &[Match]) -> Vec<VideoGroupDisplay> {
    let groups = group_matches(matches);
    debug!(
        "Aggregated {} matches into {} videos",
        matches.len(),
        groups.len()
    );
    groups.iter().map(VideoGroup::to_display).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(video: &str, title: &str, start: f64, end: f64, text: &str) -> Match {
        Match {
            id: format!("{}-{}", video, start),
            title: title.to_string(),
            url: format!("https://www.youtube.com/watch?v={}", video),
            start,
            end,
            text: text.to_string(),
            channel: Some("GSC".to_string()),
            publish: Some("2022".to_string()),
            score: 0.5,
        }
    }

    fn line_text(line: &DisplayLine) -> Option<&str> {
        match line {
            DisplayLine::Text { text, .. } => Some(text.as_str()),
            DisplayLine::Break => None,
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn test_first_seen_order() {
        let matches = vec![
            m("bbb", "B", 500.0, 520.0, "b text"),
            m("aaa", "A", 1.0, 20.0, "a text"),
            m("bbb", "B", 10.0, 30.0, "more b"),
        ];
        let cards = aggregate(&matches);
        let ids: Vec<&str> = cards.iter().map(|c| c.video_id.as_str()).collect();
        assert_eq!(ids, vec!["bbb", "aaa"]);
    }

    #[test]
    fn test_order_ignores_scores() {
        let mut low = m("low", "Low", 0.0, 10.0, "x");
        low.score = 0.1;
        let mut high = m("high", "High", 0.0, 10.0, "y");
        high.score = 0.9;
        let cards = aggregate(&[low, high]);
        assert_eq!(cards[0].video_id, "low");
        assert_eq!(cards[1].video_id, "high");
    }

    #[test]
    fn test_title_from_first_match() {
        let cards = aggregate(&[
            m("abc", "First title", 0.0, 10.0, "x"),
            m("abc", "Other title", 20.0, 30.0, "y"),
        ]);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "First title");
    }

    #[test]
    fn test_segment_times_truncated_into_urls() {
        let groups = group_matches(&[m("abc", "T", 65.9, 90.7, "x")]);
        let segment = &groups[0].segments[0];
        assert_eq!(segment.start, 65);
        assert_eq!(segment.end, 90);
        assert_eq!(segment.url, "https://www.youtube.com/watch?v=abc&t=65");
    }

    #[test]
    fn test_timestamp_labels_from_fractional_starts() {
        let cards = aggregate(&[
            m("abc", "T", 65.4, 70.0, "one"),
            m("abc", "T", 59.5, 60.0, "two"),
            m("abc", "T", 599.5, 610.0, "three"),
        ]);
        let labels: Vec<&str> = cards[0].lines.iter().filter_map(line_text).collect();
        assert_eq!(labels, vec!["[00:59] two", "[01:05] one", "[09:59] three"]);
    }

    #[test]
    fn test_merge_uses_end_start_order_not_input_order() {
        let cards = aggregate(&[
            m("abc", "T", 40.0, 90.0, "late end"),
            m("abc", "T", 60.0, 70.0, "early end"),
        ]);
        let labels: Vec<&str> = cards[0].lines.iter().filter_map(line_text).collect();
        assert_eq!(labels, vec!["[01:00] early end", "[00:40] late end"]);
    }

    #[test]
    fn test_thumbnail_links_first_retrieved_segment() {
        let cards = aggregate(&[
            m("abc", "T", 300.0, 330.0, "retrieved first"),
            m("abc", "T", 10.0, 40.0, "earlier in video"),
        ]);
        assert_eq!(cards[0].url, "https://www.youtube.com/watch?v=abc&t=300");
    }

    #[test]
    fn test_malformed_url_skipped() {
        let mut bad = m("abc", "Bad", 0.0, 10.0, "x");
        bad.url = "not a url/".to_string();
        let cards = aggregate(&[bad, m("xyz", "Good", 0.0, 10.0, "y")]);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].video_id, "xyz");
    }

    #[test]
    fn test_watch_url_with_extra_params_kept() {
        let mut playlist = m("abc", "T", 40.0, 50.0, "from the playlist link");
        playlist.url = "https://www.youtube.com/watch?v=abc&list=PL1".to_string();
        let cards = aggregate(&[m("abc", "T", 0.0, 10.0, "plain link"), playlist]);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].video_id, "abc");
        assert_eq!(cards[0].lines.len(), 4);
    }

    #[test]
    fn test_two_video_scenario() {
        let matches = vec![
            m("abc", "Crawl budget", 10.0, 30.0, "the quick brown fox jumps"),
            m("xyz", "Link building", 5.0, 25.0, "links still matter"),
            m("abc", "Crawl budget", 20.0, 40.0, "the quick brown fox leaps"),
            m("abc", "Crawl budget", 50.0, 60.0, "a different point"),
        ];

        let cards = aggregate(&matches);
        assert_eq!(cards.len(), 2);

        let abc = &cards[0];
        assert_eq!(abc.video_id, "abc");
        assert_eq!(
            abc.thumbnail_url,
            "https://img.youtube.com/vi/abc/maxresdefault.jpg"
        );
        assert_eq!(
            abc.lines,
            vec![
                DisplayLine::Break,
                DisplayLine::Text {
                    text: "[00:10]".to_string(),
                    url: "https://www.youtube.com/watch?v=abc&t=10".to_string(),
                },
                DisplayLine::Text {
                    text: "[00:20] The quick brown fox leaps".to_string(),
                    url: "https://www.youtube.com/watch?v=abc&t=20".to_string(),
                },
                DisplayLine::Break,
                DisplayLine::Text {
                    text: "[00:50] a different point".to_string(),
                    url: "https://www.youtube.com/watch?v=abc&t=50".to_string(),
                },
            ]
        );

        let xyz = &cards[1];
        assert_eq!(xyz.video_id, "xyz");
        assert_eq!(
            xyz.thumbnail_url,
            "https://img.youtube.com/vi/xyz/maxresdefault.jpg"
        );
        assert_eq!(xyz.lines.len(), 2);
    }

    #[test]
    fn test_display_line_json() {
        let json = serde_json::to_value(DisplayLine::Break).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "break" }));
    }
}
