//! Timestamp merge for one video's segments.
//!
//! Segments are walked in `(end, start)` order. A segment whose start falls
//! strictly inside the previous segment's span continues the previous line:
//! the previous line is cut where this segment's text begins. Anything else
//! opens a new section. Only the immediately preceding line is ever
//! compared, so three or more mutually overlapping segments are not merged
//! as a whole.

use super::{DisplayLine, Segment};

/// Number of leading characters used to find where a continuation begins.
const OVERLAP_PREFIX_CHARS: usize = 10;

/// Format whole seconds as `MM:SS`.
///
/// Minutes widen past two digits rather than wrapping.
pub fn format_timestamp(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

fn cut_at_prefix(line: &mut String, text: &str) {
    let prefix: String = text.chars().take(OVERLAP_PREFIX_CHARS).collect();
    if prefix.is_empty() {
        return;
    }
    if let Some(pos) = line.find(&prefix) {
        line.truncate(pos);
    }
}

/// Merge a video's segments into display lines.
pub fn merge_segments(segments: &[Segment]) -> Vec<DisplayLine> {
    let mut ordered: Vec<&Segment> = segments.iter().collect();
    ordered.sort_by(|a, b| {
        (a.end, a.start, &a.url, &a.text).cmp(&(b.end, b.start, &b.url, &b.text))
    });

    let mut lines: Vec<DisplayLine> = Vec::with_capacity(ordered.len() * 2);
    let mut current_start = 0;
    let mut current_end = 0;

    for segment in ordered {
        let timestamp = format_timestamp(segment.start);

        if current_start < segment.start && segment.start < current_end {
            if let Some(DisplayLine::Text { text, .. }) = lines.last_mut() {
                cut_at_prefix(text, &segment.text);
            }
            lines.push(DisplayLine::Text {
                text: format!("[{}] {}", timestamp, capitalize(&segment.text)),
                url: segment.url.clone(),
            });
        } else {
            lines.push(DisplayLine::Break);
            lines.push(DisplayLine::Text {
                text: format!("[{}] {}", timestamp, segment.text),
                url: segment.url.clone(),
            });
        }

        current_start = segment.start;
        current_end = segment.end;
    }

    for line in &mut lines {
        if let DisplayLine::Text { text, .. } = line {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *text = trimmed.to_string();
            }
        }
    }

    lines
}
