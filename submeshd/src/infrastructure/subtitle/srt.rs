//! SRT parsing and formatting (§6.3): full block-structured parsing
//! into `SubtitleSegment`s and the reverse formatting, as a set of
//! plain, well-tested functions.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::entities::SubtitleSegment;
use crate::shared::error::SubtitleFormatError;

static TIMING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2},\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2},\d{3})$").unwrap()
});

/// Parses an SRT document into ordered segments. Blocks with a
/// malformed timing line are skipped with a warning, not an error; an
/// empty result (no block survived) is the caller's responsibility to
/// treat as `no segments` per §4.5 step 1.
pub fn parse_srt(content: &str) -> Vec<SubtitleSegment> {
    let normalized = content.replace("\r\n", "\n");
    let mut segments = Vec::new();

    for (block_no, block) in normalized.split("\n\n").enumerate() {
        let block = block.trim_end_matches('\n');
        if block.trim().is_empty() {
            continue;
        }
        let mut lines = block.lines();

        let Some(index_line) = lines.next() else {
            continue;
        };
        let Ok(index) = index_line.trim().parse::<u32>() else {
            tracing::warn!(block_no, "skipping SRT block with non-numeric index");
            continue;
        };

        let Some(timing_line) = lines.next() else {
            tracing::warn!(block_no, index, "skipping SRT block missing timing line");
            continue;
        };
        let Some(caps) = TIMING_LINE.captures(timing_line.trim()) else {
            tracing::warn!(block_no, index, timing_line, "skipping SRT block with malformed timing line");
            continue;
        };
        let start = caps[1].to_string();
        let end = caps[2].to_string();

        let text: Vec<&str> = lines.collect();
        if text.is_empty() {
            tracing::warn!(block_no, index, "skipping SRT block with no text lines");
            continue;
        }
        let text = text
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join("\n");

        segments.push(SubtitleSegment {
            index,
            start,
            end,
            text,
        });
    }

    segments.sort_by_key(|s| s.index);
    segments
}

/// Parses and rejects an empty result, the `no segments` failure of
/// §4.5 step 1.
pub fn parse_srt_or_fail(content: &str) -> Result<Vec<SubtitleSegment>, SubtitleFormatError> {
    let segments = parse_srt(content);
    if segments.is_empty() {
        return Err(SubtitleFormatError::NoSegments);
    }
    Ok(segments)
}

/// Formats segments back into an SRT document. Byte-exact for any
/// document that round-tripped through `parse_srt` without losing
/// blocks, modulo the end-of-line whitespace normalisation called out
/// in §8.
pub fn format_srt(segments: &[SubtitleSegment]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push_str(&segment.index.to_string());
        out.push('\n');
        out.push_str(&segment.start);
        out.push_str(" --> ");
        out.push_str(&segment.end);
        out.push('\n');
        out.push_str(&segment.text);
        out.push_str("\n\n");
    }
    out
}
