//! Text segmentation for synthesis dispatch.
//!
//! The synthesis backend accepts bounded requests, so the assembled article
//! text is partitioned into consecutive runs of up to a fixed number of
//! characters. Offsets are measured in characters, never bytes, so
//! multi-byte text is never split mid-character.

/// A bounded character span of the assembled article text, the unit of
/// synthesis dispatch. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Zero-based position of this segment in the original text.
    pub index: usize,
    /// The segment's character span.
    pub text: String,
}

/// Splits text into consecutive segments of up to `segment_len` characters.
///
/// Indices are contiguous starting at zero, and concatenating the segment
/// texts in index order reproduces the input exactly. Empty input yields no
/// segments; no trailing empty segment is ever produced.
pub fn split_into_segments(text: &str, segment_len: usize) -> Vec<Segment> {
    let segment_len = segment_len.max(1);
    let mut segments = Vec::new();
    let mut remaining = text;
    let mut index = 0;

    while !remaining.is_empty() {
        let end = remaining
            .char_indices()
            .nth(segment_len)
            .map(|(offset, _)| offset)
            .unwrap_or(remaining.len());
        segments.push(Segment { index, text: remaining[..end].to_string() });
        remaining = &remaining[end..];
        index += 1;
    }
    segments
}
