//! Mismatch report types.

use std::fmt;

/// Characters of context around each segment in snippets.
pub const DEFAULT_CONTEXT_WINDOW: usize = 80;

/// How far (in characters, per side) the collector looks for a resync point.
pub const DEFAULT_LOOKAHEAD: usize = 64;

/// Segments materialized before the report is marked truncated.
pub const DEFAULT_MAX_SEGMENTS: usize = 50;

/// Tunables for [`build_mismatch_report_with`](crate::build_mismatch_report_with).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParityOptions {
    /// Snippet context in characters.
    pub context_window: usize,
    /// Resync search window in characters.
    pub lookahead: usize,
    /// Segment cap.
    pub max_segments: usize,
}

impl Default for ParityOptions {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            lookahead: DEFAULT_LOOKAHEAD,
            max_segments: DEFAULT_MAX_SEGMENTS,
        }
    }
}

/// One mismatched region.
///
/// Ranges are half-open byte ranges. Either side may be empty (pure
/// insertion or deletion), never both.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct Segment {
    /// Position of the segment in the report, starting at 0.
    pub index: usize,
    pub legacy_start: usize,
    pub legacy_end: usize,
    pub candidate_start: usize,
    pub candidate_end: usize,
    pub legacy_line: usize,
    pub legacy_column: usize,
    pub candidate_line: usize,
    pub candidate_column: usize,
    pub legacy_snippet: String,
    pub candidate_snippet: String,
}

/// Result of comparing two renders.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "camelCase")
)]
pub struct MismatchReport {
    /// First diverging byte offset, `None` (serialized as `-1`) on equality.
    #[cfg_attr(feature = "serde", serde(serialize_with = "serialize_index"))]
    pub index: Option<usize>,
    pub legacy_length: usize,
    pub candidate_length: usize,
    /// `candidate_length - legacy_length`.
    pub length_delta: i64,
    /// Total number of segments found, including those past the cap.
    pub segment_count: usize,
    /// Materialized segments, at most the cap.
    pub segments: Vec<Segment>,
    /// Whether segments were dropped because of the cap.
    pub truncated: bool,
}

impl MismatchReport {
    /// Whether both sides were identical.
    #[must_use]
    pub fn is_match(&self) -> bool {
        self.index.is_none()
    }
}

impl fmt::Display for MismatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(index) = self.index else {
            return write!(f, "renders match ({} bytes)", self.legacy_length);
        };
        write!(
            f,
            "renders differ at byte {index}: {} segment(s), legacy {} bytes, candidate {} bytes ({:+})",
            self.segment_count, self.legacy_length, self.candidate_length, self.length_delta
        )?;
        if self.truncated {
            write!(f, ", showing first {}", self.segments.len())?;
        }
        Ok(())
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} legacy {}:{} [{}..{}] vs candidate {}:{} [{}..{}]",
            self.index,
            self.legacy_line,
            self.legacy_column,
            self.legacy_start,
            self.legacy_end,
            self.candidate_line,
            self.candidate_column,
            self.candidate_start,
            self.candidate_end,
        )
    }
}

#[cfg(feature = "serde")]
#[allow(clippy::ref_option, clippy::cast_possible_wrap)]
fn serialize_index<S: serde::Serializer>(
    index: &Option<usize>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match index {
        Some(index) => serializer.serialize_i64(*index as i64),
        None => serializer.serialize_i64(-1),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::build_mismatch_report;

    #[test]
    fn test_headline_on_match() {
        let report = build_mismatch_report("<p>x</p>", "<p>x</p>");
        assert_eq!(report.to_string(), "renders match (8 bytes)");
    }

    #[test]
    fn test_headline_on_mismatch() {
        let report = build_mismatch_report("<p>x</p>", "<p>xy</p>");
        assert_eq!(
            report.to_string(),
            "renders differ at byte 4: 1 segment(s), legacy 8 bytes, candidate 9 bytes (+1)"
        );
    }

    #[test]
    fn test_segment_display() {
        let report = build_mismatch_report("ab\ncd", "ab\nxd");
        assert_eq!(
            report.segments[0].to_string(),
            "#0 legacy 2:1 [3..4] vs candidate 2:1 [3..4]"
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serialize_index_sentinel() {
        let report = build_mismatch_report("same", "same");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["index"], serde_json::json!(-1));
        assert_eq!(json["segmentCount"], serde_json::json!(0));

        let report = build_mismatch_report("abc", "abd");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["index"], serde_json::json!(2));
        assert_eq!(json["segments"][0]["legacySnippet"], serde_json::json!("abc"));
    }
}
