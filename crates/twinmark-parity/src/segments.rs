//! Resynchronizing segment collector.

use crate::report::{ParityOptions, Segment};

/// One side of the comparison, indexed by character.
struct Side<'a> {
    text: &'a str,
    chars: Vec<char>,
    /// Byte offset of every character, plus `text.len()` at the end.
    offsets: Vec<usize>,
}

impl<'a> Side<'a> {
    fn new(text: &'a str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len() + 1);
        for (offset, c) in text.char_indices() {
            chars.push(c);
            offsets.push(offset);
        }
        offsets.push(text.len());
        Self {
            text,
            chars,
            offsets,
        }
    }

    fn len(&self) -> usize {
        self.chars.len()
    }

    fn at(&self, i: usize) -> Option<char> {
        self.chars.get(i).copied()
    }

    /// 1-based line and column of character `i`.
    fn position(&self, i: usize) -> (usize, usize) {
        let prefix = &self.chars[..i];
        let line = prefix.iter().filter(|&&c| c == '\n').count() + 1;
        let column = match prefix.iter().rposition(|&c| c == '\n') {
            Some(newline) => i - newline,
            None => i + 1,
        };
        (line, column)
    }

    fn snippet(&self, start: usize, end: usize, window: usize) -> &'a str {
        let half = window / 2;
        let from = start.saturating_sub(half);
        let to = (end.min(start + window) + half).min(self.len());
        &self.text[self.offsets[from]..self.offsets[to]]
    }
}

/// Character ranges of one divergence.
struct Span {
    legacy: (usize, usize),
    candidate: (usize, usize),
}

/// Collect mismatch segments; returns the materialized segments and the
/// total count.
pub(crate) fn collect(legacy: &str, candidate: &str, options: &ParityOptions) -> (Vec<Segment>, usize) {
    let a = Side::new(legacy);
    let b = Side::new(candidate);
    let mut segments = Vec::new();
    let mut count = 0;

    let (mut i, mut j) = (0, 0);
    loop {
        while i < a.len() && j < b.len() && a.chars[i] == b.chars[j] {
            i += 1;
            j += 1;
        }
        if i == a.len() && j == b.len() {
            break;
        }

        let span = match find_resync(&a, &b, i, j, options.lookahead) {
            Some((ri, rj)) => Span {
                legacy: (i, ri),
                candidate: (j, rj),
            },
            None => Span {
                legacy: (i, a.len()),
                candidate: (j, b.len()),
            },
        };

        if segments.len() < options.max_segments {
            segments.push(materialize(&a, &b, &span, count, options.context_window));
        }
        count += 1;
        i = span.legacy.1;
        j = span.candidate.1;
    }

    (segments, count)
}

/// Nearest `(i', j')` where both sides agree again, ordered by total
/// distance. A resync point needs two agreeing characters, or one agreeing
/// final character on both sides, or both sides exhausted.
fn find_resync(a: &Side<'_>, b: &Side<'_>, i: usize, j: usize, lookahead: usize) -> Option<(usize, usize)> {
    for distance in 1..=lookahead * 2 {
        let low = distance.saturating_sub(lookahead);
        let high = distance.min(lookahead);
        for di in low..=high {
            let (ri, rj) = (i + di, j + distance - di);
            if ri > a.len() || rj > b.len() {
                continue;
            }
            if is_resync_point(a, b, ri, rj) {
                return Some((ri, rj));
            }
        }
    }
    None
}

fn is_resync_point(a: &Side<'_>, b: &Side<'_>, ri: usize, rj: usize) -> bool {
    if ri == a.len() && rj == b.len() {
        return true;
    }
    match (a.at(ri), b.at(rj)) {
        (Some(x), Some(y)) if x == y => match (a.at(ri + 1), b.at(rj + 1)) {
            (Some(x), Some(y)) => x == y,
            (None, None) => true,
            _ => false,
        },
        _ => false,
    }
}

fn materialize(a: &Side<'_>, b: &Side<'_>, span: &Span, index: usize, window: usize) -> Segment {
    let (legacy_line, legacy_column) = a.position(span.legacy.0);
    let (candidate_line, candidate_column) = b.position(span.candidate.0);
    Segment {
        index,
        legacy_start: a.offsets[span.legacy.0],
        legacy_end: a.offsets[span.legacy.1],
        candidate_start: b.offsets[span.candidate.0],
        candidate_end: b.offsets[span.candidate.1],
        legacy_line,
        legacy_column,
        candidate_line,
        candidate_column,
        legacy_snippet: a.snippet(span.legacy.0, span.legacy.1, window).to_owned(),
        candidate_snippet: b.snippet(span.candidate.0, span.candidate.1, window).to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::{ParityOptions, build_mismatch_report, build_mismatch_report_with};

    /// Rebuild both inputs from the shared stretches and the segments.
    fn rebuild(legacy: &str, candidate: &str) -> (String, String) {
        let report = build_mismatch_report(legacy, candidate);
        assert!(!report.truncated);
        let (mut left, mut right) = (String::new(), String::new());
        let (mut li, mut ci) = (0, 0);
        for seg in &report.segments {
            let shared_left = &legacy[li..seg.legacy_start];
            let shared_right = &candidate[ci..seg.candidate_start];
            assert_eq!(shared_left, shared_right);
            left.push_str(shared_left);
            right.push_str(shared_right);
            left.push_str(&legacy[seg.legacy_start..seg.legacy_end]);
            right.push_str(&candidate[seg.candidate_start..seg.candidate_end]);
            li = seg.legacy_end;
            ci = seg.candidate_end;
        }
        assert_eq!(&legacy[li..], &candidate[ci..]);
        left.push_str(&legacy[li..]);
        right.push_str(&candidate[ci..]);
        (left, right)
    }

    #[test]
    fn test_segments_cover_all_divergences() {
        let cases = [
            ("<p>one</p><p>two</p>", "<p>one</p><p>tw0</p>"),
            ("<p>a</p>\n<p>b</p>\n<p>c</p>", "<p>A</p>\n<p>b</p>\n<p>C</p>"),
            ("prefix", "prefix and more"),
            ("long tail removed", "long"),
            ("", "inserted"),
            ("héllo wörld", "hello world"),
        ];
        for (legacy, candidate) in cases {
            let (left, right) = rebuild(legacy, candidate);
            assert_eq!(left, legacy);
            assert_eq!(right, candidate);
        }
    }

    #[test]
    fn test_single_insertion_reports_offset() {
        let legacy = "<section><p>body</p></section>";
        let candidate = "<section><p>bo!dy</p></section>";
        let report = build_mismatch_report(legacy, candidate);
        assert_eq!(report.index, Some(14));
        assert_eq!(report.segment_count, 1);
        let seg = &report.segments[0];
        assert_eq!((seg.legacy_start, seg.legacy_end), (14, 14));
        assert_eq!((seg.candidate_start, seg.candidate_end), (14, 15));
    }

    #[test]
    fn test_two_regions_two_segments() {
        let legacy = "<p>alpha</p><p>beta</p><p>gamma</p>";
        let candidate = "<p>alphA</p><p>beta</p><p>gammA</p>";
        let report = build_mismatch_report(legacy, candidate);
        assert_eq!(report.segment_count, 2);
        assert_eq!(report.segments[0].index, 0);
        assert_eq!(report.segments[1].index, 1);
        assert_eq!(report.segments[1].legacy_start, 30);
    }

    #[test]
    fn test_line_and_column() {
        let legacy = "line one\nline two\nline three";
        let candidate = "line one\nline 2\nline three";
        let report = build_mismatch_report(legacy, candidate);
        let seg = &report.segments[0];
        assert_eq!((seg.legacy_line, seg.legacy_column), (2, 6));
        assert_eq!((seg.candidate_line, seg.candidate_column), (2, 6));
    }

    #[test]
    fn test_column_counts_characters() {
        let report = build_mismatch_report("ééx", "ééy");
        let seg = &report.segments[0];
        assert_eq!(seg.legacy_start, 4);
        assert_eq!(seg.legacy_column, 3);
    }

    #[test]
    fn test_truncation_counts_all_segments() {
        let legacy: String = (0..10).map(|n| format!("<p>item {n}</p>")).collect();
        let candidate = legacy.replace("item", "itex");
        let options = ParityOptions {
            max_segments: 3,
            ..ParityOptions::default()
        };
        let report = build_mismatch_report_with(&legacy, &candidate, &options);
        assert_eq!(report.segment_count, 10);
        assert_eq!(report.segments.len(), 3);
        assert!(report.truncated);

        let report = build_mismatch_report(&legacy, &candidate);
        assert_eq!(report.segments.len(), 10);
        assert!(!report.truncated);
    }

    #[test]
    fn test_no_resync_yields_one_tail_segment() {
        let legacy = "same start: aaaaaaaaaaaaaaaaaaaa";
        let candidate = "same start: bbbbbbbbbbbbbbbbbbbbbbbbb";
        let options = ParityOptions {
            lookahead: 4,
            ..ParityOptions::default()
        };
        let report = build_mismatch_report_with(legacy, candidate, &options);
        assert_eq!(report.segment_count, 1);
        let seg = &report.segments[0];
        assert_eq!(seg.legacy_end, legacy.len());
        assert_eq!(seg.candidate_end, candidate.len());
    }

    #[test]
    fn test_snippets_are_bounded() {
        let body = "x".repeat(500);
        let legacy = format!("{body}A{body}");
        let candidate = format!("{body}B{body}");
        let options = ParityOptions {
            context_window: 20,
            ..ParityOptions::default()
        };
        let report = build_mismatch_report_with(&legacy, &candidate, &options);
        let seg = &report.segments[0];
        assert_eq!(seg.legacy_snippet, format!("{}A{}", "x".repeat(10), "x".repeat(10)));
        assert_eq!(seg.candidate_snippet, format!("{}B{}", "x".repeat(10), "x".repeat(10)));
    }
}
