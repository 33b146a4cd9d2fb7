//! Parity gate for dual-path rendering.
//!
//! Compares the legacy and candidate markup of one render. Comparison is
//! exact: any normalization is the caller's job and happens before the
//! strings reach this crate.
//!
//! When the strings differ, [`build_mismatch_report`] walks both of them and
//! resynchronizes after every divergence, so a single inserted tag in a long
//! document produces one small segment instead of a garbled tail.
//!
//! # Example
//!
//! ```
//! use twinmark_parity::{build_mismatch_report, first_diverging_index, is_exact_match};
//!
//! let legacy = "<p>one</p><p>two</p>";
//! let candidate = "<p>one</p><p>tw0</p>";
//!
//! assert!(!is_exact_match(legacy, candidate));
//! assert_eq!(first_diverging_index(legacy, candidate), Some(15));
//!
//! let report = build_mismatch_report(legacy, candidate);
//! assert_eq!(report.segment_count, 1);
//! assert_eq!(report.segments[0].legacy_column, 16);
//! ```

mod report;
mod segments;

pub use report::{MismatchReport, ParityOptions, Segment};
pub use report::{DEFAULT_CONTEXT_WINDOW, DEFAULT_LOOKAHEAD, DEFAULT_MAX_SEGMENTS};

/// Plain equality, no normalization.
#[must_use]
pub fn is_exact_match(legacy: &str, candidate: &str) -> bool {
    legacy == candidate
}

/// Byte offset of the first character that differs.
///
/// If one string is a prefix of the other, the offset is the length of the
/// shorter one. Returns `None` when both strings are identical. The offset
/// is always on a character boundary of both strings.
#[must_use]
pub fn first_diverging_index(legacy: &str, candidate: &str) -> Option<usize> {
    let mut left = legacy.char_indices();
    let mut right = candidate.chars();
    loop {
        match (left.next(), right.next()) {
            (Some((offset, a)), Some(b)) => {
                if a != b {
                    return Some(offset);
                }
            }
            (Some((offset, _)), None) => return Some(offset),
            (None, Some(_)) => return Some(legacy.len()),
            (None, None) => return None,
        }
    }
}

/// Build a mismatch report with [`ParityOptions::default`].
#[must_use]
pub fn build_mismatch_report(legacy: &str, candidate: &str) -> MismatchReport {
    build_mismatch_report_with(legacy, candidate, &ParityOptions::default())
}

/// Build a mismatch report with explicit options.
#[must_use]
pub fn build_mismatch_report_with(
    legacy: &str,
    candidate: &str,
    options: &ParityOptions,
) -> MismatchReport {
    let index = first_diverging_index(legacy, candidate);
    let (segments, segment_count) = if index.is_some() {
        segments::collect(legacy, candidate, options)
    } else {
        (Vec::new(), 0)
    };

    MismatchReport {
        index,
        legacy_length: legacy.len(),
        candidate_length: candidate.len(),
        length_delta: length_delta(legacy.len(), candidate.len()),
        truncated: segment_count > segments.len(),
        segment_count,
        segments,
    }
}

#[allow(clippy::cast_possible_wrap)]
fn length_delta(legacy: usize, candidate: usize) -> i64 {
    candidate as i64 - legacy as i64
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLES: &[&str] = &[
        "",
        "a",
        "<section>ok</section>",
        "line one\nline two\n",
        "内容 with ünïcödé 💡",
    ];

    #[test]
    fn test_identity() {
        for s in SAMPLES {
            assert!(is_exact_match(s, s));
            assert_eq!(first_diverging_index(s, s), None);
            let report = build_mismatch_report(s, s);
            assert!(report.is_match());
            assert_eq!(report.segment_count, 0);
            assert!(!report.truncated);
        }
    }

    #[test]
    fn test_report_index_none_iff_equal() {
        for a in SAMPLES {
            for b in SAMPLES {
                let report = build_mismatch_report(a, b);
                assert_eq!(report.index.is_none(), a == b, "{a:?} vs {b:?}");
                assert_eq!(report.segment_count == 0, a == b);
            }
        }
    }

    #[test]
    fn test_first_diverging_index_prefix() {
        assert_eq!(first_diverging_index("abc", "abcdef"), Some(3));
        assert_eq!(first_diverging_index("abcdef", "abc"), Some(3));
        assert_eq!(first_diverging_index("", "x"), Some(0));
    }

    #[test]
    fn test_first_diverging_index_multibyte() {
        // "é" and "è" share their first UTF-8 byte; the offset stays on a boundary.
        assert_eq!(first_diverging_index("caé", "caè"), Some(2));
        assert_eq!(first_diverging_index("内容a", "内容b"), Some(6));
    }

    #[test]
    fn test_scenario_legacy_vs_native() {
        let report = build_mismatch_report("<section>legacy</section>", "<section>native</section>");
        assert_eq!(report.index, Some(9));
        assert_eq!(report.legacy_length, 25);
        assert_eq!(report.candidate_length, 25);
        assert_eq!(report.length_delta, 0);
        assert!(report.segment_count >= 1);
    }

    #[test]
    fn test_length_delta_sign() {
        let report = build_mismatch_report("abc", "abcd");
        assert_eq!(report.length_delta, 1);
        let report = build_mismatch_report("abcd", "abc");
        assert_eq!(report.length_delta, -1);
    }
}
