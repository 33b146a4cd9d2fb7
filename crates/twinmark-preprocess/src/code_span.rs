//! Inline code span detection, one line at a time.

use std::ops::Range;

/// Byte ranges of inline code spans on one line, backticks included.
///
/// A run of `n` backticks opens a span closed by the next run of exactly
/// `n` backticks. Unclosed runs are literal text.
pub(crate) fn code_span_ranges(line: &str) -> Vec<Range<usize>> {
    let bytes = line.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'`' {
            i += 1;
            continue;
        }

        let open_start = i;
        i = skip_run(bytes, i);
        let run = i - open_start;

        let mut k = i;
        while k < bytes.len() {
            if bytes[k] == b'`' {
                let close_start = k;
                k = skip_run(bytes, k);
                if k - close_start == run {
                    ranges.push(open_start..k);
                    i = k;
                    break;
                }
            } else {
                k += 1;
            }
        }
    }

    ranges
}

fn skip_run(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && bytes[i] == b'`' {
        i += 1;
    }
    i
}

/// Apply `f` to the parts of `line` outside inline code spans.
pub(crate) fn map_outside_code_spans(line: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last = 0;
    for range in code_span_ranges(line) {
        out.push_str(&f(&line[last..range.start]));
        out.push_str(&line[range.start..range.end]);
        last = range.end;
    }
    out.push_str(&f(&line[last..]));
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_single_span() {
        assert_eq!(code_span_ranges("a `b` c"), vec![2..5]);
    }

    #[test]
    fn test_double_backtick_span_contains_single() {
        assert_eq!(code_span_ranges("``a ` b`` c"), vec![0..9]);
    }

    #[test]
    fn test_unclosed_run_is_literal() {
        assert!(code_span_ranges("a ` b").is_empty());
        assert_eq!(code_span_ranges("`` a `b`"), vec![5..8]);
    }

    #[test]
    fn test_map_outside() {
        let mapped = map_outside_code_spans("x `x` x", |s| s.replace('x', "y"));
        assert_eq!(mapped, "y `x` y");
    }
}
