//! Soft-break to hard-break promotion.
//!
//! The legacy dialect renders every newline inside a paragraph as a line
//! break. `CommonMark` engines treat them as spaces unless the line ends
//! with two spaces or a backslash, so the markers are added here.

use std::sync::LazyLock;

use regex::Regex;

use crate::fence::{FenceTracker, is_opening_delimiter};

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}#{1,6}(?:\s|$)").unwrap());

static DIVIDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap());

static SETEXT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}(?:=+|-+)[ \t]*$").unwrap());

static LIST_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d{1,9}[.)])(?:[ \t]|$)").unwrap());

static CALLOUT_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:>\s*)+\[![\w-]+\][+-]?(?:[ \t]|$)").unwrap());

/// Append hard-break markers to lines that continue a paragraph.
pub fn promote_soft_breaks(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut tracker = FenceTracker::new();
    let mut out = String::with_capacity(text.len() + lines.len() * 2);

    for (n, line) in lines.iter().enumerate() {
        if n > 0 {
            out.push('\n');
        }
        let was_fenced = tracker.in_fence();
        let is_delimiter = tracker.update(line);
        if was_fenced || is_delimiter {
            out.push_str(line);
            continue;
        }

        let prev = n.checked_sub(1).and_then(|p| lines.get(p)).copied();
        match lines.get(n + 1).and_then(|next| break_marker(prev, line, next)) {
            Some(marker) => {
                out.push_str(line.trim_end_matches([' ', '\t']));
                out.push_str(marker);
            }
            None => out.push_str(line),
        }
    }

    out
}

/// Marker to append to `line` given the line after it, if any.
fn break_marker(prev: Option<&str>, line: &str, next: &str) -> Option<&'static str> {
    if line.trim().is_empty() || next.trim().is_empty() {
        return None;
    }
    if is_hard_broken(line) || is_opening_delimiter(next) {
        return None;
    }

    match (is_quote(line), is_quote(next)) {
        (true, true) => return quote_marker(prev, line, next),
        (true, false) | (false, true) => return None,
        (false, false) => {}
    }

    if starts_block(line) || starts_block(next) || is_setext_underline(next) {
        return None;
    }
    if LIST_ITEM_RE.is_match(next) {
        return None;
    }

    Some("  ")
}

fn quote_marker(prev: Option<&str>, line: &str, next: &str) -> Option<&'static str> {
    if opens_callout(prev, line) || opens_callout(Some(line), next) {
        return None;
    }
    if quote_content(line).is_empty() || quote_content(next).is_empty() {
        return None;
    }
    let content = quote_content(line);
    if content.ends_with('\\') || starts_block(content) || LIST_ITEM_RE.is_match(content) {
        return None;
    }
    Some("\\")
}

fn is_hard_broken(line: &str) -> bool {
    line.ends_with("  ") || line.ends_with('\\') || line.trim_end().ends_with("<br>")
}

fn is_quote(line: &str) -> bool {
    line.trim_start().starts_with('>')
}

/// Text after all leading `>` markers.
fn quote_content(line: &str) -> &str {
    line.trim_start()
        .trim_start_matches(|c: char| c == '>' || c.is_whitespace())
        .trim_end()
}

/// Whether `line` is the header of a callout rather than a paragraph line
/// that happens to start with `[!kind]`.
fn opens_callout(prev: Option<&str>, line: &str) -> bool {
    if !CALLOUT_MARKER_RE.is_match(line) {
        return false;
    }
    match prev {
        Some(prev) if is_quote(prev) => {
            quote_content(prev).is_empty() || quote_depth(line) > quote_depth(prev)
        }
        _ => true,
    }
}

fn quote_depth(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == '>' || c.is_whitespace())
        .filter(|c| *c == '>')
        .count()
}

fn is_setext_underline(line: &str) -> bool {
    SETEXT_RE.is_match(line)
}

/// Block constructs a paragraph line cannot continue into or out of.
fn starts_block(line: &str) -> bool {
    let trimmed = line.trim_start();
    HEADING_RE.is_match(line)
        || DIVIDER_RE.is_match(line)
        || trimmed.starts_with('|')
        || trimmed.starts_with('<')
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_paragraph_lines() {
        assert_eq!(promote_soft_breaks("one\ntwo\nthree"), "one  \ntwo  \nthree");
    }

    #[test]
    fn test_already_hard_broken() {
        assert_eq!(promote_soft_breaks("one  \ntwo"), "one  \ntwo");
        assert_eq!(promote_soft_breaks("one\\\ntwo"), "one\\\ntwo");
    }

    #[test]
    fn test_blank_line_separates() {
        assert_eq!(promote_soft_breaks("one\n\ntwo"), "one\n\ntwo");
    }

    #[test]
    fn test_headings_and_dividers() {
        assert_eq!(promote_soft_breaks("# Title\ntext"), "# Title\ntext");
        assert_eq!(promote_soft_breaks("text\n## Next"), "text\n## Next");
        assert_eq!(promote_soft_breaks("text\n***"), "text\n***");
    }

    #[test]
    fn test_setext_underline() {
        assert_eq!(promote_soft_breaks("Title\n====="), "Title\n=====");
        assert_eq!(promote_soft_breaks("Title\n---"), "Title\n---");
    }

    #[test]
    fn test_list_items() {
        // A list item may be continued, but a new item is not a continuation.
        assert_eq!(promote_soft_breaks("- a\n- b"), "- a\n- b");
        assert_eq!(promote_soft_breaks("- a\n  more"), "- a  \n  more");
        assert_eq!(promote_soft_breaks("1. a\n2. b"), "1. a\n2. b");
        assert_eq!(promote_soft_breaks("text\n- item"), "text\n- item");
    }

    #[test]
    fn test_table_and_raw_tags() {
        let table = "| a | b |\n|---|---|\n| 1 | 2 |";
        assert_eq!(promote_soft_breaks(table), table);
        assert_eq!(promote_soft_breaks("<div>\ntext"), "<div>\ntext");
    }

    #[test]
    fn test_fences_untouched() {
        let text = "before\n```\nx\ny\n```\nafter";
        assert_eq!(promote_soft_breaks(text), text);
        let math = "$$\na\nb\n$$";
        assert_eq!(promote_soft_breaks(math), math);
    }

    #[test]
    fn test_line_before_fence() {
        assert_eq!(promote_soft_breaks("text\n```\ncode\n```"), "text\n```\ncode\n```");
    }

    #[test]
    fn test_paired_quote_lines() {
        assert_eq!(promote_soft_breaks("> a\n> b"), "> a\\\n> b");
        assert_eq!(promote_soft_breaks("> a\n>\n> b"), "> a\n>\n> b");
    }

    #[test]
    fn test_callout_marker_not_broken() {
        assert_eq!(
            promote_soft_breaks("> [!tip] Tip\n> body\n> more"),
            "> [!tip] Tip\n> body\\\n> more"
        );
    }

    #[test]
    fn test_marker_inside_paragraph_is_broken() {
        assert_eq!(
            promote_soft_breaks("> a\n> [!note] b\n> c"),
            "> a\\\n> [!note] b\\\n> c"
        );
    }

    #[test]
    fn test_nested_callout_header() {
        let text = "> [!note]\n> > [!bug]\n> > x";
        assert_eq!(promote_soft_breaks(text), text);
    }

    #[test]
    fn test_quote_boundary() {
        assert_eq!(promote_soft_breaks("text\n> quote"), "text\n> quote");
        assert_eq!(promote_soft_breaks("> quote\ntext"), "> quote\ntext");
    }
}
