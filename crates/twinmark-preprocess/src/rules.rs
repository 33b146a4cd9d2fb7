//! Single-purpose rewrite rules.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::{Captures, Regex};

use crate::code_span::map_outside_code_spans;
use crate::fence::{FenceTracker, map_lines_outside_fences};

/// Characters encoded in rewritten image destinations. Non-ASCII is always
/// encoded.
const DESTINATION_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'(')
    .add(b')')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b']')
    .add(b'`')
    .add(b'{')
    .add(b'}');

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "svg", "webp", "avif", "ico", "tif", "tiff",
];

static IMAGE_EMBED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\]|\n]+?)(?:\|([^\]\n]*))?\]\]").unwrap());

static SIZE_HINT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(?:x\d+)?$").unwrap());

static UNSAFE_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(!?)\[[^\]\n]*\]\(\s*<?\s*(?:javascript|vbscript):[^)\n]*\)").unwrap()
});

static WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\[\]\n]+?)\]\]").unwrap());

/// Strip leading whitespace before `$$` markers outside code fences.
///
/// Math content between the markers is left alone.
pub fn strip_math_fence_indent(text: &str) -> String {
    let mut tracker = FenceTracker::new();
    let mut out = String::with_capacity(text.len());
    for (n, line) in text.split('\n').enumerate() {
        if n > 0 {
            out.push('\n');
        }
        let was_in_code = tracker.in_code_fence();
        tracker.update(line);
        let trimmed = line.trim_start();
        if !was_in_code && !tracker.in_code_fence() && trimmed.starts_with("$$") {
            out.push_str(trimmed);
        } else {
            out.push_str(line);
        }
    }
    out
}

/// Rewrite `![[image.png|alt]]` embeds into standard image syntax.
///
/// Only image files are rewritten; other embeds stay as they are. Size
/// hints such as `|300` or `|300x200` are dropped from the alt text.
pub fn rewrite_image_embeds(text: &str) -> String {
    map_lines_outside_fences(text, |line| {
        map_outside_code_spans(line, |part| {
            IMAGE_EMBED_RE
                .replace_all(part, |caps: &Captures<'_>| {
                    let path = caps[1].trim();
                    if !has_image_extension(path) {
                        return caps[0].to_owned();
                    }
                    let alt = caps.get(2).map_or("", |m| m.as_str());
                    format!(
                        "![{}]({})",
                        strip_size_hints(alt),
                        utf8_percent_encode(path, DESTINATION_ENCODE_SET)
                    )
                })
                .into_owned()
        })
    })
}

fn has_image_extension(path: &str) -> bool {
    path.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext))
    })
}

fn strip_size_hints(alt: &str) -> String {
    alt.split('|')
        .map(str::trim)
        .filter(|part| !part.is_empty() && !SIZE_HINT_RE.is_match(part))
        .collect::<Vec<_>>()
        .join("|")
}

/// Escape links whose target uses `javascript:` or `vbscript:`.
///
/// The whole link construct is prefixed with `\` so it renders as text.
/// Images and already-escaped links are left alone.
pub fn escape_unsafe_links(text: &str) -> String {
    map_lines_outside_fences(text, |line| {
        map_outside_code_spans(line, |part| {
            let mut out = String::with_capacity(part.len());
            let mut last = 0;
            for caps in UNSAFE_LINK_RE.captures_iter(part) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                let is_image = !caps[1].is_empty();
                let escaped = part[..whole.start()].ends_with('\\');
                out.push_str(&part[last..whole.start()]);
                if !is_image && !escaped {
                    tracing::debug!(link = whole.as_str(), "Escaping unsafe link");
                    out.push('\\');
                }
                out.push_str(whole.as_str());
                last = whole.end();
            }
            out.push_str(&part[last..]);
            out
        })
    })
}

/// Escape `[[Target]]` outside code spans and fences.
pub fn escape_wikilinks(text: &str) -> String {
    map_lines_outside_fences(text, |line| {
        map_outside_code_spans(line, |part| {
            let mut out = String::with_capacity(part.len() + 8);
            let mut last = 0;
            for caps in WIKILINK_RE.captures_iter(part) {
                let Some(whole) = caps.get(0) else {
                    continue;
                };
                out.push_str(&part[last..whole.start()]);
                if part[..whole.start()].ends_with('\\') {
                    out.push_str(whole.as_str());
                } else {
                    out.push_str(r"\[\[");
                    out.push_str(&caps[1]);
                    out.push_str(r"\]\]");
                }
                last = whole.end();
            }
            out.push_str(&part[last..]);
            out
        })
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_strip_math_fence_indent() {
        assert_eq!(strip_math_fence_indent("   $$\nx+y\n$$"), "$$\nx+y\n$$");
    }

    #[test]
    fn test_strip_math_fence_indent_keeps_content() {
        assert_eq!(
            strip_math_fence_indent("  $$\n  x + y\n  $$"),
            "$$\n  x + y\n$$"
        );
    }

    #[test]
    fn test_strip_math_fence_indent_skips_code() {
        let text = "```\n   $$\n```";
        assert_eq!(strip_math_fence_indent(text), text);
    }

    #[test]
    fn test_rewrite_image_embed() {
        assert_eq!(
            rewrite_image_embeds("see ![[assets/my pic.png|A cat]] here"),
            "see ![A cat](assets/my%20pic.png) here"
        );
    }

    #[test]
    fn test_rewrite_image_embed_drops_size_hint() {
        assert_eq!(rewrite_image_embeds("![[a.png|300]]"), "![](a.png)");
        assert_eq!(rewrite_image_embeds("![[a.png|300x200]]"), "![](a.png)");
        assert_eq!(rewrite_image_embeds("![[a.png|Cat|300]]"), "![Cat](a.png)");
    }

    #[test]
    fn test_rewrite_image_embed_encodes_non_ascii() {
        assert_eq!(
            rewrite_image_embeds("![[图片.png]]"),
            "![](%E5%9B%BE%E7%89%87.png)"
        );
    }

    #[test]
    fn test_non_image_embed_untouched() {
        assert_eq!(rewrite_image_embeds("![[notes.md]]"), "![[notes.md]]");
    }

    #[test]
    fn test_embed_in_code_untouched() {
        assert_eq!(rewrite_image_embeds("`![[a.png]]`"), "`![[a.png]]`");
        let fenced = "```\n![[a.png]]\n```";
        assert_eq!(rewrite_image_embeds(fenced), fenced);
    }

    #[test]
    fn test_escape_unsafe_links() {
        assert_eq!(
            escape_unsafe_links("[x](javascript:alert(1)"),
            r"\[x](javascript:alert(1)"
        );
        assert_eq!(
            escape_unsafe_links("a [x](VBScript:msgbox) b"),
            r"a \[x](VBScript:msgbox) b"
        );
    }

    #[test]
    fn test_escape_unsafe_links_skips_images_and_escaped() {
        let image = "![x](javascript:alert)";
        assert_eq!(escape_unsafe_links(image), image);
        let escaped = r"\[x](javascript:alert)";
        assert_eq!(escape_unsafe_links(escaped), escaped);
    }

    #[test]
    fn test_safe_link_untouched() {
        let text = "[x](https://example.com)";
        assert_eq!(escape_unsafe_links(text), text);
    }

    #[test]
    fn test_escape_wikilinks() {
        assert_eq!(escape_wikilinks("see [[Target]]"), r"see \[\[Target\]\]");
    }

    #[test]
    fn test_escape_wikilinks_outside_code() {
        assert_eq!(
            escape_wikilinks("`[[code]]` and [[link]]"),
            r"`[[code]]` and \[\[link\]\]"
        );
        let fenced = "~~~\n[[a]]\n~~~\n$$\n[[b]]\n$$";
        assert_eq!(escape_wikilinks(fenced), fenced);
    }

    #[test]
    fn test_escape_wikilinks_is_idempotent() {
        let once = escape_wikilinks("[[Target]]");
        assert_eq!(escape_wikilinks(&once), once);
    }
}
