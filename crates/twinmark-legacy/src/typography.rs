//! Typographic substitution and bare-URL autolinking.

use std::sync::LazyLock;

use regex::Regex;
use twinmark_dom::{Element, Node, NodeKind};

static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s<>"“”‘’]+"#).unwrap());

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\''];

/// Render a plain text run: bare URLs become anchors, the rest gets
/// typographic punctuation.
#[must_use]
pub fn render_inline_text(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    let mut last = 0;
    let mut prev = None;

    for m in BARE_URL_RE.find_iter(text) {
        let url = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        if url.len() <= "https://".len() {
            continue;
        }
        let before = &text[last..m.start()];
        if !before.is_empty() {
            nodes.push(Node::text(smarten(before, prev)));
        }
        nodes.push(
            Element::new(NodeKind::Anchor)
                .with_attr("href", url)
                .with_text(url)
                .into(),
        );
        last = m.start() + url.len();
        prev = url.chars().last();
    }

    let rest = &text[last..];
    if !rest.is_empty() {
        nodes.push(Node::text(smarten(rest, prev)));
    }
    nodes
}

/// Replace dashes, ellipses and straight quotes.
///
/// `prev` is the character preceding `text`, used to pick the direction of
/// a leading quote.
#[must_use]
pub fn smarten(text: &str, prev: Option<char>) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut prev = prev;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let replacement = match c {
            '-' if chars.get(i + 1) == Some(&'-') => {
                if chars.get(i + 2) == Some(&'-') {
                    i += 2;
                    '—'
                } else {
                    i += 1;
                    '–'
                }
            }
            '.' if chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') => {
                i += 2;
                '…'
            }
            '"' => {
                if opens_quote(prev) {
                    '“'
                } else {
                    '”'
                }
            }
            '\'' => {
                if opens_quote(prev) {
                    '‘'
                } else {
                    '’'
                }
            }
            other => other,
        };
        out.push(replacement);
        prev = Some(replacement);
        i += 1;
    }
    out
}

fn opens_quote(prev: Option<char>) -> bool {
    match prev {
        None => true,
        Some(c) => c.is_whitespace() || matches!(c, '(' | '[' | '{' | '–' | '—' | '“' | '‘'),
    }
}
