//! Edge whitespace in block-level text.

use twinmark_dom::{Element, Node};

const EDGE_WHITESPACE: &[char] = &[' ', '\t', '\u{a0}'];

/// Trim space, tab and NBSP runs at the edges of block-level elements and
/// drop text nodes left empty. Math blocks keep their content verbatim.
pub(crate) fn trim_block_text(el: &mut Element) {
    for child in &mut el.children {
        if let Node::Element(inner) = child {
            trim_block_text(inner);
        }
    }

    if el.kind.is_block() && !el.has_class("math") {
        if let Some(Node::Text(first)) = el.children.first_mut() {
            let trimmed = first.trim_start_matches(EDGE_WHITESPACE);
            if trimmed.len() != first.len() {
                *first = trimmed.to_owned();
            }
        }
        if let Some(Node::Text(last)) = el.children.last_mut() {
            let trimmed = last.trim_end_matches(EDGE_WHITESPACE).len();
            last.truncate(trimmed);
        }
    }

    el.children
        .retain(|child| !matches!(child, Node::Text(text) if text.is_empty()));
}
