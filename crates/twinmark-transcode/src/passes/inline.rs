//! Inline normalization: strike-through spellings and typography.

use twinmark_dom::{Element, Node, NodeKind};
use twinmark_legacy::LegacyGenerator;

/// Rename `s`/`strike` to `del`, then merge a `del` ending in `:` with the
/// `del` right after it.
pub(crate) fn normalize_strikethrough(el: &mut Element) {
    for child in &mut el.children {
        if let Node::Element(inner) = child {
            if inner.kind.is_strike_alias() {
                inner.kind = NodeKind::Del;
            }
            normalize_strikethrough(inner);
        }
    }

    let children = std::mem::take(&mut el.children);
    for child in children {
        match child {
            Node::Element(next) if next.kind == NodeKind::Del => match el.children.last_mut() {
                Some(Node::Element(prev))
                    if prev.kind == NodeKind::Del && prev.text_content().ends_with(':') =>
                {
                    prev.children.extend(next.children);
                }
                _ => el.children.push(next.into()),
            },
            other => el.children.push(other),
        }
    }
}

fn skips_typography(el: &Element) -> bool {
    el.kind.is_literal_text() || el.kind == NodeKind::Anchor || el.has_class("math")
}

/// Run the legacy inline-text hook over text outside code, anchors and
/// math.
pub(crate) fn apply_typography(el: &mut Element, generator: &dyn LegacyGenerator) {
    let children = std::mem::take(&mut el.children);
    for child in children {
        match child {
            Node::Text(text) => el.children.extend(generator.render_inline_text(&text)),
            Node::Element(mut inner) => {
                if !skips_typography(&inner) {
                    apply_typography(&mut inner, generator);
                }
                el.children.push(inner.into());
            }
            raw @ Node::Raw(_) => el.children.push(raw),
        }
    }
}
