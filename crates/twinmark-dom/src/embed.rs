//! Host embed placeholders.
//!
//! Host engines emit `<span class="internal-embed">` placeholders for
//! embedded resources and resolve them asynchronously, adding
//! [`LOADED_CLASS`] once the content is in place.

use crate::kind::NodeKind;
use crate::node::Element;

/// Class marking an embed placeholder.
pub const EMBED_CLASS: &str = "internal-embed";

/// Class marking an image embed placeholder.
pub const IMAGE_EMBED_CLASS: &str = "image-embed";

/// Class added by the host once the embed is resolved.
pub const LOADED_CLASS: &str = "is-loaded";

/// Whether `el` is an embed placeholder (resolved or not).
#[must_use]
pub fn is_embed(el: &Element) -> bool {
    el.kind == NodeKind::Span && el.has_class(EMBED_CLASS)
}

/// Whether `el` is an embed placeholder the host has not resolved yet.
#[must_use]
pub fn is_unresolved_embed(el: &Element) -> bool {
    is_embed(el) && !el.has_class(LOADED_CLASS)
}

/// Number of unresolved embed placeholders below `root`.
#[must_use]
pub fn count_unresolved(root: &Element) -> usize {
    root.count(&is_unresolved_embed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_unresolved() {
        let root = Element::new(NodeKind::Div)
            .with_child(
                Element::new(NodeKind::Span).with_attr("class", "internal-embed image-embed"),
            )
            .with_child(
                Element::new(NodeKind::Span).with_attr("class", "internal-embed is-loaded"),
            )
            .with_child(Element::new(NodeKind::Span).with_attr("class", "other"));
        assert_eq!(count_unresolved(&root), 1);
    }
}
