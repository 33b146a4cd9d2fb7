//! Link and image target validation.

use twinmark_dom::{Element, Node, NodeKind};
use twinmark_legacy::LegacyGenerator;
use twinmark_legacy::url::canonicalize;

/// Validate every anchor and image target with the legacy validator.
///
/// Rejected anchors are unwrapped to their content, rejected images are
/// removed. Accepted targets are canonicalized.
pub(crate) fn validate_urls(el: &mut Element, generator: &dyn LegacyGenerator) {
    let children = std::mem::take(&mut el.children);
    for child in children {
        let Node::Element(mut inner) = child else {
            el.children.push(child);
            continue;
        };
        validate_urls(&mut inner, generator);

        match inner.kind {
            NodeKind::Anchor => {
                let target = inner
                    .attr("href")
                    .and_then(|href| generator.validate_link(href, false));
                match target {
                    Some(href) => {
                        let href = canonicalize(&href).into_owned();
                        inner.set_attr("href", href);
                        el.children.push(inner.into());
                    }
                    None => {
                        tracing::debug!(href = ?inner.attr("href"), "Unwrapped rejected link");
                        el.children.extend(inner.children);
                    }
                }
            }
            NodeKind::Image => {
                let target = inner
                    .attr("src")
                    .and_then(|src| generator.validate_link(src, true));
                if let Some(src) = target {
                    let src = canonicalize(&src).into_owned();
                    inner.set_attr("src", src);
                    el.children.push(inner.into());
                } else {
                    tracing::debug!(src = ?inner.attr("src"), "Removed rejected image");
                }
            }
            _ => el.children.push(inner.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use twinmark_dom::inner_html;
    use twinmark_legacy::StyledGenerator;

    use super::*;

    fn anchor(href: &str, text: &str) -> Element {
        Element::new(NodeKind::Anchor)
            .with_attr("href", href)
            .with_text(text)
    }

    #[test]
    fn test_rejected_anchor_unwrapped() {
        let generator = StyledGenerator::default();
        let mut root =
            Element::new(NodeKind::Paragraph).with_child(anchor("javascript:alert(1)", "click"));
        validate_urls(&mut root, &generator);
        assert_eq!(inner_html(&root), "click");
    }

    #[test]
    fn test_rejected_image_removed() {
        let generator = StyledGenerator::default();
        let mut root = Element::new(NodeKind::Paragraph)
            .with_text("a")
            .with_child(Element::new(NodeKind::Image).with_attr("src", "data:text/html,x"));
        validate_urls(&mut root, &generator);
        assert_eq!(inner_html(&root), "a");
    }

    #[test]
    fn test_non_ascii_relative_encoded() {
        let generator = StyledGenerator::default();
        let mut root = Element::new(NodeKind::Paragraph).with_child(anchor("笔记/页.md", "x"));
        validate_urls(&mut root, &generator);
        assert_eq!(
            inner_html(&root),
            r#"<a href="%E7%AC%94%E8%AE%B0/%E9%A1%B5.md">x</a>"#
        );
    }

    #[test]
    fn test_anchor_without_href_unwrapped() {
        let generator = StyledGenerator::default();
        let mut root = Element::new(NodeKind::Paragraph)
            .with_child(Element::new(NodeKind::Anchor).with_text("bare"));
        validate_urls(&mut root, &generator);
        assert_eq!(inner_html(&root), "bare");
    }
}
