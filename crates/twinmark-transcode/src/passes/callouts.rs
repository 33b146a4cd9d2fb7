//! Host callouts to legacy callout sections.

use twinmark_dom::{Element, Node, NodeKind};
use twinmark_legacy::{CalloutInfo, LegacyGenerator};

const CALLOUT_CLASS: &str = "callout";
const KIND_ATTR: &str = "data-callout";
const TITLE_INNER_CLASS: &str = "callout-title-inner";
const CONTENT_CLASS: &str = "callout-content";

fn is_callout(el: &Element) -> bool {
    el.kind == NodeKind::Div && el.has_class(CALLOUT_CLASS) && el.attr(KIND_ATTR).is_some()
}

/// Splice every host callout into legacy open markup, its content, and
/// close markup. Nested callouts are converted first.
pub(crate) fn convert_callouts(el: &mut Element, generator: &dyn LegacyGenerator) {
    let children = std::mem::take(&mut el.children);
    for child in children {
        match child {
            Node::Element(mut child) => {
                convert_callouts(&mut child, generator);
                if is_callout(&child) {
                    el.children.extend(splice(child, generator));
                } else {
                    el.children.push(child.into());
                }
            }
            other => el.children.push(other),
        }
    }
}

fn splice(callout: Element, generator: &dyn LegacyGenerator) -> Vec<Node> {
    let kind = callout.attr(KIND_ATTR).unwrap_or_default();
    let title = callout
        .find(&|el| el.has_class(TITLE_INNER_CLASS))
        .map(Element::text_content);
    let info = CalloutInfo::new(kind, title.as_deref());

    let body = callout
        .children
        .into_iter()
        .filter_map(|node| match node {
            Node::Element(el) if el.has_class(CONTENT_CLASS) => Some(el.children),
            _ => None,
        })
        .flatten();

    let mut nodes = vec![Node::raw(generator.render_callout_open(&info))];
    nodes.extend(body);
    nodes.push(Node::raw(generator.render_callout_close(&info)));
    nodes
}

#[cfg(test)]
mod tests {
    use twinmark_dom::inner_html;
    use twinmark_legacy::StyledGenerator;

    use super::*;

    fn host_callout(kind: &str, title: &str, body: Vec<Node>) -> Element {
        Element::new(NodeKind::Div)
            .with_attr("class", "callout")
            .with_attr("data-callout", kind)
            .with_attr("data-callout-fold", "")
            .with_child(
                Element::new(NodeKind::Div)
                    .with_attr("class", "callout-title")
                    .with_child(Element::new(NodeKind::Div).with_attr("class", "callout-icon"))
                    .with_child(
                        Element::new(NodeKind::Div)
                            .with_attr("class", "callout-title-inner")
                            .with_text(title),
                    ),
            )
            .with_child(
                Element::new(NodeKind::Div)
                    .with_attr("class", "callout-content")
                    .with_children(body),
            )
    }

    #[test]
    fn test_tip_callout_spliced() {
        let generator = StyledGenerator::default();
        let mut root = Element::new(NodeKind::Div).with_child(host_callout(
            "tip",
            "Try this",
            vec![Element::new(NodeKind::Paragraph).with_text("Body").into()],
        ));
        convert_callouts(&mut root, &generator);

        let html = inner_html(&root);
        assert!(html.contains("tm-admonition-tip"), "{html}");
        assert!(html.contains("💡"));
        assert!(html.contains("Try this"));
        assert!(html.contains("<p>Body</p>"));
        assert!(!html.contains("callout"), "{html}");
    }

    #[test]
    fn test_nested_callouts_deepest_first() {
        let generator = StyledGenerator::default();
        let inner = host_callout("warning", "", vec![Node::text("deep")]);
        let mut root = Element::new(NodeKind::Div)
            .with_child(host_callout("note", "", vec![inner.into()]));
        convert_callouts(&mut root, &generator);

        let html = inner_html(&root);
        assert!(html.find("tm-admonition-note") < html.find("tm-admonition-warning"));
        assert!(html.contains("deep"));
        assert!(!html.contains("callout"), "{html}");
        assert_eq!(root.children.len(), 5);
    }

    #[test]
    fn test_unknown_kind_uses_fallback_icon() {
        let generator = StyledGenerator::default();
        let mut root =
            Element::new(NodeKind::Div).with_child(host_callout("recipe", "", Vec::new()));
        convert_callouts(&mut root, &generator);
        assert!(inner_html(&root).contains(twinmark_legacy::FALLBACK_ICON));
    }
}
