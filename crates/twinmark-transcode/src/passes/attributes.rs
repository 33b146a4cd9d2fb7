//! Host-only attribute stripping and unsafe element removal.

use twinmark_dom::{Element, Node, NodeKind};

/// Classes code containers may keep.
const MATH_CLASSES: &[&str] = &["math", "math-inline", "math-block"];
const LANGUAGE_PREFIX: &str = "language-";

/// When an attribute pass runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    /// Before any rewriting: attributes later passes read still survive.
    Host,
    /// After styling: only what legacy markup itself carries survives.
    Final,
}

/// Whether an attribute survives on an element of `kind`.
fn is_allowed(kind: &NodeKind, name: &str, stage: Stage) -> bool {
    if name == "style" {
        return true;
    }
    match (kind, stage) {
        (NodeKind::Anchor, _) => name == "href",
        (NodeKind::Image, Stage::Host) => {
            matches!(name, "src" | "alt" | "width" | "height" | "class")
        }
        (NodeKind::Image, Stage::Final) => matches!(name, "src" | "alt" | "width" | "height"),
        (NodeKind::Code | NodeKind::Span | NodeKind::Div, Stage::Host)
        | (NodeKind::Span | NodeKind::Div, Stage::Final) => name == "class",
        (NodeKind::OrderedList, _) => name == "start",
        (NodeKind::TableHeaderCell | NodeKind::TableCell, Stage::Host) => name == "align",
        _ => false,
    }
}

fn is_allowed_class(class: &str, stage: Stage) -> bool {
    MATH_CLASSES.contains(&class) || (stage == Stage::Host && class.starts_with(LANGUAGE_PREFIX))
}

/// Drop `id`, `dir`, `data-*`, `aria-*` and every other attribute outside
/// the per-kind allow-list.
pub(crate) fn strip_host_attributes(root: &mut Element) {
    strip_attributes(root, Stage::Host);
}

/// Second strip after styling. Code blocks and figures are legacy markup
/// by now, so `language-*` classes, image classes and cell alignment go
/// too, along with anything an earlier pass reintroduced.
pub(crate) fn strip_final_attributes(root: &mut Element) {
    strip_attributes(root, Stage::Final);
}

fn strip_attributes(root: &mut Element, stage: Stage) {
    root.walk_mut(&mut |el: &mut Element| {
        let kind = el.kind.clone();
        el.retain_attrs(|name, _| is_allowed(&kind, &name.to_ascii_lowercase(), stage));

        if matches!(kind, NodeKind::Code | NodeKind::Span | NodeKind::Div) {
            let classes: Vec<&str> = el.classes().filter(|c| is_allowed_class(c, stage)).collect();
            if classes.is_empty() {
                el.remove_attr("class");
            } else {
                let joined = classes.join(" ");
                el.set_attr("class", joined);
            }
        }
    });
}

/// Remove elements that must never be published, with their content.
pub(crate) fn remove_unsafe(el: &mut Element) {
    el.children.retain(|child| {
        !matches!(child, Node::Element(inner) if inner.kind.is_unsafe())
    });
    for child in &mut el.children {
        if let Node::Element(inner) = child {
            remove_unsafe(inner);
        }
    }
}
