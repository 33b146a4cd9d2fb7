//! Embed placeholders to images.

use twinmark_dom::embed::{LOADED_CLASS, is_embed};
use twinmark_dom::{Element, Node, NodeKind};

/// Size and alt hints inherited from enclosing nodes.
#[derive(Clone, Default)]
struct Hints {
    width: Option<String>,
    alt: Option<String>,
}

impl Hints {
    fn extend(&self, el: &Element) -> Self {
        Self {
            width: el
                .attr("width")
                .map(str::to_owned)
                .or_else(|| self.width.clone()),
            alt: el
                .attr("alt")
                .map(str::to_owned)
                .or_else(|| self.alt.clone()),
        }
    }
}

/// Replace every embed placeholder with an image.
///
/// Resolved placeholders are unwrapped to the image the host put inside;
/// unresolved ones become an image built from their `src`, or disappear
/// when they have none.
pub(crate) fn materialize_embeds(root: &mut Element) {
    materialize(root, &Hints::default());
}

fn materialize(el: &mut Element, inherited: &Hints) {
    let hints = inherited.extend(el);
    let children = std::mem::take(&mut el.children);
    for child in children {
        match child {
            Node::Element(embed) if is_embed(&embed) => {
                let hints = hints.extend(&embed);
                el.children.extend(resolve(embed, &hints));
            }
            Node::Element(mut child) => {
                materialize(&mut child, &hints);
                el.children.push(child.into());
            }
            other => el.children.push(other),
        }
    }
}

fn resolve(embed: Element, hints: &Hints) -> Vec<Node> {
    if embed.has_class(LOADED_CLASS) {
        return match embed.find(&|el| el.kind == NodeKind::Image) {
            Some(image) => vec![image.clone().into()],
            None => embed.children,
        };
    }

    let Some(src) = embed.attr("src") else {
        tracing::debug!("Dropped embed placeholder without source");
        return Vec::new();
    };
    let mut image = Element::new(NodeKind::Image)
        .with_attr("src", src)
        .with_attr("alt", hints.alt.as_deref().unwrap_or(""));
    if let Some(width) = &hints.width {
        image.set_attr("width", width.as_str());
    }
    vec![image.into()]
}
