//! Code listings and figures in legacy markup.

use twinmark_dom::{Element, Node, NodeKind};
use twinmark_legacy::LegacyGenerator;

/// Marker on images whose source is not an image file: they keep the raw
/// `img` shape and get no style.
pub(crate) const KEEP_RAW_ATTR: &str = "data-tm-keep-raw";

/// Replace every `pre` with the legacy code block.
pub(crate) fn replace_code_blocks(el: &mut Element, generator: &dyn LegacyGenerator) {
    for child in &mut el.children {
        let Node::Element(inner) = child else {
            continue;
        };
        if inner.kind == NodeKind::Pre {
            let markup = code_block_markup(inner, generator);
            *child = Node::Raw(markup);
        } else {
            replace_code_blocks(inner, generator);
        }
    }
}

fn code_block_markup(pre: &Element, generator: &dyn LegacyGenerator) -> String {
    let code = pre.child_elements().find(|el| el.kind == NodeKind::Code);
    let lang = code.and_then(|code| {
        code.classes()
            .find_map(|class| class.strip_prefix("language-"))
            .filter(|lang| !lang.is_empty())
    });
    let content = code.map_or_else(|| pre.text_content(), Element::text_content);
    generator.create_code_block(&content, lang)
}

/// Replace images outside links with legacy figures; mark non-image
/// sources to keep their raw shape.
pub(crate) fn replace_figures(el: &mut Element, generator: &dyn LegacyGenerator) {
    replace_figures_in(el, generator, false);
}

fn replace_figures_in(el: &mut Element, generator: &dyn LegacyGenerator, in_anchor: bool) {
    for child in &mut el.children {
        let Node::Element(inner) = child else {
            continue;
        };
        match inner.kind {
            NodeKind::Image => {
                let src = inner.attr("src").unwrap_or_default().to_owned();
                if !generator.is_image_url(&src) {
                    inner.set_attr(KEEP_RAW_ATTR, "");
                } else if !in_anchor {
                    let alt = inner.attr("alt").unwrap_or_default().to_owned();
                    let caption = if alt.trim().is_empty() {
                        generator.extract_file_name(&src)
                    } else {
                        alt.clone()
                    };
                    let resolved = generator.resolve_image_path(&src);
                    *child = Node::Raw(generator.render_figure(&resolved, &alt, &caption));
                }
            }
            NodeKind::Anchor => replace_figures_in(inner, generator, true),
            _ => replace_figures_in(inner, generator, in_anchor),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use twinmark_dom::inner_html;
    use twinmark_legacy::StyledGenerator;

    use super::*;

    #[test]
    fn test_code_block_uses_legacy_markup() {
        let generator = StyledGenerator::default();
        let mut root = Element::new(NodeKind::Div).with_child(
            Element::new(NodeKind::Pre).with_child(
                Element::new(NodeKind::Code)
                    .with_attr("class", "language-rust")
                    .with_text("let a = 1;\n"),
            ),
        );
        replace_code_blocks(&mut root, &generator);
        assert_eq!(
            inner_html(&root),
            generator.create_code_block("let a = 1;\n", Some("rust"))
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let generator = StyledGenerator::default();
        let mut root = Element::new(NodeKind::Div)
            .with_child(Element::new(NodeKind::Pre).with_text("plain"));
        replace_code_blocks(&mut root, &generator);
        assert_eq!(
            inner_html(&root),
            generator.create_code_block("plain", None)
        );
    }

    #[test]
    fn test_standalone_image_becomes_figure() {
        let generator = StyledGenerator::default();
        let mut root = Element::new(NodeKind::Paragraph).with_child(
            Element::new(NodeKind::Image)
                .with_attr("src", "img/my%20cat.png")
                .with_attr("alt", ""),
        );
        replace_figures(&mut root, &generator);
        assert_eq!(
            inner_html(&root),
            generator.render_figure("img/my%20cat.png", "", "my cat")
        );
    }

    #[test]
    fn test_image_in_link_stays_plain() {
        let generator = StyledGenerator::default();
        let image = Element::new(NodeKind::Image)
            .with_attr("src", "logo.png")
            .with_attr("alt", "logo");
        let mut root = Element::new(NodeKind::Paragraph).with_child(
            Element::new(NodeKind::Anchor)
                .with_attr("href", "https://x.test")
                .with_child(image),
        );
        replace_figures(&mut root, &generator);
        assert_eq!(
            inner_html(&root),
            r#"<a href="https://x.test"><img src="logo.png" alt="logo"></a>"#
        );
    }

    #[test]
    fn test_non_image_marked_raw() {
        let generator = StyledGenerator::default();
        let mut root = Element::new(NodeKind::Paragraph)
            .with_child(Element::new(NodeKind::Image).with_attr("src", "report.pdf"));
        replace_figures(&mut root, &generator);
        let image = root.find(&|el| el.kind == NodeKind::Image);
        assert_eq!(image.and_then(|img| img.attr(KEEP_RAW_ATTR)), Some(""));
    }
}
