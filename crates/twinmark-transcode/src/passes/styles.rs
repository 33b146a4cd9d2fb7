//! Legacy inline styles.

use twinmark_dom::{Element, Node, NodeKind};
use twinmark_legacy::{LegacyGenerator, with_alignment};

use super::blocks::KEEP_RAW_ATTR;

/// Style every element below `el` by kind. Table cells fold their `align`
/// attribute into the style; raw-shape images are left alone.
pub(crate) fn apply_styles(el: &mut Element, generator: &dyn LegacyGenerator) {
    for child in &mut el.children {
        let Node::Element(inner) = child else {
            continue;
        };
        if inner.remove_attr(KEEP_RAW_ATTR).is_none() {
            style_element(inner, generator);
        }
        apply_styles(inner, generator);
    }
}

fn style_element(el: &mut Element, generator: &dyn LegacyGenerator) {
    let style = match el.kind {
        NodeKind::TableHeaderCell | NodeKind::TableCell => {
            let align = el.remove_attr("align");
            with_alignment(generator.inline_style(&el.kind), align.as_deref())
        }
        _ => generator.inline_style(&el.kind),
    };
    if let Some(style) = style {
        el.set_attr("style", style);
    }
}

#[cfg(test)]
mod tests {
    use twinmark_legacy::StyledGenerator;

    use super::*;

    #[test]
    fn test_cell_alignment_folded() {
        let generator = StyledGenerator::default();
        let mut row = Element::new(NodeKind::TableRow)
            .with_child(Element::new(NodeKind::TableCell).with_attr("align", "center"));
        apply_styles(&mut row, &generator);

        let cell = row.child_elements().next();
        assert_eq!(cell.and_then(|c| c.attr("align")), None);
        let style = cell.and_then(|c| c.attr("style")).unwrap_or_default();
        assert!(style.ends_with(";text-align:center"), "{style}");
    }

    #[test]
    fn test_raw_image_unstyled_and_unmarked() {
        let generator = StyledGenerator::default();
        let mut root = Element::new(NodeKind::Paragraph).with_child(
            Element::new(NodeKind::Image)
                .with_attr("src", "a.pdf")
                .with_attr(KEEP_RAW_ATTR, ""),
        );
        apply_styles(&mut root, &generator);
        let image = root.child_elements().next();
        assert_eq!(image.map(|img| img.attrs.len()), Some(1));
    }

    #[test]
    fn test_unstyled_kinds_untouched() {
        let generator = StyledGenerator::default();
        let mut root = Element::new(NodeKind::Div).with_child(Element::new(NodeKind::TableRow));
        apply_styles(&mut root, &generator);
        assert_eq!(root.child_elements().next().map(|el| el.attrs.len()), Some(0));
    }
}
