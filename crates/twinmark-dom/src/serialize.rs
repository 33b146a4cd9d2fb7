//! HTML serialization of element trees.

use crate::node::{Element, Node};

/// Serialize the children of `el`, without the element itself.
#[must_use]
pub fn inner_html(el: &Element) -> String {
    let mut out = String::with_capacity(4096);
    for child in &el.children {
        serialize_node(child, &mut out);
    }
    out
}

/// Serialize `el` including its own tag.
#[must_use]
pub fn outer_html(el: &Element) -> String {
    let mut out = String::with_capacity(256);
    serialize_element(el, &mut out);
    out
}

fn serialize_node(node: &Node, out: &mut String) {
    match node {
        Node::Element(el) => serialize_element(el, out),
        Node::Text(text) => out.push_str(&escape_html(text)),
        Node::Raw(html) => out.push_str(html),
    }
}

fn serialize_element(el: &Element, out: &mut String) {
    let tag = el.kind.tag();
    out.push('<');
    out.push_str(tag);

    for (key, value) in &el.attrs {
        out.push(' ');
        out.push_str(key);
        out.push_str("=\"");
        out.push_str(&escape_html(value));
        out.push('"');
    }
    out.push('>');

    if el.kind.is_void() {
        return;
    }

    for child in &el.children {
        serialize_node(child, out);
    }

    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

/// Escape special HTML characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::NodeKind;

    #[test]
    fn test_serialize_with_children() {
        let p = Element::new(NodeKind::Paragraph)
            .with_child(Element::new(NodeKind::Strong).with_text("Bold"))
            .with_text(" text");
        assert_eq!(outer_html(&p), "<p><strong>Bold</strong> text</p>");
    }

    #[test]
    fn test_serialize_void_element() {
        let p = Element::new(NodeKind::Paragraph)
            .with_text("Before")
            .with_child(Element::new(NodeKind::LineBreak))
            .with_text("After");
        assert_eq!(outer_html(&p), "<p>Before<br>After</p>");
    }

    #[test]
    fn test_serialize_attributes_escaped() {
        let a = Element::new(NodeKind::Anchor)
            .with_attr("href", "https://x.test/?a=1&b=\"2\"")
            .with_text("x");
        assert_eq!(
            outer_html(&a),
            r#"<a href="https://x.test/?a=1&amp;b=&quot;2&quot;">x</a>"#
        );
    }

    #[test]
    fn test_escape_special_chars() {
        let p = Element::new(NodeKind::Paragraph).with_text("a < b & c > d");
        assert_eq!(outer_html(&p), "<p>a &lt; b &amp; c &gt; d</p>");
    }

    #[test]
    fn test_raw_is_verbatim() {
        let root = Element::new(NodeKind::Div)
            .with_child(Node::raw("<section>ok</section>"))
            .with_text("&");
        assert_eq!(inner_html(&root), "<section>ok</section>&amp;");
    }
}
