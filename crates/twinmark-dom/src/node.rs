//! Element and node types.

use crate::kind::NodeKind;

/// Child of an element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Element with attributes and children.
    Element(Element),
    /// Unescaped text content.
    Text(String),
    /// Pre-rendered markup, serialized verbatim.
    Raw(String),
}

impl Node {
    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a raw markup node.
    #[must_use]
    pub fn raw(html: impl Into<String>) -> Self {
        Self::Raw(html.into())
    }

    /// Borrow the element, if this is one.
    #[must_use]
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) | Self::Raw(_) => None,
        }
    }

    /// Mutably borrow the element, if this is one.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Self::Element(el) => Some(el),
            Self::Text(_) | Self::Raw(_) => None,
        }
    }

    /// Whether this is a text node containing only whitespace.
    #[must_use]
    pub fn is_blank_text(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

impl From<Element> for Node {
    fn from(el: Element) -> Self {
        Self::Element(el)
    }
}

/// Element node in a rendered tree.
///
/// Attributes keep their insertion order so that serialization is
/// deterministic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Element kind.
    pub kind: NodeKind,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes.
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with no attributes and no children.
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Set an attribute.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Append a text child.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Replace children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Append a child.
    #[must_use]
    pub fn with_child(mut self, child: impl Into<Node>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Get an attribute value.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self
            .attrs
            .iter_mut()
            .find(|(key, _)| key.eq_ignore_ascii_case(&name))
        {
            slot.1 = value;
        } else {
            self.attrs.push((name, value));
        }
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attr(&mut self, name: &str) -> Option<String> {
        let pos = self
            .attrs
            .iter()
            .position(|(key, _)| key.eq_ignore_ascii_case(name))?;
        Some(self.attrs.remove(pos).1)
    }

    /// Keep only attributes for which `keep` returns true.
    pub fn retain_attrs(&mut self, mut keep: impl FnMut(&str, &str) -> bool) {
        self.attrs.retain(|(key, value)| keep(key, value));
    }

    /// Whitespace-separated class tokens.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Whether the element carries the given class token.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Add a class token if missing.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let joined = match self.attr("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_owned(),
        };
        self.set_attr("class", joined);
    }

    /// Concatenated text of all descendant text nodes.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }

    /// Iterate over child elements, skipping text.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First descendant element (depth-first) matching the predicate.
    #[must_use]
    pub fn find(&self, pred: &impl Fn(&Element) -> bool) -> Option<&Element> {
        for child in self.child_elements() {
            if pred(child) {
                return Some(child);
            }
            if let Some(found) = child.find(pred) {
                return Some(found);
            }
        }
        None
    }

    /// Count descendant elements matching the predicate.
    #[must_use]
    pub fn count(&self, pred: &impl Fn(&Element) -> bool) -> usize {
        self.child_elements()
            .map(|child| usize::from(pred(child)) + child.count(pred))
            .sum()
    }

    /// Visit this element and every descendant element, parents first.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Element)) {
        visit(self);
        for child in &mut self.children {
            if let Node::Element(el) = child {
                el.walk_mut(visit);
            }
        }
    }
}

fn collect_text(el: &Element, out: &mut String) {
    for child in &el.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) => collect_text(inner, out),
            Node::Raw(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_attr_replaces_in_place() {
        let mut el = Element::new(NodeKind::Anchor)
            .with_attr("href", "a")
            .with_attr("title", "t");
        el.set_attr("HREF", "b");
        assert_eq!(
            el.attrs,
            vec![
                ("href".to_owned(), "b".to_owned()),
                ("title".to_owned(), "t".to_owned())
            ]
        );
    }

    #[test]
    fn test_remove_attr() {
        let mut el = Element::new(NodeKind::Div).with_attr("id", "x");
        assert_eq!(el.remove_attr("id"), Some("x".to_owned()));
        assert_eq!(el.remove_attr("id"), None);
    }

    #[test]
    fn test_classes() {
        let mut el = Element::new(NodeKind::Div).with_attr("class", "callout  is-collapsible");
        assert!(el.has_class("callout"));
        assert!(!el.has_class("call"));
        el.add_class("is-loaded");
        assert_eq!(el.attr("class"), Some("callout  is-collapsible is-loaded"));
        el.add_class("callout");
        assert_eq!(el.classes().count(), 3);
    }

    #[test]
    fn test_text_content_skips_raw() {
        let el = Element::new(NodeKind::Paragraph)
            .with_text("Hello ")
            .with_child(Element::new(NodeKind::Strong).with_text("World"))
            .with_child(Node::raw("<br>"));
        assert_eq!(el.text_content(), "Hello World");
    }

    #[test]
    fn test_find_and_count() {
        let tree = Element::new(NodeKind::Div).with_children(vec![
            Element::new(NodeKind::Paragraph)
                .with_child(Element::new(NodeKind::Image).with_attr("src", "a.png"))
                .into(),
            Element::new(NodeKind::Image).with_attr("src", "b.png").into(),
        ]);
        let is_img = |el: &Element| el.kind == NodeKind::Image;
        assert_eq!(tree.count(&is_img), 2);
        assert_eq!(tree.find(&is_img).and_then(|el| el.attr("src")), Some("a.png"));
    }

    #[test]
    fn test_walk_mut_visits_all() {
        let mut tree = Element::new(NodeKind::Div).with_children(vec![
            Element::new(NodeKind::Span).with_attr("id", "a").into(),
            Element::new(NodeKind::Paragraph)
                .with_child(Element::new(NodeKind::Span).with_attr("id", "b"))
                .into(),
        ]);
        let mut visited = 0;
        tree.walk_mut(&mut |el| {
            el.remove_attr("id");
            visited += 1;
        });
        assert_eq!(visited, 4);
        assert!(tree.find(&|el| el.attr("id").is_some()).is_none());
    }
}
