//! Render backend trait for dialect-specific output.
//!
//! The renderer walks Markdown events and handles structure generically;
//! everything that decides how the legacy dialect looks goes through
//! [`RenderBackend`].

use twinmark_dom::{NodeKind, escape_html};

use crate::callout::CalloutInfo;

/// Backend of [`MarkdownRenderer`](crate::MarkdownRenderer).
pub trait RenderBackend {
    /// Inline style for an element kind, `None` for unstyled kinds.
    fn inline_style(&self, kind: &NodeKind) -> Option<String>;

    /// Render a fenced or indented code block.
    fn code_block(&self, lang: Option<&str>, content: &str, out: &mut String);

    /// Render blockquote start tag.
    fn blockquote_start(&self, out: &mut String) {
        open_tag(self, &NodeKind::Blockquote, &[], out);
    }

    /// Render blockquote end tag.
    fn blockquote_end(&self, out: &mut String) {
        out.push_str("</blockquote>");
    }

    /// Render the opening markup of a callout such as `> [!tip] Title`.
    fn callout_start(&self, info: &CalloutInfo, out: &mut String);

    /// Render the closing markup of a callout.
    fn callout_end(&self, info: &CalloutInfo, out: &mut String);

    /// Render an image.
    ///
    /// `in_link` is set for images nested inside a link, which never become
    /// figures.
    fn image(&self, src: &str, alt: &str, in_link: bool, out: &mut String);

    /// Validated, canonical link target, `None` to drop the anchor and keep
    /// its content.
    fn link_target(&self, url: &str) -> Option<String>;

    /// Render a plain text run outside code and links.
    fn text(&self, text: &str, out: &mut String) {
        out.push_str(&escape_html(text));
    }

    /// Render inline or display math.
    fn math(&self, display: bool, content: &str, out: &mut String) {
        let content = escape_html(content);
        if display {
            out.push_str(&format!(r#"<div class="math math-block">{content}</div>"#));
        } else {
            out.push_str(&format!(r#"<span class="math math-inline">{content}</span>"#));
        }
    }

    /// Render a hard break.
    fn hard_break(&self, out: &mut String) {
        out.push_str("<br>");
    }

    /// Render a soft break. The legacy dialect keeps every line break.
    fn soft_break(&self, out: &mut String) {
        self.hard_break(out);
    }

    /// Render a horizontal rule.
    fn horizontal_rule(&self, out: &mut String) {
        open_tag(self, &NodeKind::Rule, &[], out);
    }

    /// Render a task list marker. Checkboxes are not part of the dialect.
    fn task_list_marker(&self, _checked: bool, _out: &mut String) {}
}

/// Write `<tag attrs style="...">` with the backend's style for `kind`.
///
/// Attributes are escaped; the style attribute always comes last.
pub fn open_tag<B: RenderBackend + ?Sized>(
    backend: &B,
    kind: &NodeKind,
    attrs: &[(&str, &str)],
    out: &mut String,
) {
    write_open_tag(kind, attrs, backend.inline_style(kind).as_deref(), out);
}

/// Write `<tag attrs style="...">` with an explicit style.
pub fn write_open_tag(
    kind: &NodeKind,
    attrs: &[(&str, &str)],
    style: Option<&str>,
    out: &mut String,
) {
    out.push('<');
    out.push_str(kind.tag());
    for (name, value) in attrs {
        out.push_str(&format!(r#" {name}="{}""#, escape_html(value)));
    }
    if let Some(style) = style {
        out.push_str(&format!(r#" style="{}""#, escape_html(style)));
    }
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_open_tag_orders_style_last() {
        let mut out = String::new();
        write_open_tag(
            &NodeKind::Anchor,
            &[("href", "a?b=1&c=2")],
            Some("color:red"),
            &mut out,
        );
        assert_eq!(out, r#"<a href="a?b=1&amp;c=2" style="color:red">"#);
    }

    #[test]
    fn test_write_open_tag_unstyled() {
        let mut out = String::new();
        write_open_tag(&NodeKind::TableRow, &[], None, &mut out);
        assert_eq!(out, "<tr>");
    }
}
