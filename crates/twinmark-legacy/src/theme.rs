//! Inline style strings of the legacy dialect.
//!
//! The publishing surface drops stylesheets, so every styled element
//! carries its look in a `style` attribute.

use twinmark_dom::NodeKind;

/// Colors and metrics the inline styles are built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    pub accent_color: String,
    pub text_color: String,
    /// Base font size in pixels.
    pub font_size: u32,
    /// Line height as a CSS number, e.g. `1.75`.
    pub line_height: String,
    /// Optional header shown above every figure.
    pub figure_header: Option<String>,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent_color: "#0f766e".to_owned(),
            text_color: "#333333".to_owned(),
            font_size: 15,
            line_height: "1.75".to_owned(),
            figure_header: None,
        }
    }
}

impl Theme {
    /// Style for an element kind, `None` when the kind is unstyled.
    #[must_use]
    pub fn inline_style(&self, kind: &NodeKind) -> Option<String> {
        let accent = &self.accent_color;
        let text = &self.text_color;
        let size = self.font_size;
        let line = &self.line_height;

        let style = match kind {
            NodeKind::Paragraph => {
                format!("margin:0 0 1em;color:{text};font-size:{size}px;line-height:{line}")
            }
            NodeKind::Heading(level) => {
                let heading_size = size + 2 * u32::from(7u8.saturating_sub(*level).min(5));
                format!(
                    "margin:1.2em 0 0.6em;color:{text};font-size:{heading_size}px;font-weight:bold;line-height:1.4"
                )
            }
            NodeKind::Blockquote => format!(
                "margin:1em 0;padding:0.5em 1em;border-left:4px solid {accent};color:#666666;background:#f7f7f7"
            ),
            NodeKind::Code => format!(
                "padding:2px 4px;border-radius:3px;background:#f3f4f4;color:{accent};font-size:90%;font-family:Menlo,Consolas,monospace"
            ),
            NodeKind::Strong | NodeKind::Bold => format!("font-weight:bold;color:{accent}"),
            NodeKind::Emphasis | NodeKind::Italic => "font-style:italic".to_owned(),
            NodeKind::Del => "text-decoration:line-through;color:#999999".to_owned(),
            NodeKind::Mark => "background:#fff3b0;padding:0 2px".to_owned(),
            NodeKind::Anchor => {
                format!("color:{accent};text-decoration:none;border-bottom:1px solid {accent}")
            }
            NodeKind::UnorderedList | NodeKind::OrderedList => {
                format!("margin:0 0 1em;padding-left:2em;color:{text}")
            }
            NodeKind::ListItem => format!("margin:0.2em 0;line-height:{line}"),
            NodeKind::Table => {
                "width:100%;margin:1em 0;border-collapse:collapse;font-size:90%".to_owned()
            }
            NodeKind::TableHeaderCell => {
                "padding:6px 10px;border:1px solid #dfdfdf;background:#f6f8fa;font-weight:bold"
                    .to_owned()
            }
            NodeKind::TableCell => "padding:6px 10px;border:1px solid #dfdfdf".to_owned(),
            NodeKind::Rule => format!("margin:1.5em 0;border:0;border-top:1px solid {accent}"),
            NodeKind::Image => "display:block;max-width:100%;margin:0 auto".to_owned(),
            NodeKind::Figure => "margin:1.5em 0;text-align:center".to_owned(),
            NodeKind::Figcaption => "margin-top:0.4em;color:#888888;font-size:80%".to_owned(),
            NodeKind::Pre => "margin:0;padding:1em;overflow-x:auto;white-space:pre;font-size:90%;line-height:1.6".to_owned(),
            NodeKind::Section => format!("color:{text}"),
            NodeKind::Superscript
            | NodeKind::Subscript
            | NodeKind::Underline
            | NodeKind::Strikethrough
            | NodeKind::Strike
            | NodeKind::TableHead
            | NodeKind::TableBody
            | NodeKind::TableRow
            | NodeKind::LineBreak
            | NodeKind::Div
            | NodeKind::Span
            | NodeKind::Input
            | NodeKind::Button
            | NodeKind::Form
            | NodeKind::Script
            | NodeKind::Style
            | NodeKind::Iframe
            | NodeKind::Frame
            | NodeKind::Object
            | NodeKind::Embed
            | NodeKind::Link
            | NodeKind::Meta
            | NodeKind::Other(_) => return None,
        };
        Some(style)
    }

    /// Style of the block wrapping a code listing.
    #[must_use]
    pub fn code_block_style(&self) -> String {
        "margin:1em 0;border-radius:6px;background:#f6f8fa;color:#24292e".to_owned()
    }

    /// Style of a callout: outer box, title row, body.
    #[must_use]
    pub fn callout_styles(&self) -> (String, String, String) {
        let accent = &self.accent_color;
        (
            format!("margin:1em 0;padding:0.8em 1em;border-left:4px solid {accent};border-radius:4px;background:#f7f9fa"),
            format!("margin-bottom:0.4em;font-weight:bold;color:{accent}"),
            format!("color:{}", self.text_color),
        )
    }

    /// Style of the optional figure header.
    #[must_use]
    pub fn figure_header_style(&self) -> String {
        format!("margin-bottom:0.4em;color:{};font-size:75%", self.accent_color)
    }
}

/// Append a table cell alignment to a base style.
#[must_use]
pub fn with_alignment(base: Option<String>, align: Option<&str>) -> Option<String> {
    match (base, align) {
        (Some(base), Some(align)) => Some(format!("{base};text-align:{align}")),
        (None, Some(align)) => Some(format!("text-align:{align}")),
        (base, None) => base,
    }
}
