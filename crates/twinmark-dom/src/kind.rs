//! Closed set of element kinds.

/// Kind of an element node.
///
/// Known tags get their own variant; anything else is kept verbatim in
/// [`NodeKind::Other`] so that unknown markup round-trips.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Anchor,
    Image,
    Paragraph,
    Heading(u8),
    Blockquote,
    Pre,
    Code,
    Strong,
    Emphasis,
    Bold,
    Italic,
    Underline,
    Del,
    Strikethrough,
    Strike,
    Mark,
    Superscript,
    Subscript,
    UnorderedList,
    OrderedList,
    ListItem,
    Table,
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell,
    TableCell,
    LineBreak,
    Rule,
    Figure,
    Figcaption,
    Section,
    Div,
    Span,
    Input,
    Button,
    Form,
    Script,
    Style,
    Iframe,
    Frame,
    Object,
    Embed,
    Link,
    Meta,
    Other(String),
}

impl NodeKind {
    /// Map a tag name (case-insensitive) to its kind.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        let lower = tag.to_ascii_lowercase();
        match lower.as_str() {
            "a" => Self::Anchor,
            "img" => Self::Image,
            "p" => Self::Paragraph,
            "h1" => Self::Heading(1),
            "h2" => Self::Heading(2),
            "h3" => Self::Heading(3),
            "h4" => Self::Heading(4),
            "h5" => Self::Heading(5),
            "h6" => Self::Heading(6),
            "blockquote" => Self::Blockquote,
            "pre" => Self::Pre,
            "code" => Self::Code,
            "strong" => Self::Strong,
            "em" => Self::Emphasis,
            "b" => Self::Bold,
            "i" => Self::Italic,
            "u" => Self::Underline,
            "del" => Self::Del,
            "s" => Self::Strikethrough,
            "strike" => Self::Strike,
            "mark" => Self::Mark,
            "sup" => Self::Superscript,
            "sub" => Self::Subscript,
            "ul" => Self::UnorderedList,
            "ol" => Self::OrderedList,
            "li" => Self::ListItem,
            "table" => Self::Table,
            "thead" => Self::TableHead,
            "tbody" => Self::TableBody,
            "tr" => Self::TableRow,
            "th" => Self::TableHeaderCell,
            "td" => Self::TableCell,
            "br" => Self::LineBreak,
            "hr" => Self::Rule,
            "figure" => Self::Figure,
            "figcaption" => Self::Figcaption,
            "section" => Self::Section,
            "div" => Self::Div,
            "span" => Self::Span,
            "input" => Self::Input,
            "button" => Self::Button,
            "form" => Self::Form,
            "script" => Self::Script,
            "style" => Self::Style,
            "iframe" => Self::Iframe,
            "frame" => Self::Frame,
            "object" => Self::Object,
            "embed" => Self::Embed,
            "link" => Self::Link,
            "meta" => Self::Meta,
            _ => Self::Other(lower),
        }
    }

    /// Tag name used when serializing.
    #[must_use]
    pub fn tag(&self) -> &str {
        match self {
            Self::Anchor => "a",
            Self::Image => "img",
            Self::Paragraph => "p",
            Self::Heading(level) => match level {
                1 => "h1",
                2 => "h2",
                3 => "h3",
                4 => "h4",
                5 => "h5",
                _ => "h6",
            },
            Self::Blockquote => "blockquote",
            Self::Pre => "pre",
            Self::Code => "code",
            Self::Strong => "strong",
            Self::Emphasis => "em",
            Self::Bold => "b",
            Self::Italic => "i",
            Self::Underline => "u",
            Self::Del => "del",
            Self::Strikethrough => "s",
            Self::Strike => "strike",
            Self::Mark => "mark",
            Self::Superscript => "sup",
            Self::Subscript => "sub",
            Self::UnorderedList => "ul",
            Self::OrderedList => "ol",
            Self::ListItem => "li",
            Self::Table => "table",
            Self::TableHead => "thead",
            Self::TableBody => "tbody",
            Self::TableRow => "tr",
            Self::TableHeaderCell => "th",
            Self::TableCell => "td",
            Self::LineBreak => "br",
            Self::Rule => "hr",
            Self::Figure => "figure",
            Self::Figcaption => "figcaption",
            Self::Section => "section",
            Self::Div => "div",
            Self::Span => "span",
            Self::Input => "input",
            Self::Button => "button",
            Self::Form => "form",
            Self::Script => "script",
            Self::Style => "style",
            Self::Iframe => "iframe",
            Self::Frame => "frame",
            Self::Object => "object",
            Self::Embed => "embed",
            Self::Link => "link",
            Self::Meta => "meta",
            Self::Other(tag) => tag,
        }
    }

    /// Elements serialized without a closing tag.
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(
            self,
            Self::Image
                | Self::LineBreak
                | Self::Rule
                | Self::Input
                | Self::Embed
                | Self::Link
                | Self::Meta
        )
    }

    /// Elements that must never reach the publishing surface.
    #[must_use]
    pub fn is_unsafe(&self) -> bool {
        matches!(
            self,
            Self::Script
                | Self::Style
                | Self::Iframe
                | Self::Frame
                | Self::Object
                | Self::Embed
                | Self::Form
                | Self::Input
                | Self::Button
                | Self::Link
                | Self::Meta
        )
    }

    /// Block-level containers whose text is trimmed at the edges.
    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(
            self,
            Self::Paragraph
                | Self::Heading(_)
                | Self::Blockquote
                | Self::ListItem
                | Self::TableHeaderCell
                | Self::TableCell
                | Self::Figcaption
                | Self::Section
                | Self::Div
        )
    }

    /// Elements whose text content is literal (no typography, no autolinks).
    #[must_use]
    pub fn is_literal_text(&self) -> bool {
        matches!(self, Self::Pre | Self::Code | Self::Script | Self::Style)
    }

    /// Any of the strike-through spellings.
    #[must_use]
    pub fn is_strike_alias(&self) -> bool {
        matches!(self, Self::Strikethrough | Self::Strike)
    }
}
