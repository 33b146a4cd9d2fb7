//! Markdown event renderer with a pluggable backend.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd, TextMergeStream};
use twinmark_dom::{NodeKind, escape_html};

use crate::backend::{RenderBackend, open_tag, write_open_tag};
use crate::callout::{CalloutHeader, CalloutInfo};
use crate::state::{CodeBlockState, ImageState, TableState};
use crate::theme::with_alignment;

/// Parser extensions of the legacy dialect.
///
/// GFM alerts stay off: callout headers are parsed by [`CalloutHeader`]
/// so every kind, title and fold marker is recognized.
#[must_use]
pub fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_MATH
}

/// Language of a fenced code block: the first word of its info string.
#[must_use]
pub fn fence_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info.split_whitespace().next().map(str::to_owned),
        CodeBlockKind::Indented => None,
    }
}

/// Generic Markdown renderer.
///
/// Structure (paragraphs, lists, tables, inline formatting) is handled
/// here; the [`RenderBackend`] supplies styles and the markup of code,
/// callouts, images and text runs.
pub struct MarkdownRenderer<'b, B: RenderBackend + ?Sized> {
    backend: &'b B,
    output: String,
    code: CodeBlockState,
    table: TableState,
    image: ImageState,
    /// Pending image source, waiting for alt text.
    pending_image: Option<String>,
    /// One entry per open link: whether an anchor tag was written.
    links: Vec<bool>,
    /// One entry per open blockquote, with the callout it renders as.
    quotes: Vec<Option<CalloutInfo>>,
}

impl<'b, B: RenderBackend + ?Sized> MarkdownRenderer<'b, B> {
    #[must_use]
    pub fn new(backend: &'b B) -> Self {
        Self {
            backend,
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            table: TableState::default(),
            image: ImageState::default(),
            pending_image: None,
            links: Vec::new(),
            quotes: Vec::new(),
        }
    }

    /// Parse `markdown` with [`parser_options`] and render it.
    pub fn render_markdown(self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, parser_options());
        self.render(TextMergeStream::new(parser))
    }

    /// Render markdown events.
    pub fn render<'a, I>(mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'a>>,
    {
        let events: Vec<Event<'a>> = events.collect();
        let mut rest = events.as_slice();
        while let Some((event, tail)) = rest.split_first() {
            rest = tail;
            if matches!(event, Event::Start(Tag::BlockQuote(_)))
                && !self.image.is_active()
                && let Some(header) = CalloutHeader::parse(rest)
            {
                rest = rest.get(header.consumed..).unwrap_or_default();
                self.callout_start(header);
                continue;
            }
            self.process_event(event.clone());
        }
        self.output
    }

    fn in_link(&self) -> bool {
        !self.links.is_empty()
    }

    fn callout_start(&mut self, header: CalloutHeader) {
        self.backend.callout_start(&header.info, &mut self.output);
        self.quotes.push(Some(header.info));
        if header.continues_paragraph {
            self.open(&NodeKind::Paragraph);
        }
    }

    fn open(&mut self, kind: &NodeKind) {
        open_tag(self.backend, kind, &[], &mut self.output);
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::InlineMath(math) => self.math(false, &math),
            Event::DisplayMath(math) => self.math(true, &math),
            Event::Html(html) | Event::InlineHtml(html) => self.output.push_str(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => self.hard_break(),
            Event::Rule => self.backend.horizontal_rule(&mut self.output),
            Event::TaskListMarker(checked) => {
                self.backend.task_list_marker(checked, &mut self.output);
            }
            Event::FootnoteReference(_) => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        // Alt text is plain: markup inside an image is flattened.
        if self.image.is_active() {
            return;
        }
        match tag {
            Tag::Paragraph => self.open(&NodeKind::Paragraph),
            Tag::Heading { level, .. } => self.open(&NodeKind::Heading(level as u8)),
            Tag::BlockQuote(_) => {
                self.quotes.push(None);
                self.backend.blockquote_start(&mut self.output);
            }
            Tag::CodeBlock(kind) => self.code.start(fence_language(&kind)),
            Tag::List(Some(1)) => self.open(&NodeKind::OrderedList),
            Tag::List(Some(start)) => {
                let start = start.to_string();
                open_tag(
                    self.backend,
                    &NodeKind::OrderedList,
                    &[("start", &start)],
                    &mut self.output,
                );
            }
            Tag::List(None) => self.open(&NodeKind::UnorderedList),
            Tag::Item => self.open(&NodeKind::ListItem),
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.open(&NodeKind::Table);
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let kind = if self.table.is_in_head() {
                    NodeKind::TableHeaderCell
                } else {
                    NodeKind::TableCell
                };
                let style = with_alignment(
                    self.backend.inline_style(&kind),
                    self.table.current_alignment(),
                );
                write_open_tag(&kind, &[], style.as_deref(), &mut self.output);
            }
            Tag::Emphasis => self.open(&NodeKind::Emphasis),
            Tag::Strong => self.open(&NodeKind::Strong),
            Tag::Strikethrough => self.open(&NodeKind::Del),
            Tag::Superscript => self.open(&NodeKind::Superscript),
            Tag::Subscript => self.open(&NodeKind::Subscript),
            Tag::Link { dest_url, .. } => match self.backend.link_target(&dest_url) {
                Some(href) => {
                    open_tag(
                        self.backend,
                        &NodeKind::Anchor,
                        &[("href", &href)],
                        &mut self.output,
                    );
                    self.links.push(true);
                }
                None => self.links.push(false),
            },
            Tag::Image { dest_url, .. } => {
                self.image.start();
                self.pending_image = Some(dest_url.to_string());
            }
            Tag::FootnoteDefinition(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        if self.image.is_active() && tag != TagEnd::Image {
            return;
        }
        match tag {
            TagEnd::Paragraph => self.output.push_str("</p>"),
            TagEnd::Heading(level) => self.output.push_str(&format!("</h{}>", level as u8)),
            TagEnd::BlockQuote(_) => match self.quotes.pop().flatten() {
                Some(info) => self.backend.callout_end(&info, &mut self.output),
                None => self.backend.blockquote_end(&mut self.output),
            },
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                self.backend
                    .code_block(lang.as_deref(), &content, &mut self.output);
            }
            TagEnd::List(ordered) => {
                self.output.push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => self.output.push_str("</li>"),
            TagEnd::Table => self.output.push_str("</tbody></table>"),
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => self.output.push_str("</tr>"),
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.output.push_str("</em>"),
            TagEnd::Strong => self.output.push_str("</strong>"),
            TagEnd::Strikethrough => self.output.push_str("</del>"),
            TagEnd::Superscript => self.output.push_str("</sup>"),
            TagEnd::Subscript => self.output.push_str("</sub>"),
            TagEnd::Link => {
                if self.links.pop() == Some(true) {
                    self.output.push_str("</a>");
                }
            }
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some(src) = self.pending_image.take() {
                    let in_link = self.in_link();
                    self.backend.image(&src, &alt, in_link, &mut self.output);
                }
            }
            TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => {}
        }
    }

    fn text(&mut self, text: &str) {
        // Priority: code > image alt > link text > plain text
        if self.code.is_active() {
            self.code.push_str(text);
        } else if self.image.is_active() {
            self.image.push_str(text);
        } else if self.in_link() {
            self.output.push_str(&escape_html(text));
        } else {
            self.backend.text(text, &mut self.output);
        }
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.push_str(code);
            return;
        }
        self.open(&NodeKind::Code);
        self.output.push_str(&escape_html(code));
        self.output.push_str("</code>");
    }

    fn math(&mut self, display: bool, content: &str) {
        if self.image.is_active() {
            self.image.push_str(content);
            return;
        }
        self.backend.math(display, content, &mut self.output);
    }

    fn soft_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else {
            self.backend.soft_break(&mut self.output);
        }
    }

    fn hard_break(&mut self) {
        if self.image.is_active() {
            self.image.push_str(" ");
        } else {
            self.backend.hard_break(&mut self.output);
        }
    }
}
