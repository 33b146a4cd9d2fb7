//! Reference host engine built on pulldown-cmark.
//!
//! [`CmarkEngine`] renders the way a host application does: paragraphs and
//! list items carry `dir`, headings get ids, callouts become `div.callout`
//! blocks, code blocks get a copy button and, optionally, images become
//! embed placeholders that a background task resolves after a delay.

use std::time::Duration;

use async_trait::async_trait;
use pulldown_cmark::{Alignment, Event, Parser, Tag, TagEnd, TextMergeStream};
use twinmark_dom::embed::{EMBED_CLASS, IMAGE_EMBED_CLASS, LOADED_CLASS};
use twinmark_dom::{Element, Node, NodeKind, RenderTarget};
use twinmark_legacy::{CalloutHeader, alignment_name, fence_language, parser_options};

use crate::error::HostError;
use crate::host::{Component, HostEngine};

const EMBED_ID_ATTR: &str = "data-embed-id";

/// Host engine producing host-shaped trees from Markdown.
#[derive(Clone, Debug, Default)]
pub struct CmarkEngine {
    /// Delay after which embed placeholders resolve; `None` renders images
    /// inline.
    embed_delay: Option<Duration>,
}

impl CmarkEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render standalone images as placeholders resolved after `delay`.
    #[must_use]
    pub fn with_deferred_embeds(mut self, delay: Duration) -> Self {
        self.embed_delay = Some(delay);
        self
    }

    /// Build the host tree of `markdown` without embed resolution.
    #[must_use]
    pub fn build_tree(&self, markdown: &str) -> (Element, Vec<String>) {
        let parser = Parser::new_ext(markdown, parser_options());
        let events: Vec<Event<'_>> = TextMergeStream::new(parser).collect();
        let mut builder = TreeBuilder::new(self.embed_delay.is_some());
        let mut rest = events.as_slice();
        while let Some((event, tail)) = rest.split_first() {
            rest = tail;
            if matches!(event, Event::Start(Tag::BlockQuote(_)))
                && builder.accepts_blocks()
                && let Some(header) = CalloutHeader::parse(rest)
            {
                rest = rest.get(header.consumed..).unwrap_or_default();
                builder.open_callout(&header);
                continue;
            }
            builder.event(event.clone());
        }
        builder.finish()
    }
}

#[async_trait]
impl HostEngine for CmarkEngine {
    async fn render_markdown(
        &self,
        markdown: &str,
        target: &RenderTarget,
        _source_path: &str,
        component: &Component,
    ) -> Option<Result<(), HostError>> {
        let (tree, embeds) = self.build_tree(markdown);
        target.update(|root| root.children.extend(tree.children));

        if let Some(delay) = self.embed_delay {
            for id in embeds {
                let target = target.clone();
                component.spawn(async move {
                    tokio::time::sleep(delay).await;
                    target.update(|root| resolve_embed(root, &id));
                });
            }
        }
        Some(Ok(()))
    }
}

/// Mark embed `id` as loaded and put its image inside.
fn resolve_embed(root: &mut Element, id: &str) {
    root.walk_mut(&mut |el: &mut Element| {
        if el.attr(EMBED_ID_ATTR) != Some(id) || el.has_class(LOADED_CLASS) {
            return;
        }
        let image = Element::new(NodeKind::Image)
            .with_attr("src", el.attr("src").unwrap_or_default())
            .with_attr("alt", el.attr("alt").unwrap_or_default());
        el.add_class(LOADED_CLASS);
        el.children.push(image.into());
    });
}

/// Lowercase slug used for heading ids.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-') && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_owned()
}

struct PendingImage {
    src: String,
    alt: String,
}

struct TreeBuilder {
    stack: Vec<Element>,
    alignments: Vec<Alignment>,
    cell: usize,
    in_head: bool,
    /// Language and text of the open code block.
    code: Option<(Option<String>, String)>,
    image: Option<PendingImage>,
    link_depth: usize,
    /// One entry per open blockquote: whether it is a callout.
    quotes: Vec<bool>,
    defer_images: bool,
    embeds: Vec<String>,
}

impl TreeBuilder {
    fn new(defer_images: bool) -> Self {
        Self {
            stack: vec![Element::new(NodeKind::Div)],
            alignments: Vec::new(),
            cell: 0,
            in_head: false,
            code: None,
            image: None,
            link_depth: 0,
            quotes: Vec::new(),
            defer_images,
            embeds: Vec::new(),
        }
    }

    fn accepts_blocks(&self) -> bool {
        self.image.is_none() && self.code.is_none()
    }

    fn finish(mut self) -> (Element, Vec<String>) {
        while self.stack.len() > 1 {
            self.close();
        }
        let root = self
            .stack
            .pop()
            .unwrap_or_else(|| Element::new(NodeKind::Div));
        (root, self.embeds)
    }

    fn push(&mut self, node: impl Into<Node>) {
        if let Some(top) = self.stack.last_mut() {
            top.children.push(node.into());
        }
    }

    fn open(&mut self, el: Element) {
        self.stack.push(el);
    }

    fn close(&mut self) {
        if self.stack.len() > 1
            && let Some(el) = self.stack.pop()
        {
            self.push(el);
        }
    }

    fn event(&mut self, event: Event<'_>) {
        if let Some(image) = &mut self.image {
            match event {
                Event::End(TagEnd::Image) => self.end_image(),
                Event::Text(text) | Event::Code(text) | Event::InlineMath(text) => {
                    image.alt.push_str(&text);
                }
                Event::SoftBreak | Event::HardBreak => image.alt.push(' '),
                _ => {}
            }
            return;
        }
        if let Some((_, content)) = &mut self.code {
            match event {
                Event::Text(text) => content.push_str(&text),
                Event::End(TagEnd::CodeBlock) => self.end_code_block(),
                _ => {}
            }
            return;
        }

        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push(Node::text(text.to_string())),
            Event::Code(code) => self.push(Element::new(NodeKind::Code).with_text(code.to_string())),
            Event::InlineMath(math) => self.push(
                Element::new(NodeKind::Span)
                    .with_attr("class", "math math-inline is-loaded")
                    .with_text(math.to_string()),
            ),
            Event::DisplayMath(math) => self.push(
                Element::new(NodeKind::Div)
                    .with_attr("class", "math math-block is-loaded")
                    .with_text(math.to_string()),
            ),
            Event::Html(html) | Event::InlineHtml(html) => self.push(Node::raw(html.to_string())),
            Event::SoftBreak => self.push(Node::text("\n")),
            Event::HardBreak => self.push(Element::new(NodeKind::LineBreak)),
            Event::Rule => self.push(Element::new(NodeKind::Rule)),
            Event::TaskListMarker(checked) => self.task_marker(checked),
            Event::FootnoteReference(_) => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open(Element::new(NodeKind::Paragraph).with_attr("dir", "auto")),
            Tag::Heading { level, .. } => {
                self.open(Element::new(NodeKind::Heading(level as u8)).with_attr("dir", "auto"));
            }
            Tag::BlockQuote(_) => {
                self.quotes.push(false);
                self.open(Element::new(NodeKind::Blockquote).with_attr("dir", "auto"));
            }
            Tag::CodeBlock(kind) => self.code = Some((fence_language(&kind), String::new())),
            Tag::List(Some(1)) => self.open(Element::new(NodeKind::OrderedList)),
            Tag::List(Some(start)) => {
                self.open(Element::new(NodeKind::OrderedList).with_attr("start", start.to_string()));
            }
            Tag::List(None) => self.open(Element::new(NodeKind::UnorderedList)),
            Tag::Item => self.open(Element::new(NodeKind::ListItem).with_attr("dir", "auto")),
            Tag::Table(alignments) => {
                self.alignments = alignments;
                self.open(Element::new(NodeKind::Table));
            }
            Tag::TableHead => {
                self.in_head = true;
                self.cell = 0;
                self.open(Element::new(NodeKind::TableHead));
                self.open(Element::new(NodeKind::TableRow));
            }
            Tag::TableRow => {
                self.cell = 0;
                self.open(Element::new(NodeKind::TableRow));
            }
            Tag::TableCell => {
                let kind = if self.in_head {
                    NodeKind::TableHeaderCell
                } else {
                    NodeKind::TableCell
                };
                let mut cell = Element::new(kind);
                if let Some(align) = self.alignments.get(self.cell).and_then(alignment_name) {
                    cell.set_attr("align", align);
                }
                self.open(cell);
            }
            Tag::Emphasis => self.open(Element::new(NodeKind::Emphasis)),
            Tag::Strong => self.open(Element::new(NodeKind::Strong)),
            Tag::Strikethrough => self.open(Element::new(NodeKind::Strikethrough)),
            Tag::Superscript => self.open(Element::new(NodeKind::Superscript)),
            Tag::Subscript => self.open(Element::new(NodeKind::Subscript)),
            Tag::Link { dest_url, .. } => {
                self.link_depth += 1;
                let mut anchor = Element::new(NodeKind::Anchor).with_attr("href", dest_url.to_string());
                if twinmark_legacy::url::is_relative(&dest_url) {
                    anchor.set_attr("class", "internal-link");
                } else {
                    anchor.set_attr("class", "external-link");
                    anchor.set_attr("target", "_blank");
                    anchor.set_attr("rel", "noopener nofollow");
                }
                self.open(anchor);
            }
            Tag::Image { dest_url, .. } => {
                self.image = Some(PendingImage {
                    src: dest_url.to_string(),
                    alt: String::new(),
                });
            }
            Tag::FootnoteDefinition(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                if let Some(heading) = self.stack.last_mut() {
                    let text = heading.text_content();
                    heading.set_attr("id", slugify(&text));
                    heading.set_attr("data-heading", text);
                }
                self.close();
            }
            TagEnd::BlockQuote(_) => {
                // content div, then the callout
                if self.quotes.pop() == Some(true) {
                    self.close();
                }
                self.close();
            }
            TagEnd::TableHead => {
                self.close();
                self.close();
                self.in_head = false;
                self.open(Element::new(NodeKind::TableBody));
            }
            TagEnd::Table => {
                self.close();
                self.close();
                self.alignments.clear();
            }
            TagEnd::TableCell => {
                self.close();
                self.cell += 1;
            }
            TagEnd::Link => {
                self.link_depth = self.link_depth.saturating_sub(1);
                self.close();
            }
            TagEnd::Paragraph
            | TagEnd::List(_)
            | TagEnd::Item
            | TagEnd::TableRow
            | TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Superscript
            | TagEnd::Subscript => self.close(),
            TagEnd::CodeBlock
            | TagEnd::Image
            | TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition => {}
        }
    }

    fn open_callout(&mut self, header: &CalloutHeader) {
        let info = &header.info;
        let fold = header.fold.map(String::from).unwrap_or_default();
        let title = Element::new(NodeKind::Div)
            .with_attr("class", "callout-title")
            .with_attr("dir", "auto")
            .with_child(Element::new(NodeKind::Div).with_attr("class", "callout-icon"))
            .with_child(
                Element::new(NodeKind::Div)
                    .with_attr("class", "callout-title-inner")
                    .with_text(info.title.clone()),
            );
        self.open(
            Element::new(NodeKind::Div)
                .with_attr("class", "callout")
                .with_attr("data-callout", info.kind.clone())
                .with_attr("data-callout-fold", fold)
                .with_child(title),
        );
        self.open(Element::new(NodeKind::Div).with_attr("class", "callout-content"));
        self.quotes.push(true);
        if header.continues_paragraph {
            self.open(Element::new(NodeKind::Paragraph).with_attr("dir", "auto"));
        }
    }

    fn end_code_block(&mut self) {
        let Some((lang, content)) = self.code.take() else {
            return;
        };
        let mut code = Element::new(NodeKind::Code).with_text(content);
        if let Some(lang) = lang {
            code.set_attr("class", format!("language-{lang}"));
        }
        self.push(
            Element::new(NodeKind::Pre).with_child(code).with_child(
                Element::new(NodeKind::Button)
                    .with_attr("class", "copy-code-button")
                    .with_text("Copy"),
            ),
        );
    }

    fn end_image(&mut self) {
        let Some(PendingImage { src, alt }) = self.image.take() else {
            return;
        };
        if self.defer_images && self.link_depth == 0 {
            let id = format!("embed-{}", self.embeds.len());
            self.push(
                Element::new(NodeKind::Span)
                    .with_attr("class", format!("{EMBED_CLASS} {IMAGE_EMBED_CLASS}"))
                    .with_attr("src", src)
                    .with_attr("alt", alt)
                    .with_attr(EMBED_ID_ATTR, id.clone()),
            );
            self.embeds.push(id);
        } else {
            self.push(
                Element::new(NodeKind::Image)
                    .with_attr("src", src)
                    .with_attr("alt", alt),
            );
        }
    }

    fn task_marker(&mut self, checked: bool) {
        if let Some(item) = self.stack.last_mut() {
            item.add_class("task-list-item");
            item.set_attr("data-task", if checked { "x" } else { " " });
        }
        let mut checkbox = Element::new(NodeKind::Input)
            .with_attr("class", "task-list-item-checkbox")
            .with_attr("type", "checkbox");
        if checked {
            checkbox.set_attr("checked", "");
        }
        self.push(checkbox);
    }
}
