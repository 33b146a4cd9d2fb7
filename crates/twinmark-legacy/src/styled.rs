//! Reference legacy generator emitting inline-styled markup.

use std::sync::RwLock;

use async_trait::async_trait;
use twinmark_cache::{Cache, CacheBucket, CacheBucketExt};
use twinmark_dom::{Node, NodeKind, escape_html, outer_html};
use twinmark_preprocess::{
    escape_unsafe_links, escape_wikilinks, rewrite_image_embeds, strip_math_fence_indent,
};

use crate::backend::{RenderBackend, open_tag, write_open_tag};
use crate::callout::CalloutInfo;
use crate::generator::{LegacyError, LegacyGenerator};
use crate::highlight::{Highlighter, PlainHighlighter};
use crate::renderer::MarkdownRenderer;
use crate::theme::Theme;
use crate::{postprocess, url};

/// Cache bucket mapping local image paths to uploaded URLs.
pub const UPLOADS_BUCKET: &str = "uploads";

/// [`RenderBackend`] that defers every dialect decision to a
/// [`LegacyGenerator`].
pub struct StyledBackend<'a, G: LegacyGenerator + ?Sized> {
    generator: &'a G,
}

impl<'a, G: LegacyGenerator + ?Sized> StyledBackend<'a, G> {
    #[must_use]
    pub fn new(generator: &'a G) -> Self {
        Self { generator }
    }
}

impl<G: LegacyGenerator + ?Sized> RenderBackend for StyledBackend<'_, G> {
    fn inline_style(&self, kind: &NodeKind) -> Option<String> {
        self.generator.inline_style(kind)
    }

    fn code_block(&self, lang: Option<&str>, content: &str, out: &mut String) {
        out.push_str(&self.generator.create_code_block(content, lang));
    }

    fn callout_start(&self, info: &CalloutInfo, out: &mut String) {
        out.push_str(&self.generator.render_callout_open(info));
    }

    fn callout_end(&self, info: &CalloutInfo, out: &mut String) {
        out.push_str(&self.generator.render_callout_close(info));
    }

    fn image(&self, src: &str, alt: &str, in_link: bool, out: &mut String) {
        let Some(valid) = self.generator.validate_link(src, true) else {
            return;
        };
        let src = url::canonicalize(&valid);

        if !self.generator.is_image_url(&src) {
            write_open_tag(&NodeKind::Image, &[("src", &src), ("alt", alt)], None, out);
        } else if in_link {
            open_tag(self, &NodeKind::Image, &[("src", &src), ("alt", alt)], out);
        } else {
            let caption = if alt.trim().is_empty() {
                self.generator.extract_file_name(&src)
            } else {
                alt.to_owned()
            };
            let resolved = self.generator.resolve_image_path(&src);
            out.push_str(&self.generator.render_figure(&resolved, alt, &caption));
        }
    }

    fn link_target(&self, url: &str) -> Option<String> {
        self.generator
            .validate_link(url, false)
            .map(|valid| url::canonicalize(&valid).into_owned())
    }

    fn text(&self, text: &str, out: &mut String) {
        for node in self.generator.render_inline_text(text) {
            match node {
                Node::Element(mut el) => {
                    if let Some(style) = self.generator.inline_style(&el.kind) {
                        el.set_attr("style", style);
                    }
                    out.push_str(&outer_html(&el));
                }
                Node::Text(text) => out.push_str(&escape_html(&text)),
                Node::Raw(html) => out.push_str(&html),
            }
        }
    }
}

/// Legacy generator built on [`MarkdownRenderer`] and a [`Theme`].
pub struct StyledGenerator {
    theme: Theme,
    highlighter: Box<dyn Highlighter>,
    uploads: Option<Box<dyn CacheBucket>>,
    source_path: RwLock<String>,
    sanitizer: ammonia::Builder<'static>,
}

impl StyledGenerator {
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self {
            theme,
            highlighter: Box::new(PlainHighlighter),
            uploads: None,
            source_path: RwLock::new(String::new()),
            sanitizer: postprocess::sanitizer(),
        }
    }

    /// Use a syntax highlighter for code listings.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: impl Highlighter + 'static) -> Self {
        self.highlighter = Box::new(highlighter);
        self
    }

    /// Look image paths up in the [`UPLOADS_BUCKET`] of `cache`.
    #[must_use]
    pub fn with_upload_cache(mut self, cache: &dyn Cache) -> Self {
        self.uploads = Some(cache.bucket(UPLOADS_BUCKET));
        self
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    fn source_path(&self) -> String {
        self.source_path
            .read()
            .map(|path| path.clone())
            .unwrap_or_default()
    }

    fn render(&self, markdown: &str) -> String {
        let markdown = markdown.replace("\r\n", "\n");
        let markdown = strip_math_fence_indent(&markdown);
        let markdown = rewrite_image_embeds(&markdown);
        let markdown = self.strip_frontmatter(&markdown);
        let markdown = escape_unsafe_links(&markdown);
        let markdown = escape_wikilinks(&markdown);

        let backend = StyledBackend::new(self);
        let html = MarkdownRenderer::new(&backend).render_markdown(&markdown);
        self.post_process(&html)
    }
}

impl Default for StyledGenerator {
    fn default() -> Self {
        Self::new(Theme::default())
    }
}

#[async_trait]
impl LegacyGenerator for StyledGenerator {
    async fn convert(&self, markdown: &str) -> Result<String, LegacyError> {
        let html = self.render(markdown);
        tracing::debug!(
            source_path = %self.source_path(),
            bytes = html.len(),
            "Legacy render complete"
        );
        Ok(html)
    }

    fn update_source_path(&self, path: &str) {
        match self.source_path.write() {
            Ok(mut guard) => path.clone_into(&mut guard),
            Err(poisoned) => path.clone_into(&mut poisoned.into_inner()),
        }
    }

    fn inline_style(&self, kind: &NodeKind) -> Option<String> {
        self.theme.inline_style(kind)
    }

    fn render_callout_open(&self, info: &CalloutInfo) -> String {
        let (outer, title, body) = self.theme.callout_styles();
        let kind: String = info
            .kind
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
            .collect();
        format!(
            concat!(
                r#"<section class="tm-admonition tm-admonition-{kind}" style="{outer}">"#,
                r#"<section class="tm-admonition-title" style="{title_style}">"#,
                r#"<span class="tm-admonition-icon">{icon}</span> {title}</section>"#,
                r#"<section class="tm-admonition-body" style="{body}">"#,
            ),
            kind = kind,
            outer = escape_html(&outer),
            title_style = escape_html(&title),
            icon = escape_html(&info.icon),
            title = escape_html(&info.title),
            body = escape_html(&body),
        )
    }

    fn render_callout_close(&self, _info: &CalloutInfo) -> String {
        "</section></section>".to_owned()
    }

    fn create_code_block(&self, content: &str, lang: Option<&str>) -> String {
        let code = content.strip_suffix('\n').unwrap_or(content);
        let highlighted = self.highlighter.highlight(code, lang);
        let class = lang
            .map(|lang| format!(r#" class="language-{}""#, escape_html(lang)))
            .unwrap_or_default();
        let pre_style = self
            .theme
            .inline_style(&NodeKind::Pre)
            .map(|style| format!(r#" style="{}""#, escape_html(&style)))
            .unwrap_or_default();
        format!(
            r#"<section class="tm-code" style="{}"><pre{pre_style}><code{class}>{highlighted}</code></pre></section>"#,
            escape_html(&self.theme.code_block_style()),
        )
    }

    fn render_figure(&self, src: &str, alt: &str, caption: &str) -> String {
        let mut out = String::new();
        open_tag(&StyledBackend::new(self), &NodeKind::Figure, &[], &mut out);
        if let Some(header) = &self.theme.figure_header {
            write_open_tag(
                &NodeKind::Other("header".to_owned()),
                &[],
                Some(&self.theme.figure_header_style()),
                &mut out,
            );
            out.push_str(&escape_html(header));
            out.push_str("</header>");
        }
        write_open_tag(
            &NodeKind::Image,
            &[("src", src), ("alt", alt)],
            self.theme.inline_style(&NodeKind::Image).as_deref(),
            &mut out,
        );
        if !caption.is_empty() {
            write_open_tag(
                &NodeKind::Figcaption,
                &[],
                self.theme.inline_style(&NodeKind::Figcaption).as_deref(),
                &mut out,
            );
            out.push_str(&escape_html(caption));
            out.push_str("</figcaption>");
        }
        out.push_str("</figure>");
        out
    }

    fn resolve_image_path(&self, src: &str) -> String {
        let key = if url::is_relative(src) && !src.starts_with('/') {
            url::resolve_relative(src, &self.source_path())
        } else {
            src.to_owned()
        };
        self.uploads
            .as_ref()
            .and_then(|bucket| bucket.get_string(&key, ""))
            .unwrap_or(key)
    }

    fn sanitize(&self, html: &str) -> String {
        self.sanitizer.clean(html).to_string()
    }
}
