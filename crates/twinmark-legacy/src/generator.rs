//! Legacy generator contract.

use async_trait::async_trait;
use twinmark_dom::{Node, NodeKind};

use crate::callout::CalloutInfo;
use crate::{frontmatter, postprocess, typography, url};

/// Error produced by a legacy generator.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum LegacyError {
    /// Conversion failed.
    #[error("legacy conversion failed: {0}")]
    Convert(String),
    /// A collaborator the generator depends on is missing.
    #[error("legacy generator unavailable: {0}")]
    Unavailable(String),
}

/// Text-to-markup generator of the legacy dialect.
///
/// Besides [`convert`](Self::convert), the trait exposes the generator's
/// building blocks so the transcoder can reshape host output with exactly
/// the same markup, styles and post-processing.
///
/// The source path is mutable state: callers set it with
/// [`update_source_path`](Self::update_source_path) right before each
/// conversion and must not run two renders on one generator at once.
#[async_trait]
pub trait LegacyGenerator: Send + Sync {
    /// Convert Markdown into sanitized legacy markup.
    async fn convert(&self, markdown: &str) -> Result<String, LegacyError>;

    /// Set the path relative links and images are resolved against.
    fn update_source_path(&self, path: &str);

    /// Inline style for an element kind.
    fn inline_style(&self, kind: &NodeKind) -> Option<String>;

    /// Opening markup of a callout, up to the body.
    fn render_callout_open(&self, info: &CalloutInfo) -> String;

    /// Closing markup matching [`render_callout_open`](Self::render_callout_open).
    fn render_callout_close(&self, info: &CalloutInfo) -> String;

    /// Complete styled markup of a code listing.
    fn create_code_block(&self, content: &str, lang: Option<&str>) -> String;

    /// Complete figure markup for a standalone image.
    fn render_figure(&self, src: &str, alt: &str, caption: &str) -> String;

    /// Final image source for `src`, e.g. resolved against the source path
    /// or replaced by an uploaded URL.
    fn resolve_image_path(&self, src: &str) -> String;

    /// Safe form of a link target, `None` when it must not be emitted.
    fn validate_link(&self, url: &str, is_image: bool) -> Option<String> {
        url::validate_link(url, is_image)
    }

    /// Caption fallback derived from an image source.
    fn extract_file_name(&self, src: &str) -> String {
        url::extract_file_name(src)
    }

    fn strip_frontmatter(&self, markdown: &str) -> String {
        frontmatter::strip_frontmatter(markdown)
    }

    /// Typography and autolinks for a plain text run.
    fn render_inline_text(&self, text: &str) -> Vec<Node> {
        typography::render_inline_text(text)
    }

    fn is_image_url(&self, src: &str) -> bool {
        url::is_image_url(src)
    }

    fn unwrap_list_paragraphs(&self, html: &str) -> String {
        postprocess::unwrap_list_paragraphs(html)
    }

    fn unwrap_figures(&self, html: &str) -> String {
        postprocess::unwrap_figures(html)
    }

    fn fix_blockquote_margins(&self, html: &str) -> String {
        postprocess::fix_blockquote_margins(html)
    }

    fn fix_math_tags(&self, html: &str) -> String {
        postprocess::fix_math_tags(html)
    }

    fn sanitize(&self, html: &str) -> String {
        postprocess::sanitize(html)
    }

    /// Run every post-processing hook in order, sanitizing last.
    fn post_process(&self, html: &str) -> String {
        let html = self.unwrap_list_paragraphs(html);
        let html = self.unwrap_figures(&html);
        let html = self.fix_blockquote_margins(&html);
        let html = self.fix_math_tags(&html);
        self.sanitize(&html)
    }
}
