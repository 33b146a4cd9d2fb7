//! Host node tree to legacy markup.
//!
//! A host engine renders Markdown into its own node tree: ids, `dir`
//! attributes, `data-*` bookkeeping, callout `div`s, bare code blocks and
//! images. [`Transcoder`] rewrites that tree into the exact markup the
//! legacy generator produces, using the generator itself for every piece of
//! dialect-specific markup:
//!
//! 1. Embed placeholders become images.
//! 2. Host callouts become legacy callout sections.
//! 3. Host-only attributes are stripped.
//! 4. Strike-through spellings become `del`.
//! 5. Unsafe elements are removed.
//! 6. Text gets typography and autolinks.
//! 7. Link and image targets are validated.
//! 8. Code blocks get the legacy listing markup.
//! 9. Standalone images become figures.
//! 10. Elements get inline styles.
//! 11. Attributes are stripped again, keeping only what legacy markup carries.
//! 12. Block text edges are trimmed.
//! 13. The markup runs through the legacy post-processing chain.

mod passes;

use twinmark_dom::{Element, inner_html};
use twinmark_legacy::LegacyGenerator;

/// Rewrites host node trees into legacy markup.
pub struct Transcoder<'g> {
    generator: &'g dyn LegacyGenerator,
}

impl<'g> Transcoder<'g> {
    #[must_use]
    pub fn new(generator: &'g dyn LegacyGenerator) -> Self {
        Self { generator }
    }

    /// Transcode the children of `root` into sanitized legacy markup.
    #[must_use]
    pub fn transcode(&self, root: &Element) -> String {
        let mut tree = root.clone();
        self.reshape(&mut tree);
        let html = inner_html(&tree);
        let html = self.generator.post_process(&html);
        tracing::debug!(bytes = html.len(), "Transcoded host tree");
        html
    }

    /// Apply every tree pass in place, without serializing.
    pub fn reshape(&self, root: &mut Element) {
        let generator = self.generator;

        passes::materialize_embeds(root);
        passes::convert_callouts(root, generator);
        passes::strip_host_attributes(root);
        passes::normalize_strikethrough(root);
        passes::remove_unsafe(root);
        passes::apply_typography(root, generator);
        passes::validate_urls(root, generator);
        passes::replace_code_blocks(root, generator);
        passes::replace_figures(root, generator);
        passes::apply_styles(root, generator);
        passes::strip_final_attributes(root);
        passes::trim_block_text(root);
    }
}
