//! Markdown rewriting applied before the host-native render.
//!
//! The host engine and the legacy generator disagree on a handful of
//! dialect details. [`Preprocessor`] rewrites the source so that the host
//! engine produces the legacy shape:
//!
//! 1. `$$` markers lose their indentation so they are not read as code.
//! 2. `![[image.png|alt]]` embeds become standard images.
//! 3. A front matter block is stripped through an injected hook.
//! 4. `javascript:` / `vbscript:` links are escaped.
//! 5. `[[Target]]` references are escaped so the host does not resolve them.
//! 6. Soft line breaks become hard breaks.
//!
//! Fenced code, math blocks and inline code spans are never rewritten.
//!
//! # Example
//!
//! ```
//! use twinmark_preprocess::Preprocessor;
//!
//! let pre = Preprocessor::new();
//! assert_eq!(pre.process("one\ntwo"), "one  \ntwo");
//! assert_eq!(pre.process("see [[Page]]"), r"see \[\[Page\]\]");
//! ```

use std::fmt;
use std::sync::Arc;

mod breaks;
mod code_span;
mod fence;
mod rules;

pub use breaks::promote_soft_breaks;
pub use rules::{escape_unsafe_links, escape_wikilinks, rewrite_image_embeds, strip_math_fence_indent};

/// Hook removing a leading front matter block.
pub type FrontmatterStripper = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Ordered Markdown rewrite rules.
#[derive(Clone, Default)]
pub struct Preprocessor {
    strip_frontmatter: Option<FrontmatterStripper>,
}

impl Preprocessor {
    /// Create a preprocessor without a front matter hook.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Strip front matter with `hook`, normally the legacy generator's.
    #[must_use]
    pub fn with_frontmatter_stripper(
        mut self,
        hook: impl Fn(&str) -> String + Send + Sync + 'static,
    ) -> Self {
        self.strip_frontmatter = Some(Arc::new(hook));
        self
    }

    /// Apply every rule in order.
    ///
    /// Line endings are normalized to `\n` first.
    #[must_use]
    pub fn process(&self, markdown: &str) -> String {
        let text = markdown.replace("\r\n", "\n");
        let text = strip_math_fence_indent(&text);
        let text = rewrite_image_embeds(&text);
        let text = match &self.strip_frontmatter {
            Some(hook) => hook(&text),
            None => text,
        };
        let text = escape_unsafe_links(&text);
        let text = escape_wikilinks(&text);
        promote_soft_breaks(&text)
    }
}

impl fmt::Debug for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preprocessor")
            .field("strip_frontmatter", &self.strip_frontmatter.is_some())
            .finish()
    }
}
