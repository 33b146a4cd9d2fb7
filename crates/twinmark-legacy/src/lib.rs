//! Legacy styled-markup dialect.
//!
//! The publishing surface accepts a narrow dialect: inline styles instead of
//! stylesheets, figures for images, sectioned callouts and code listings.
//! This crate holds:
//!
//! - the [`LegacyGenerator`] contract, which exposes both the whole
//!   conversion and its building blocks so the host-native path can reuse
//!   them;
//! - [`StyledGenerator`], a reference implementation built on a
//!   pulldown-cmark event renderer ([`MarkdownRenderer`]) with a pluggable
//!   [`RenderBackend`];
//! - the helpers both paths share: [`Theme`] styles, callout metadata, URL
//!   validation, typography and the post-processing chain.
//!
//! # Example
//!
//! ```
//! use twinmark_legacy::{LegacyGenerator, StyledGenerator};
//!
//! let generator = StyledGenerator::default();
//! let figure = generator.render_figure("cat.png", "", "cat");
//! assert!(figure.starts_with("<figure style="));
//! assert!(figure.ends_with(">cat</figcaption></figure>"));
//! ```

mod backend;
pub mod callout;
mod frontmatter;
mod generator;
mod highlight;
pub mod postprocess;
mod renderer;
mod state;
mod styled;
mod theme;
mod typography;
pub mod url;

pub use backend::{RenderBackend, open_tag, write_open_tag};
pub use callout::{CalloutHeader, CalloutInfo, FALLBACK_ICON};
pub use frontmatter::strip_frontmatter;
pub use generator::{LegacyError, LegacyGenerator};
pub use highlight::{Highlighter, PlainHighlighter};
pub use renderer::{MarkdownRenderer, fence_language, parser_options};
pub use state::alignment_name;
pub use styled::{StyledBackend, StyledGenerator, UPLOADS_BUCKET};
pub use theme::{Theme, with_alignment};
pub use typography::{render_inline_text, smarten};
