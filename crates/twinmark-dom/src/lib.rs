//! Rendered node tree for twinmark.
//!
//! Host engines render Markdown into an [`Element`] tree held by a
//! [`RenderTarget`]; the transcoder rewrites that tree in place and
//! serializes it with [`inner_html`].
//!
//! Node kinds form a closed [`NodeKind`] enum so that every pass that
//! dispatches on the kind of a node is an exhaustive `match`.
//!
//! # Example
//!
//! ```
//! use twinmark_dom::{Element, Node, NodeKind, inner_html};
//!
//! let root = Element::new(NodeKind::Div).with_children(vec![
//!     Element::new(NodeKind::Paragraph)
//!         .with_attr("dir", "auto")
//!         .with_text("a < b")
//!         .into(),
//! ]);
//!
//! assert_eq!(inner_html(&root), r#"<p dir="auto">a &lt; b</p>"#);
//! ```

pub mod embed;
mod kind;
mod node;
mod serialize;
mod target;

pub use kind::NodeKind;
pub use node::{Element, Node};
pub use serialize::{escape_html, inner_html, outer_html};
pub use target::RenderTarget;
