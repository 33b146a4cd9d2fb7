//! Syntax highlighting seam for code listings.

use twinmark_dom::escape_html;

/// Turns source code into escaped, optionally highlighted markup.
///
/// Implementations must escape the code; the returned string is inserted
/// into the listing verbatim.
pub trait Highlighter: Send + Sync {
    fn highlight(&self, code: &str, lang: Option<&str>) -> String;
}

/// Escapes code without highlighting.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
    fn highlight(&self, code: &str, _lang: Option<&str>) -> String {
        escape_html(code)
    }
}
