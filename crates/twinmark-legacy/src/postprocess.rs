//! Post-processing shared by both render paths.
//!
//! Each hook is a plain string rewrite so that the legacy generator and the
//! transcoder finish through exactly the same code, ending with one
//! sanitizer.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

static LIST_PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(<li\b[^>]*>)\s*<p\b[^>]*>([\s\S]*?)</p>").unwrap());

static FIGURE_PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<p\b[^>]*>\s*((?:<figure\b[\s\S]*?</figure>\s*)+)</p>").unwrap()
});

static EMPTY_PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<p\b[^>]*>(?:\s|<br>)*</p>").unwrap());

static QUOTE_OPEN_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(<blockquote\b[^>]*>)\s+").unwrap());

static QUOTE_CLOSE_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+</blockquote>").unwrap());

static INLINE_MATH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<span class="math math-inline[^"]*""#).unwrap());

static BLOCK_MATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<div class="math math-block[^"]*"([^>]*)>([\s\S]*?)</div>"#).unwrap()
});

static MATH_PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<p\b[^>]*>\s*(<section class="math-block"[^>]*>[\s\S]*?</section>)\s*</p>"#)
        .unwrap()
});

const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "del", "div", "em", "figcaption", "figure", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "i", "img", "li", "mark", "ol", "p", "pre", "s",
    "section", "span", "strike", "strong", "sub", "sup", "table", "tbody", "td", "th", "thead",
    "tr", "u", "ul",
];

/// Unwrap the first paragraph of every list item.
#[must_use]
pub fn unwrap_list_paragraphs(html: &str) -> String {
    LIST_PARAGRAPH_RE.replace_all(html, "$1$2").into_owned()
}

/// Drop paragraphs that only wrap figures.
#[must_use]
pub fn unwrap_figures(html: &str) -> String {
    FIGURE_PARAGRAPH_RE.replace_all(html, "$1").into_owned()
}

/// Remove empty paragraphs and whitespace at the inner edges of quotes.
#[must_use]
pub fn fix_blockquote_margins(html: &str) -> String {
    let html = EMPTY_PARAGRAPH_RE.replace_all(html, "");
    let html = QUOTE_OPEN_SPACE_RE.replace_all(&html, "$1");
    QUOTE_CLOSE_SPACE_RE
        .replace_all(&html, "</blockquote>")
        .into_owned()
}

/// Canonical math markup: `span.math-inline` and `section.math-block`.
#[must_use]
pub fn fix_math_tags(html: &str) -> String {
    let html = INLINE_MATH_RE.replace_all(html, r#"<span class="math-inline""#);
    let html = BLOCK_MATH_RE.replace_all(&html, r#"<section class="math-block"$1>$2</section>"#);
    MATH_PARAGRAPH_RE.replace_all(&html, "$1").into_owned()
}

/// Sanitizer accepting exactly the legacy dialect.
#[must_use]
pub fn sanitizer() -> ammonia::Builder<'static> {
    let mut builder = ammonia::Builder::default();
    builder.tags(ALLOWED_TAGS.iter().copied().collect::<HashSet<_>>());
    builder.generic_attributes(HashSet::from(["style", "class"]));
    builder.add_tag_attributes("ol", &["start"]);
    builder.link_rel(None);
    builder
}

/// Sanitize with a freshly built [`sanitizer`].
#[must_use]
pub fn sanitize(html: &str) -> String {
    sanitizer().clean(html).to_string()
}
