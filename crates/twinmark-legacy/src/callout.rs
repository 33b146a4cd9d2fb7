//! Callout metadata shared by both dialects.
//!
//! Callouts are written as blockquotes whose first line is a header:
//! `> [!kind]`, an optional `+`/`-` fold marker, and an optional title.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Tag, TagEnd};
use regex::Regex;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\[!([\w-]+)\]([+-])?(?:[ \t]+(.*)|$)").unwrap());

/// Icon used for callout kinds missing from the table.
pub const FALLBACK_ICON: &str = "📌";

/// Kind keyword, icon, label. Aliases point at the same icon and label.
const CALLOUT_TABLE: &[(&str, &str, &str)] = &[
    ("note", "📝", "Note"),
    ("abstract", "📋", "Abstract"),
    ("summary", "📋", "Summary"),
    ("tldr", "📋", "TL;DR"),
    ("info", "ℹ️", "Info"),
    ("todo", "☑️", "Todo"),
    ("tip", "💡", "Tip"),
    ("hint", "💡", "Hint"),
    ("important", "🔥", "Important"),
    ("success", "✅", "Success"),
    ("check", "✅", "Check"),
    ("done", "✅", "Done"),
    ("question", "❓", "Question"),
    ("help", "❓", "Help"),
    ("faq", "❓", "FAQ"),
    ("warning", "⚠️", "Warning"),
    ("caution", "⚠️", "Caution"),
    ("attention", "⚠️", "Attention"),
    ("failure", "❌", "Failure"),
    ("fail", "❌", "Fail"),
    ("missing", "❌", "Missing"),
    ("danger", "⚡", "Danger"),
    ("error", "⚡", "Error"),
    ("bug", "🐛", "Bug"),
    ("example", "📑", "Example"),
    ("quote", "💬", "Quote"),
    ("cite", "💬", "Cite"),
];

/// Callout block description, derived from either dialect's markup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalloutInfo {
    /// Lowercase kind keyword, e.g. `tip`.
    pub kind: String,
    /// Title shown in the header, the label when none was given.
    pub title: String,
    pub icon: String,
    pub label: String,
}

impl CalloutInfo {
    /// Look up icon and label for `kind`.
    ///
    /// Unknown kinds get [`FALLBACK_ICON`] and a capitalized label. An empty
    /// or missing title falls back to the label.
    #[must_use]
    pub fn new(kind: &str, title: Option<&str>) -> Self {
        let kind = kind.trim().to_lowercase();
        let (icon, label) = match CALLOUT_TABLE.iter().find(|(k, _, _)| *k == kind) {
            Some((_, icon, label)) => ((*icon).to_owned(), (*label).to_owned()),
            None => (FALLBACK_ICON.to_owned(), capitalize(&kind)),
        };
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map_or_else(|| label.clone(), str::to_owned);

        Self {
            kind,
            title,
            icon,
            label,
        }
    }
}

/// Callout header found at the start of a blockquote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CalloutHeader {
    pub info: CalloutInfo,
    /// `+` or `-` for foldable callouts.
    pub fold: Option<char>,
    /// Number of events making up the header.
    pub consumed: usize,
    /// Whether the first paragraph goes on after the header line.
    pub continues_paragraph: bool,
}

impl CalloutHeader {
    /// Parse the header from the events following a blockquote start.
    ///
    /// The header is the first line of the first paragraph. Inline markup in
    /// the title is flattened to its text.
    #[must_use]
    pub fn parse(events: &[Event<'_>]) -> Option<Self> {
        let [Event::Start(Tag::Paragraph), Event::Text(first), rest @ ..] = events else {
            return None;
        };
        let caps = HEADER_RE.captures(first)?;
        let kind = caps.get(1).map_or("", |m| m.as_str());
        let fold = caps.get(2).and_then(|m| m.as_str().chars().next());
        let mut title = caps.get(3).map_or_else(String::new, |m| m.as_str().to_owned());

        let mut consumed = 2;
        let mut depth = 0usize;
        let mut continues_paragraph = false;
        for event in rest {
            consumed += 1;
            match event {
                Event::End(TagEnd::Paragraph) => break,
                Event::SoftBreak | Event::HardBreak if depth == 0 => {
                    continues_paragraph = true;
                    break;
                }
                Event::SoftBreak | Event::HardBreak => title.push(' '),
                Event::Start(_) => depth += 1,
                Event::End(_) => depth = depth.saturating_sub(1),
                Event::Text(text) | Event::Code(text) | Event::InlineMath(text) => {
                    title.push_str(text);
                }
                _ => {}
            }
        }

        Some(Self {
            info: CalloutInfo::new(kind, Some(&title)),
            fold,
            consumed,
            continues_paragraph,
        })
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
