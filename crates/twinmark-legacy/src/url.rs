//! URL helpers: validation, canonical encoding, file names.

use std::borrow::Cow;
use std::sync::LazyLock;

use percent_encoding::{CONTROLS, percent_decode_str, utf8_percent_encode};
use regex::Regex;

static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z][a-zA-Z0-9+.-]*):").unwrap());

const BLOCKED_SCHEMES: &[&str] = &["javascript", "vbscript", "data", "file"];

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "svg", "webp", "avif", "ico", "tif", "tiff",
];

/// URL scheme in lowercase, if any.
fn scheme(url: &str) -> Option<String> {
    SCHEME_RE
        .captures(url)
        .map(|caps| caps[1].to_ascii_lowercase())
}

/// Whether `url` is a relative reference (no scheme, not protocol-relative).
#[must_use]
pub fn is_relative(url: &str) -> bool {
    scheme(url).is_none() && !url.starts_with("//")
}

/// Check a link or image target.
///
/// Returns the trimmed URL, or `None` for empty targets and blocked schemes.
/// Control characters inside the scheme do not hide it.
#[must_use]
pub fn validate_link(url: &str, _is_image: bool) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let compact: String = trimmed.chars().filter(|c| !c.is_control() && !c.is_whitespace()).collect();
    if let Some(scheme) = scheme(&compact)
        && BLOCKED_SCHEMES.contains(&scheme.as_str())
    {
        tracing::debug!(url = trimmed, "Rejected link");
        return None;
    }
    Some(trimmed.to_owned())
}

/// Percent-encode non-ASCII characters of relative paths.
///
/// Absolute URLs and already-ASCII paths are returned unchanged.
#[must_use]
pub fn canonicalize(url: &str) -> Cow<'_, str> {
    if url.is_ascii() || !is_relative(url) {
        return Cow::Borrowed(url);
    }
    Cow::Owned(utf8_percent_encode(url, CONTROLS).to_string())
}

/// Whether `src` points at an image file.
#[must_use]
pub fn is_image_url(src: &str) -> bool {
    let path = strip_query(src);
    if path.to_ascii_lowercase().starts_with("data:image/") {
        return true;
    }
    path.rsplit_once('.').is_some_and(|(_, ext)| {
        !ext.contains('/')
            && IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
    })
}

/// Display name of a file: last path segment, percent-decoded, without
/// extension.
///
/// Decoding never fails: invalid UTF-8 after decoding keeps the raw text.
#[must_use]
pub fn extract_file_name(src: &str) -> String {
    let path = strip_query(src);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let decoded = percent_decode_str(segment)
        .decode_utf8()
        .map_or_else(|_| segment.to_owned(), Cow::into_owned);
    match decoded.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_owned(),
        _ => decoded,
    }
}

fn strip_query(src: &str) -> &str {
    let end = src.find(['?', '#']).unwrap_or(src.len());
    &src[..end]
}

/// Resolve a relative path against the directory of `source_path`.
///
/// Handles `.` (current) and `..` (parent); `..` never climbs above the
/// root.
#[must_use]
pub fn resolve_relative(relative: &str, source_path: &str) -> String {
    let dir = source_path.rsplit_once('/').map_or("", |(dir, _)| dir);
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();

    for component in relative.split('/') {
        match component {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(component),
        }
    }

    segments.join("/")
}
