//! Code fence and math fence tracking.
//!
//! Tracks whether we're inside a fenced code block or a `$$` display math
//! block so that line rewrites leave their content alone.

/// Tracks fence state during line-by-line processing.
///
/// Code fences in `CommonMark` can use backticks or tildes (three or more).
/// The closing fence must use the same character and be at least as long
/// as the opening fence. Math fences open on a line starting with `$$` and
/// close on the next line ending with `$$`; they are not recognized inside
/// code fences.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    /// Character used for the current code fence (backtick or tilde).
    fence_char: Option<char>,
    /// Length of the opening code fence (minimum length for closing).
    fence_len: usize,
    in_math: bool,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Inside a code fence or a math fence.
    pub(crate) fn in_fence(&self) -> bool {
        self.in_code_fence() || self.in_math
    }

    pub(crate) fn in_code_fence(&self) -> bool {
        self.fence_char.is_some()
    }

    /// Update fence state based on a line.
    ///
    /// Returns `true` if the line is a fence delimiter (opening or closing,
    /// code or math). A one-line `$$x$$` block counts as a delimiter without
    /// changing state.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();

        if let Some(fence_char) = self.fence_char {
            if is_closing_fence(trimmed, fence_char, self.fence_len) {
                self.fence_char = None;
                self.fence_len = 0;
                return true;
            }
            return false;
        }

        if self.in_math {
            if trimmed.trim_end().ends_with("$$") {
                self.in_math = false;
                return true;
            }
            return false;
        }

        if let Some((ch, len)) = detect_fence(trimmed) {
            self.fence_char = Some(ch);
            self.fence_len = len;
            return true;
        }

        if let Some(rest) = trimmed.strip_prefix("$$") {
            if !rest.trim_end().ends_with("$$") {
                self.in_math = true;
            }
            return true;
        }

        false
    }
}

/// Whether a line would open a code fence or a math fence.
pub(crate) fn is_opening_delimiter(line: &str) -> bool {
    let trimmed = line.trim_start();
    detect_fence(trimmed).is_some() || trimmed.starts_with("$$")
}

/// Detect if a line starts a code fence.
///
/// Returns the fence character and length if found.
fn detect_fence(trimmed: &str) -> Option<(char, usize)> {
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }

    let count = trimmed.chars().take_while(|&c| c == first).count();
    (count >= 3).then_some((first, count))
}

/// A closing fence uses the opening character, is at least as long, and
/// carries nothing but whitespace after the run.
fn is_closing_fence(trimmed: &str, expected_char: char, min_len: usize) -> bool {
    if !trimmed.starts_with(expected_char) {
        return false;
    }

    let count = trimmed.chars().take_while(|&c| c == expected_char).count();
    count >= min_len && trimmed[count..].chars().all(char::is_whitespace)
}

/// Apply `f` to every line outside code and math fences.
///
/// Fence delimiters and fenced content are copied unchanged.
pub(crate) fn map_lines_outside_fences(text: &str, mut f: impl FnMut(&str) -> String) -> String {
    let mut tracker = FenceTracker::new();
    let mut out = String::with_capacity(text.len());
    for (n, line) in text.split('\n').enumerate() {
        if n > 0 {
            out.push('\n');
        }
        let was_fenced = tracker.in_fence();
        let is_delimiter = tracker.update(line);
        if was_fenced || is_delimiter {
            out.push_str(line);
        } else {
            out.push_str(&f(line));
        }
    }
    out
}
