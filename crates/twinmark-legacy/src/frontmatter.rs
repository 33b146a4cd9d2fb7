//! Front matter removal.

/// Strip a leading `---` front matter block.
///
/// The block must start on the first line and close with a `---` or `...`
/// line. Unclosed blocks are left in place.
#[must_use]
pub fn strip_frontmatter(markdown: &str) -> String {
    let body = markdown.strip_prefix('\u{feff}').unwrap_or(markdown);
    let Some(rest) = body
        .strip_prefix("---\n")
        .or_else(|| body.strip_prefix("---\r\n"))
    else {
        return markdown.to_owned();
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        offset += line.len();
        let marker = line.trim_end();
        if marker == "---" || marker == "..." {
            return rest[offset..].trim_start_matches(['\r', '\n']).to_owned();
        }
    }
    markdown.to_owned()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_strips_block() {
        assert_eq!(strip_frontmatter("---\ntitle: x\ntags: [a]\n---\n\n# Body"), "# Body");
    }

    #[test]
    fn test_dots_terminator() {
        assert_eq!(strip_frontmatter("---\na: 1\n...\nbody"), "body");
    }

    #[test]
    fn test_unclosed_block_kept() {
        let md = "---\ntitle: x\nbody";
        assert_eq!(strip_frontmatter(md), md);
    }

    #[test]
    fn test_no_front_matter() {
        assert_eq!(strip_frontmatter("# Title\n---\n"), "# Title\n---\n");
    }
}
