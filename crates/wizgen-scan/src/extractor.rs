//! Doc-comment block extraction
//!
//! Finds every `/** ... */` block in a source file, non-overlapping and in
//! order, and strips the comment decoration from each line. A block only
//! becomes an annotation when one of its lines carries the marker tag.

/// A doc-comment block as it appears in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCommentBlock<'a> {
    /// 1-based line of the opening `/**`
    pub start_line: usize,
    /// Text between `/**` and `*/`
    pub body: &'a str,
}

impl<'a> RawCommentBlock<'a> {
    /// Comment lines with the leading `*` decoration removed
    ///
    /// Line `i` of the result sits on source line `start_line + i`.
    pub fn lines(&self) -> Vec<&'a str> {
        unwrap_block(self.body)
    }
}

/// Find all `/** ... */` blocks in `text`
///
/// An unterminated block at the end of the file is ignored.
pub fn extract_blocks(text: &str) -> Vec<RawCommentBlock<'_>> {
    let mut blocks = Vec::new();
    let mut cursor = 0;
    let mut line = 1;

    while let Some(offset) = text[cursor..].find("/**") {
        let open = cursor + offset;
        line += count_newlines(&text[cursor..open]);

        let body_start = open + 3;
        let Some(close_offset) = text[body_start..].find("*/") else {
            break;
        };
        let body_end = body_start + close_offset;
        let body = &text[body_start..body_end];

        blocks.push(RawCommentBlock {
            start_line: line,
            body,
        });

        line += count_newlines(&text[open..body_end]);
        cursor = body_end + 2;
    }

    blocks
}

/// Strip comment decoration: leading whitespace, one `*`, and one space
pub fn unwrap_block(body: &str) -> Vec<&str> {
    body.lines()
        .map(|line| {
            let line = line.trim_start();
            let line = line.strip_prefix('*').unwrap_or(line);
            let line = line
                .strip_prefix(' ')
                .or_else(|| line.strip_prefix('\t'))
                .unwrap_or(line);
            line.trim_end()
        })
        .collect()
}

/// Whether any line of the block starts with `@<marker>` as a whole tag
pub fn is_marked(lines: &[&str], marker: &str) -> bool {
    lines.iter().any(|line| {
        line.trim_start()
            .strip_prefix('@')
            .and_then(|rest| rest.strip_prefix(marker))
            .is_some_and(|rest| !rest.starts_with(is_tag_char))
    })
}

pub(crate) fn is_tag_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-'
}

fn count_newlines(text: &str) -> usize {
    text.bytes().filter(|b| *b == b'\n').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "import React from 'react';\n\
/**\n\
 * @wizard\n\
 * @name DeviceCard\n\
 */\n\
export function DeviceCard() {}\n\
\n\
/** plain doc */\n\
const x = 1; /* not a doc */\n";

    #[test]
    fn test_extract_blocks_with_lines() {
        let blocks = extract_blocks(SOURCE);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].start_line, 2);
        assert_eq!(blocks[1].start_line, 8);
        assert_eq!(blocks[1].body, " plain doc ");
    }

    #[test]
    fn test_unwrap_block_strips_decoration() {
        let blocks = extract_blocks(SOURCE);
        let lines = blocks[0].lines();
        assert_eq!(lines, vec!["", "@wizard", "@name DeviceCard"]);
    }

    #[test]
    fn test_unwrap_keeps_indentation_after_star() {
        let lines = unwrap_block("\n *   - nested\n *\tvalue: x\n");
        assert_eq!(lines, vec!["", "  - nested", "value: x"]);
    }

    #[test]
    fn test_marker_must_be_whole_tag() {
        assert!(is_marked(&["", "@wizard"], "wizard"));
        assert!(is_marked(&["  @wizard extra"], "wizard"));
        assert!(!is_marked(&["@wizardry"], "wizard"));
        assert!(!is_marked(&["uses the wizard"], "wizard"));
        assert!(!is_marked(&["see @name"], "wizard"));
    }

    #[test]
    fn test_unterminated_and_empty_blocks() {
        assert!(extract_blocks("/** never closed").is_empty());
        // `/**/` is an ordinary empty comment, not a doc block
        assert!(extract_blocks("/**/ const a = 1;").is_empty());

        let blocks = extract_blocks("/***/");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body, "");
    }

    #[test]
    fn test_blocks_do_not_overlap() {
        let text = "/** a */ /** b\n */";
        let bodies: Vec<&str> = extract_blocks(text).iter().map(|b| b.body).collect();
        assert_eq!(bodies, vec![" a ", " b\n "]);
    }
}
