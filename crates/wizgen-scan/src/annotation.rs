//! Annotation parser
//!
//! Turns a marked doc-comment block into a manifest entry. Block lines are
//! tokenized into tags (`@title inline text` plus continuation lines); the
//! known tags fill the entry fields and anything else is reported.
//!
//! The `@props` body is a list of paragraphs, each introduced by a line
//! starting with `- `. Inside a paragraph every `key: value` line becomes one
//! field of the prop; the value keeps any further colons.

use std::sync::Arc;
use tracing::trace;
use wizgen_manifest::{slugify, Diagnostic, PropDescriptor, SkipReason, WizardEntry};

use crate::extractor::{is_marked, is_tag_char, RawCommentBlock};

/// Tags that map onto entry fields
pub const KNOWN_TAGS: &[&str] = &["name", "description", "tags", "category", "props"];

// =============================================================================
// TOKENIZER
// =============================================================================

/// One `@title` tag and the lines that belong to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationTag<'a> {
    pub title: &'a str,
    /// Source line of the `@title`
    pub line: usize,
    /// Inline text first, then continuation lines up to the next tag
    lines: Vec<&'a str>,
}

impl<'a> AnnotationTag<'a> {
    /// Text on the tag line itself
    pub fn inline(&self) -> &'a str {
        self.lines.first().copied().unwrap_or_default()
    }

    /// Inline text and continuation lines joined, trimmed
    pub fn text(&self) -> String {
        self.lines.join("\n").trim().to_string()
    }

    /// Lines with their source line numbers
    pub fn numbered_lines(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.lines
            .iter()
            .enumerate()
            .map(move |(offset, text)| (self.line + offset, *text))
    }
}

/// Block split into free text and tags
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedBlock<'a> {
    /// Text before the first tag
    pub description: String,
    pub tags: Vec<AnnotationTag<'a>>,
}

impl<'a> TokenizedBlock<'a> {
    /// Last tag with the given title
    pub fn tag(&self, title: &str) -> Option<&AnnotationTag<'a>> {
        self.tags.iter().rev().find(|tag| tag.title == title)
    }
}

/// Split unwrapped block lines into tags; line `i` sits on `start_line + i`
pub fn tokenize<'a>(lines: &[&'a str], start_line: usize) -> TokenizedBlock<'a> {
    let mut leading = Vec::new();
    let mut tags: Vec<AnnotationTag<'a>> = Vec::new();

    for (offset, &line) in lines.iter().enumerate() {
        if let Some((title, inline)) = split_tag_line(line) {
            tags.push(AnnotationTag {
                title,
                line: start_line + offset,
                lines: vec![inline],
            });
        } else if let Some(current) = tags.last_mut() {
            current.lines.push(line);
        } else {
            leading.push(line);
        }
    }

    TokenizedBlock {
        description: leading.join("\n").trim().to_string(),
        tags,
    }
}

/// `@title rest` -> `(title, rest)`; the title must be non-empty
fn split_tag_line(line: &str) -> Option<(&str, &str)> {
    let rest = line.trim_start().strip_prefix('@')?;
    let end = rest.find(|ch: char| !is_tag_char(ch)).unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some((&rest[..end], rest[end..].trim()))
}

// =============================================================================
// ENTRY BUILDING
// =============================================================================

/// Result of parsing one marked block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedBlock {
    /// Entry without version, import path or file path
    pub entry: Option<WizardEntry>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse a comment block; `None` when it does not carry the marker
pub fn parse_block(block: &RawCommentBlock<'_>, file: &Arc<str>, marker: &str) -> Option<ParsedBlock> {
    let lines = block.lines();
    if !is_marked(&lines, marker) {
        return None;
    }
    Some(parse_annotation(&lines, block.start_line, file, marker))
}

/// Build an entry from the lines of a marked block
pub fn parse_annotation(
    lines: &[&str],
    start_line: usize,
    file: &Arc<str>,
    marker: &str,
) -> ParsedBlock {
    let block = tokenize(lines, start_line);
    let mut diagnostics = Vec::new();

    for tag in &block.tags {
        if tag.title != marker && !KNOWN_TAGS.iter().any(|known| *known == tag.title) {
            diagnostics.push(Diagnostic::new(
                file,
                tag.line,
                SkipReason::UnknownTag {
                    title: tag.title.to_string(),
                },
            ));
        }
    }

    let name = block.tag("name").map(tag_name).unwrap_or_default();
    if name.is_empty() {
        diagnostics.push(Diagnostic::new(file, start_line, SkipReason::MissingName));
        return ParsedBlock {
            entry: None,
            diagnostics,
        };
    }

    // Leading free text is the description unless a tag overrides it
    let description = block
        .tag("description")
        .map_or_else(|| block.description.clone(), AnnotationTag::text);

    let tags = block
        .tag("tags")
        .map(|tag| {
            tag.text()
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(Arc::from)
                .collect()
        })
        .unwrap_or_default();

    // Left empty when absent; bucket lookup applies the default
    let category = block
        .tag("category")
        .map(|tag| tag.text().to_lowercase())
        .unwrap_or_default();

    let props = block
        .tag("props")
        .map(|tag| parse_props(tag, file, &mut diagnostics))
        .unwrap_or_default();

    trace!("Parsed annotation '{}' at {}:{}", name, file, start_line);

    ParsedBlock {
        entry: Some(WizardEntry {
            id: Arc::from(slugify(&name)),
            name: Arc::from(name.as_str()),
            description: Arc::from(description.as_str()),
            tags,
            category: Arc::from(category.as_str()),
            props,
            ..Default::default()
        }),
        diagnostics,
    }
}

/// Name from the inline text, or the first body line when the tag line is bare
fn tag_name(tag: &AnnotationTag<'_>) -> String {
    let inline = tag.inline().trim();
    if !inline.is_empty() {
        return inline.to_string();
    }
    tag.text().lines().next().unwrap_or_default().trim().to_string()
}

// =============================================================================
// PROPS
// =============================================================================

/// Parse the `@props` body into one descriptor per paragraph
///
/// Blank lines are ignored. Lines without a colon, or with an empty key or
/// value, are skipped and reported. A paragraph with no usable lines is
/// dropped and reported.
pub fn parse_props(
    tag: &AnnotationTag<'_>,
    file: &Arc<str>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<PropDescriptor> {
    let mut paragraphs: Vec<Vec<(usize, &str)>> = Vec::new();

    for (line, raw) in tag.numbered_lines() {
        let text = raw.trim();
        if let Some(rest) = text.strip_prefix("- ").or_else(|| (text == "-").then_some("")) {
            paragraphs.push(vec![(line, rest.trim_start())]);
        } else if let Some(current) = paragraphs.last_mut() {
            current.push((line, text));
        } else if !text.is_empty() {
            paragraphs.push(vec![(line, text)]);
        }
    }

    let mut props = Vec::with_capacity(paragraphs.len());
    for paragraph in paragraphs {
        let mut prop = PropDescriptor::new();
        let mut has_content = false;

        for (line, text) in &paragraph {
            if text.is_empty() {
                continue;
            }
            has_content = true;

            match text.split_once(':') {
                Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
                    prop.set(key.trim(), value.trim());
                }
                _ => diagnostics.push(Diagnostic::new(
                    file,
                    *line,
                    SkipReason::MalformedPropLine {
                        text: (*text).to_string(),
                    },
                )),
            }
        }

        if !prop.is_empty() {
            props.push(prop);
        } else if has_content {
            let line = paragraph.first().map_or(tag.line, |(line, _)| *line);
            diagnostics.push(Diagnostic::new(file, line, SkipReason::EmptyPropParagraph));
        }
    }

    props
}
