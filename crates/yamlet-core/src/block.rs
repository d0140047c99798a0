//! Block scalar sub-parser (`|` literal and `>` folded).
//!
//! The scanner hands over the header text (everything after the `|`/`>`
//! indicator) and the offset of the line following the header. This module
//! consumes the scalar's lines and returns the finished text plus the offset
//! where line scanning resumes.

use crate::error::{Result, YamletError};
use crate::types::{BlockStyle, Chomping};

/// Parsed block scalar header: style, chomping and optional indentation
/// indicator (`|2-`, `>+`, `|-1`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    pub style: BlockStyle,
    pub chomping: Chomping,
    pub indent_indicator: Option<usize>,
}

impl BlockHeader {
    /// Parse a header such as `|`, `>-`, `|+2 # comment`.
    ///
    /// Returns `None` when anything other than the indicators and an
    /// optional comment follows the style character.
    pub fn parse(text: &str) -> Option<BlockHeader> {
        let mut chars = text.chars();
        let style = match chars.next()? {
            '|' => BlockStyle::Literal,
            '>' => BlockStyle::Folded,
            _ => return None,
        };
        let mut chomping = None;
        let mut indent_indicator = None;
        let rest = chars.as_str();
        let mut consumed = 0;
        for c in rest.chars() {
            match c {
                '+' | '-' if chomping.is_none() => {
                    chomping = Some(if c == '+' { Chomping::Keep } else { Chomping::Strip });
                }
                '1'..='9' if indent_indicator.is_none() => {
                    indent_indicator = c.to_digit(10).map(|d| d as usize);
                }
                _ => break,
            }
            consumed += 1;
        }
        let tail = &rest[consumed..];
        let trimmed = tail.trim_start();
        let comment_ok = trimmed.starts_with('#') && trimmed.len() < tail.len();
        if !trimmed.is_empty() && !comment_ok {
            return None;
        }
        Some(BlockHeader {
            style,
            chomping: chomping.unwrap_or_default(),
            indent_indicator,
        })
    }
}

/// Result of reading a block scalar body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockScalar {
    pub text: String,
    /// Offset of the first line not consumed by the scalar.
    pub end: usize,
    /// Number of physical lines consumed.
    pub lines: usize,
}

/// Read a block scalar body starting at `start` (the beginning of the line
/// after the header).
///
/// `base_indent` is the indent of the line that owns the scalar; the body
/// ends at EOF or at the first non-blank line indented `<= base_indent`.
/// `first_line` is the 1-based line number of the line at `start`, used for
/// error reporting.
pub fn read_block(
    src: &str,
    start: usize,
    base_indent: usize,
    header: &BlockHeader,
    first_line: usize,
) -> Result<BlockScalar> {
    let mut content_indent = header.indent_indicator.map(|n| base_indent + n);
    let mut body: Vec<&str> = Vec::new();
    let mut pos = start;

    while pos < src.len() {
        let line_end = src[pos..].find('\n').map_or(src.len(), |i| pos + i);
        let raw = &src[pos..line_end];
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let next = if line_end < src.len() { line_end + 1 } else { line_end };

        if raw.trim().is_empty() {
            body.push("");
            pos = next;
            continue;
        }

        let indent = raw.bytes().take_while(|&b| b == b' ').count();
        if indent <= base_indent {
            break;
        }
        let ci = *content_indent.get_or_insert(indent);
        if indent < ci {
            return Err(YamletError::BlockScalar {
                line: first_line + body.len(),
                message: format!(
                    "line is indented {indent} spaces, less than the block scalar's content indent of {ci}"
                ),
            });
        }
        body.push(&raw[ci..]);
        pos = next;
    }

    let lines = body.len();
    let mut text = String::new();
    for line in &body {
        text.push_str(line);
        text.push('\n');
    }

    Ok(BlockScalar {
        text: finish(&text, header.style, header.chomping),
        end: pos,
        lines,
    })
}

/// Apply folding and chomping to the raw literal text (every line already
/// terminated by `\n`).
fn finish(text: &str, style: BlockStyle, chomping: Chomping) -> String {
    let body_len = text.trim_end_matches('\n').len();
    let (body, trailing) = text.split_at(body_len);

    let mut out = match style {
        BlockStyle::Literal => body.to_string(),
        BlockStyle::Folded => body.replace('\n', " "),
    };
    match chomping {
        Chomping::Strip => {}
        Chomping::Clip => {
            if !out.is_empty() {
                out.push('\n');
            }
        }
        Chomping::Keep => out.push_str(trailing),
    }
    out
}
