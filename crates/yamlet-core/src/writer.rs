//! Writer: `Value` → yamlet text.
//!
//! The inverse walk of the parser. Output is two-space indented and uses the
//! platform line terminator. Anchors, comments and tags other than
//! `!!binary` / `!!timestamp` are not reproduced, so parse → write → parse
//! preserves values but not source layout.

use std::io;

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};

use crate::error::{Result, YamletError};
use crate::scalar::{format_float, quote_verbatim, resolve_plain};
use crate::tree::{merge_sources, MERGE_KEY};
use crate::types::Value;

/// Line terminator used by the writer.
#[cfg(windows)]
pub const LINE_ENDING: &str = "\r\n";
/// Line terminator used by the writer.
#[cfg(not(windows))]
pub const LINE_ENDING: &str = "\n";

const INDENT: usize = 2;

/// Serialize a document root to text.
///
/// The root must be a map, a list, or `Null` (an empty document, written as
/// nothing). Empty collections at the root are also written as nothing.
///
/// Quoted scalars are read back verbatim, without backslash escapes, so a
/// string is only writable when it fits on one line or in a `|` block. A
/// multi-line string with whitespace-only lines or control characters is a
/// `Shape` error, as is a `<<` key whose value would be re-read as a merge.
pub fn to_string(value: &Value) -> Result<String> {
    let mut out = String::new();
    match value {
        Value::Null => {}
        Value::Map(entries) => write_map(entries, 0, &mut out, false)?,
        Value::Seq(items) => write_seq(items, 0, &mut out, false)?,
        other => {
            return Err(YamletError::Shape(format!(
                "a {} cannot be written as a document root",
                other.kind()
            )))
        }
    }
    Ok(out)
}

/// Serialize a document root into `writer`.
pub fn write_value<W: io::Write>(value: &Value, mut writer: W) -> Result<()> {
    let text = to_string(value)?;
    writer.write_all(text.as_bytes())?;
    Ok(())
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

/// Write map entries at `indent`. With `on_marker_line` the first entry
/// continues a `- ` already written by the caller.
fn write_map(
    entries: &[(String, Value)],
    indent: usize,
    out: &mut String,
    on_marker_line: bool,
) -> Result<()> {
    let mut skip_pad = on_marker_line;
    for (key, value) in entries {
        if key == MERGE_KEY && merge_sources(value).is_some() {
            return Err(YamletError::Shape(format!(
                "a '{MERGE_KEY}' key holding a {} would read back as a merge",
                value.kind()
            )));
        }
        if !skip_pad {
            pad(out, indent);
        }
        skip_pad = false;
        write_key(key, out)?;
        out.push(':');
        write_nested(value, indent, out)?;
    }
    Ok(())
}

fn write_seq(items: &[Value], indent: usize, out: &mut String, on_marker_line: bool) -> Result<()> {
    let mut skip_pad = on_marker_line;
    for item in items {
        if !skip_pad {
            pad(out, indent);
        }
        skip_pad = false;
        out.push('-');
        out.push(' ');
        match item {
            Value::Map(entries) if !entries.is_empty() => {
                write_map(entries, indent + INDENT, out, true)?
            }
            Value::Seq(inner) if !inner.is_empty() => {
                write_seq(inner, indent + INDENT, out, true)?
            }
            scalar => write_scalar(scalar, indent, out)?,
        }
    }
    Ok(())
}

/// Value of a map entry whose key (owned by a line at `indent`) was just written.
fn write_nested(value: &Value, indent: usize, out: &mut String) -> Result<()> {
    match value {
        Value::Map(entries) if !entries.is_empty() => {
            out.push_str(LINE_ENDING);
            write_map(entries, indent + INDENT, out, false)
        }
        Value::Seq(items) if !items.is_empty() => {
            out.push_str(LINE_ENDING);
            write_seq(items, indent + INDENT, out, false)
        }
        scalar => {
            out.push(' ');
            write_scalar(scalar, indent, out)
        }
    }
}

/// Write a scalar (or empty collection) and terminate its line. `indent` is
/// the indent of the owning line, used for block scalar content.
fn write_scalar(value: &Value, indent: usize, out: &mut String) -> Result<()> {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Integer(n) => out.push_str(&n.to_string()),
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::String(s) => {
            if is_plain_safe(s) {
                out.push_str(s);
            } else if let Some(quoted) = quote_verbatim(s) {
                out.push_str(&quoted);
            } else if let Some(block) = block_lines(s) {
                write_block(&block, indent, out);
                return Ok(());
            } else {
                return Err(YamletError::Shape(format!(
                    "string {s:?} has whitespace-only lines or control characters and cannot be written"
                )));
            }
        }
        Value::Binary(bytes) => {
            out.push_str("!!binary ");
            out.push_str(&B64.encode(bytes));
        }
        Value::Timestamp(ts) => {
            out.push_str("!!timestamp ");
            out.push_str(&ts.to_rfc3339());
        }
        Value::Map(_) => out.push_str("{}"),
        Value::Seq(_) => out.push_str("[]"),
    }
    out.push_str(LINE_ENDING);
    Ok(())
}

fn write_key(key: &str, out: &mut String) -> Result<()> {
    if is_key_safe(key) {
        out.push_str(key);
    } else {
        let quoted = quote_verbatim(key).ok_or_else(|| {
            YamletError::Shape(format!("map key {key:?} spans lines and cannot be written"))
        })?;
        out.push_str(&quoted);
    }
    Ok(())
}

/// Characters that change the meaning of a scalar when they lead it.
const INDICATORS: &[char] = &[
    '-', '?', ':', ',', '[', ']', '{', '}', '#', '&', '*', '!', '|', '>', '\'', '"', '%', '@',
    '`',
];

fn has_plain_shape(s: &str) -> bool {
    !s.is_empty()
        && s.trim() == s
        && !s.chars().any(char::is_control)
        && !s.starts_with(INDICATORS)
        && !s.contains(": ")
        && !s.contains(" #")
        && !s.ends_with(':')
}

/// A string reads back unchanged when written without quotes.
fn is_plain_safe(s: &str) -> bool {
    has_plain_shape(s) && resolve_plain(s) == Value::String(s.to_string())
}

/// Keys are never type-resolved, so only the shape matters.
fn is_key_safe(s: &str) -> bool {
    has_plain_shape(s)
}

/// A multi-line string that a `|` block can carry exactly.
struct Block<'a> {
    lines: Vec<&'a str>,
    trailing_newlines: usize,
}

fn block_lines(s: &str) -> Option<Block<'_>> {
    if !s.contains('\n') || s.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return None;
    }
    let body = s.trim_end_matches('\n');
    if body.is_empty() {
        return None;
    }
    let lines: Vec<&str> = body.split('\n').collect();
    // Whitespace-only lines would read back as empty lines.
    if lines.iter().any(|l| !l.is_empty() && l.trim().is_empty()) {
        return None;
    }
    Some(Block {
        lines,
        trailing_newlines: s.len() - body.len(),
    })
}

fn write_block(block: &Block<'_>, indent: usize, out: &mut String) {
    out.push('|');
    // The first non-empty line fixes the content indent on read.
    let first = block.lines.iter().find(|l| !l.is_empty());
    if first.is_some_and(|l| l.starts_with(' ')) {
        out.push_str(&INDENT.to_string());
    }
    match block.trailing_newlines {
        0 => out.push('-'),
        1 => {}
        _ => out.push('+'),
    }
    out.push_str(LINE_ENDING);
    for line in &block.lines {
        if !line.is_empty() {
            pad(out, indent + INDENT);
            out.push_str(line);
        }
        out.push_str(LINE_ENDING);
    }
    for _ in 1..block.trailing_newlines {
        out.push_str(LINE_ENDING);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_safety() {
        assert!(is_plain_safe("hello world"));
        assert!(is_plain_safe("a#b"));
        assert!(!is_plain_safe("true"));
        assert!(!is_plain_safe("42"));
        assert!(!is_plain_safe(""));
        assert!(!is_plain_safe(" padded"));
        assert!(!is_plain_safe("key: value"));
        assert!(!is_plain_safe("- item"));
        assert!(!is_plain_safe("note #1"));
    }

    #[test]
    fn block_rejects_whitespace_only_lines() {
        assert!(block_lines("a\n  \nb").is_none());
        assert!(block_lines("a\n\nb").is_some());
        assert!(block_lines("\n\n").is_none());
    }
}
