//! Line scanner: turns raw text into a flat list of [`LineRecord`]s.
//!
//! The scanner is the first of two passes. It looks at one physical line at a
//! time (calling into the block and flow sub-parsers when a value spans more
//! than one line) and records, for each content line:
//!
//! - the indentation width and 1-based line number
//! - the key, if the line is `key: ...`
//! - whether the line is an array entry (`- ...`)
//! - the value in one of its forms (see [`LineValue`])
//! - the explicit `!!tag` and `&anchor`, if any
//!
//! # Key design decisions
//!
//! - **Synthetic records for array markers**: `- - x` and `- key: v` emit one
//!   record per marker, each at the column where the marker (or the key)
//!   actually sits. The tree builder then only ever compares indents.
//! - **Stop at `---`**: the scanner returns the offset after a document
//!   separator so the caller can restart on the next segment.

use crate::block::{self, BlockHeader};
use crate::error::{locate, Result, YamletError};
use crate::flow;
use crate::scalar::{find_closing_double, find_closing_single, unescape_single};
use crate::types::{BlockStyle, Chomping, Tag, Value};

/// The value part of a scanned line.
#[derive(Debug, Clone, PartialEq)]
pub enum LineValue {
    /// Nothing after the key or marker: children may follow on deeper lines.
    Empty,
    /// Unquoted scalar, trimmed, comment removed.
    Plain(String),
    /// Quoted scalar with quotes removed. Double-quoted text is kept verbatim;
    /// single-quoted text only folds `''` to `'`.
    Quoted(String),
    /// Literal or folded block scalar, already chomped.
    Block {
        text: String,
        style: BlockStyle,
        chomping: Chomping,
    },
    /// Inline flow collection.
    Flow(Value),
    /// `*name` alias reference.
    Alias(String),
}

/// One scanned line (or one array marker of a line).
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub indent: usize,
    pub line: usize,
    pub key: Option<String>,
    pub value: LineValue,
    pub tag: Tag,
    pub array_entry: bool,
    pub anchor: Option<String>,
}

impl LineRecord {
    fn new(line: usize, indent: usize, key: Option<String>, array_entry: bool) -> Self {
        Self {
            indent,
            line,
            key,
            value: LineValue::Empty,
            tag: Tag::Auto,
            array_entry,
            anchor: None,
        }
    }

    /// True when the line carries its own value (no children expected).
    pub fn is_leaf(&self) -> bool {
        !matches!(self.value, LineValue::Empty)
    }

    pub fn is_text_block(&self) -> bool {
        matches!(self.value, LineValue::Block { .. })
    }

    pub fn chomping(&self) -> Option<Chomping> {
        match self.value {
            LineValue::Block { chomping, .. } => Some(chomping),
            _ => None,
        }
    }

    pub fn alias(&self) -> Option<&str> {
        match &self.value {
            LineValue::Alias(name) => Some(name),
            _ => None,
        }
    }
}

/// Output of scanning one document segment.
#[derive(Debug, Clone, PartialEq)]
pub struct Scan {
    pub records: Vec<LineRecord>,
    /// Offset at which scanning stopped.
    pub end: usize,
    /// Line number of the line at `end`.
    pub next_line: usize,
    /// True when a `---` separator stopped the scan and more input follows.
    pub more: bool,
}

/// Scan one document segment of `src` starting at byte offset `start`.
pub fn scan(src: &str, start: usize) -> Result<Scan> {
    let line = src[..start].matches('\n').count() + 1;
    Scanner {
        src,
        pos: start,
        line,
        line_start: start,
        root_indent: None,
        records: Vec::new(),
    }
    .run()
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    line_start: usize,
    root_indent: Option<usize>,
    records: Vec<LineRecord>,
}

impl<'a> Scanner<'a> {
    fn run(mut self) -> Result<Scan> {
        let src = self.src;
        while self.pos < src.len() {
            self.line_start = self.pos;
            let (content_end, next) = self.line_bounds(self.pos);
            let raw = &src[self.pos..content_end];
            let indent = raw.bytes().take_while(|&b| b == b' ').count();
            let content = &raw[indent..];
            let trimmed = content.trim_end();

            if trimmed.is_empty() || trimmed.starts_with('#') {
                self.advance_line(next);
                continue;
            }
            if content.starts_with('\t') {
                return Err(YamletError::indentation(
                    self.line,
                    "tab character used for indentation",
                ));
            }
            if indent == 0 && is_document_separator(trimmed) {
                self.advance_line(next);
                if self.records.is_empty() {
                    continue;
                }
                return Ok(self.finish(true));
            }
            match self.root_indent {
                None => self.root_indent = Some(indent),
                Some(root) if indent < root => {
                    return Err(YamletError::indentation(
                        self.line,
                        format!("indent of {indent} is below the document's root indent of {root}"),
                    ));
                }
                Some(_) => {}
            }

            self.scan_line(indent, content_end, next)?;
        }
        Ok(self.finish(false))
    }

    fn finish(self, more: bool) -> Scan {
        Scan {
            records: self.records,
            end: self.pos,
            next_line: self.line,
            more,
        }
    }

    /// End of the line's content (before `\r\n` / `\n`) and start of the next line.
    fn line_bounds(&self, from: usize) -> (usize, usize) {
        let line_end = self.src[from..].find('\n').map_or(self.src.len(), |i| from + i);
        let content_end = if self.src[from..line_end].ends_with('\r') {
            line_end - 1
        } else {
            line_end
        };
        let next = if line_end < self.src.len() { line_end + 1 } else { line_end };
        (content_end, next)
    }

    fn advance_line(&mut self, next: usize) {
        self.pos = next;
        self.line += 1;
    }

    fn column(&self, offset: usize) -> usize {
        self.src[self.line_start..offset].chars().count() + 1
    }

    fn push(&mut self, record: LineRecord) {
        log::trace!(
            "line {} indent {} key {:?} value {:?}",
            record.line,
            record.indent,
            record.key,
            record.value
        );
        self.records.push(record);
    }

    fn scan_line(&mut self, indent: usize, content_end: usize, next: usize) -> Result<()> {
        let src = self.src;
        let line = self.line;
        let mut col = indent;

        loop {
            let rest = &src[self.line_start + col..content_end];
            if !is_array_marker(rest) {
                break;
            }
            let after = &rest[1..];
            let gap = after.bytes().take_while(|&b| b == b' ').count();
            let content_col = col + 1 + gap;
            let remaining = &after[gap..];
            let remaining_trimmed = remaining.trim_end();

            if remaining_trimmed.is_empty() || remaining_trimmed.starts_with('#') {
                self.push(LineRecord::new(line, col, None, true));
                self.advance_line(next);
                return Ok(());
            }
            if is_array_marker(remaining) || split_key(remaining).is_some() {
                self.push(LineRecord::new(line, col, None, true));
                col = content_col;
                continue;
            }
            let record = LineRecord::new(line, col, None, true);
            return self.scan_value(record, self.line_start + content_col, content_end, next);
        }

        let content = &src[self.line_start + col..content_end];
        let (key, value_offset) = split_key(content).ok_or_else(|| {
            YamletError::delimiter(line, col + 1, "expected ': ' after a mapping key")
        })?;
        let record = LineRecord::new(line, col, Some(key), false);
        self.scan_value(record, self.line_start + col + value_offset, content_end, next)
    }

    /// Classify the value that starts at `pos` and push the finished record.
    fn scan_value(
        &mut self,
        mut record: LineRecord,
        mut pos: usize,
        content_end: usize,
        next: usize,
    ) -> Result<()> {
        let src = self.src;
        let line = record.line;

        loop {
            let rest = src[pos..content_end].trim_start_matches([' ', '\t']);
            pos = content_end - rest.len();
            let rest = rest.trim_end();
            let column = self.column(pos);

            if rest.is_empty() || rest.starts_with('#') {
                self.push(record);
                self.advance_line(next);
                return Ok(());
            }

            match rest.as_bytes()[0] {
                b'&' => {
                    let name = take_name(&rest[1..]);
                    if name.is_empty() {
                        return Err(YamletError::anchor(line, "missing anchor name after '&'"));
                    }
                    if record.anchor.is_some() {
                        return Err(YamletError::anchor(
                            line,
                            format!("second anchor '&{name}' on the same value"),
                        ));
                    }
                    record.anchor = Some(name.to_string());
                    pos += 1 + name.len();
                }
                b'!' => {
                    let Some(after) = rest.strip_prefix("!!") else {
                        return Err(YamletError::tag(
                            line,
                            format!("unrecognized tag '{}'", take_name(rest)),
                        ));
                    };
                    let name = take_name(after);
                    let tag = Tag::from_name(name).ok_or_else(|| {
                        YamletError::tag(line, format!("unrecognized tag '!!{name}'"))
                    })?;
                    if record.tag != Tag::Auto {
                        return Err(YamletError::tag(
                            line,
                            format!("second tag '!!{name}' on the same value"),
                        ));
                    }
                    record.tag = tag;
                    pos += 2 + name.len();
                }
                b'*' => {
                    let name = take_name(&rest[1..]);
                    if name.is_empty() {
                        return Err(YamletError::anchor(line, "missing alias name after '*'"));
                    }
                    let tail = &rest[1 + name.len()..];
                    let trimmed = tail.trim_start();
                    if !trimmed.is_empty() && !trimmed.starts_with('#') {
                        let offset = column + 1 + name.len() + (tail.len() - trimmed.len());
                        return Err(YamletError::delimiter(
                            line,
                            offset,
                            "unexpected content after alias",
                        ));
                    }
                    record.value = LineValue::Alias(name.to_string());
                    self.push(record);
                    self.advance_line(next);
                    return Ok(());
                }
                b'"' | b'\'' => {
                    record.value = LineValue::Quoted(self.quoted(rest, line, column)?);
                    if record.tag == Tag::Auto {
                        record.tag = Tag::Str;
                    }
                    self.push(record);
                    self.advance_line(next);
                    return Ok(());
                }
                b'|' | b'>' => {
                    let header = BlockHeader::parse(rest).ok_or_else(|| {
                        YamletError::delimiter(line, column, "invalid block scalar header")
                    })?;
                    let block = block::read_block(src, next, record.indent, &header, line + 1)?;
                    record.value = LineValue::Block {
                        text: block.text,
                        style: header.style,
                        chomping: header.chomping,
                    };
                    self.push(record);
                    self.pos = block.end;
                    self.line += 1 + block.lines;
                    return Ok(());
                }
                b'{' | b'[' => {
                    let (value, close) = flow::parse_flow(src, pos)?;
                    let (tail_end, after) = self.line_bounds(close);
                    let tail = src[close + 1..tail_end].trim();
                    if !tail.is_empty() && !tail.starts_with('#') {
                        let (l, c) = locate(src, close + 1);
                        return Err(YamletError::delimiter(
                            l,
                            c,
                            "unexpected content after flow collection",
                        ));
                    }
                    let spanned = src[pos..close].matches('\n').count();
                    record.value = LineValue::Flow(value);
                    self.push(record);
                    self.pos = after;
                    self.line += 1 + spanned;
                    return Ok(());
                }
                _ => {
                    let end = comment_start(rest).unwrap_or(rest.len());
                    record.value = LineValue::Plain(rest[..end].trim_end().to_string());
                    self.push(record);
                    self.advance_line(next);
                    return Ok(());
                }
            }
        }
    }

    fn quoted(&self, rest: &str, line: usize, column: usize) -> Result<String> {
        let double = rest.starts_with('"');
        let close = if double {
            find_closing_double(rest, 1)
        } else {
            find_closing_single(rest, 1)
        }
        .ok_or_else(|| YamletError::delimiter(line, column, "unterminated quoted scalar"))?;

        // Verbatim: backslashes only keep a `\"` from closing the scalar.
        let body = &rest[1..close];
        let text = if double {
            body.to_string()
        } else {
            unescape_single(body)
        };

        let tail = rest[close + 1..].trim_start();
        if !tail.is_empty() && !tail.starts_with('#') {
            return Err(YamletError::delimiter(
                line,
                column + rest[..close + 1].chars().count(),
                "unexpected content after quoted scalar",
            ));
        }
        Ok(text)
    }
}

/// `---` at column 0, optionally followed by a comment.
fn is_document_separator(trimmed: &str) -> bool {
    let Some(rest) = trimmed.strip_prefix("---") else {
        return false;
    };
    rest.is_empty() || (rest.starts_with([' ', '\t']) && rest.trim_start().starts_with('#'))
}

/// `-` followed by whitespace or end of line.
fn is_array_marker(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.first() == Some(&b'-') && matches!(bytes.get(1), None | Some(b' ' | b'\t'))
}

/// Contiguous non-whitespace run at the start of `s`.
fn take_name(s: &str) -> &str {
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    &s[..end]
}

/// Offset of a ` #` comment in a plain scalar.
fn comment_start(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    (1..bytes.len()).find(|&i| bytes[i] == b'#' && matches!(bytes[i - 1], b' ' | b'\t'))
}

fn is_delimiter_end(bytes: &[u8], i: usize) -> bool {
    matches!(bytes.get(i), None | Some(b' ' | b'\t'))
}

/// Split `key: rest` on the first `": "` (or a trailing `:`), honoring a
/// quoted key. Returns the decoded key and the offset just past the colon.
fn split_key(content: &str) -> Option<(String, usize)> {
    let bytes = content.as_bytes();
    match bytes.first()? {
        quote @ (b'"' | b'\'') => {
            let close = if *quote == b'"' {
                find_closing_double(content, 1)?
            } else {
                find_closing_single(content, 1)?
            };
            let after = &content[close + 1..];
            let colon = close + 1 + (after.len() - after.trim_start_matches(' ').len());
            if bytes.get(colon) != Some(&b':') || !is_delimiter_end(bytes, colon + 1) {
                return None;
            }
            let body = &content[1..close];
            let key = if *quote == b'"' {
                body.to_string()
            } else {
                unescape_single(body)
            };
            Some((key, colon + 1))
        }
        b'{' | b'[' | b'|' | b'>' | b'&' | b'*' | b'!' | b'#' => None,
        _ => {
            for (i, &b) in bytes.iter().enumerate() {
                match b {
                    b':' if is_delimiter_end(bytes, i + 1) => {
                        let key = content[..i].trim_end();
                        return (!key.is_empty()).then(|| (key.to_string(), i + 1));
                    }
                    b'#' if i > 0 && matches!(bytes[i - 1], b' ' | b'\t') => return None,
                    _ => {}
                }
            }
            None
        }
    }
}
