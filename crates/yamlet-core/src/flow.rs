//! Inline flow collections: `{key: value, ...}` and `[value, ...]`.
//!
//! A self-contained recursive-descent parser over byte offsets of the whole
//! input. It knows nothing about lines or indentation, so a flow value may
//! span several physical lines; the scanner only needs the end offset back.

use crate::error::{locate, Result, YamletError};
use crate::scalar::{self, find_closing_double, find_closing_single};
use crate::types::Value;

/// Parse the flow collection that starts at `start` (which must hold `{` or
/// `[`). Returns the value and the offset of the closing bracket.
pub fn parse_flow(src: &str, start: usize) -> Result<(Value, usize)> {
    let mut parser = FlowParser { src, pos: start };
    let value = match parser.peek() {
        Some(b'{') => parser.parse_map()?,
        Some(b'[') => parser.parse_seq()?,
        _ => return Err(parser.error_at(start, "expected '{' or '['")),
    };
    Ok((value, parser.pos - 1))
}

/// What a bare token is allowed to run into before it ends.
#[derive(Clone, Copy, PartialEq)]
enum Context {
    Key,
    Value,
}

struct FlowParser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> FlowParser<'a> {
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    fn peek(&self) -> Option<u8> {
        self.bytes().get(self.pos).copied()
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> YamletError {
        let (line, column) = locate(self.src, offset);
        YamletError::delimiter(line, column, message)
    }

    /// Skip whitespace (including line breaks) and ` #` comments.
    fn skip_ws(&mut self) {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' => self.pos += 1,
                b'#' if self.pos > 0 && self.bytes()[self.pos - 1].is_ascii_whitespace() => {
                    while let Some(c) = self.peek() {
                        if c == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                _ => break,
            }
        }
    }

    fn parse_map(&mut self) -> Result<Value> {
        let open = self.pos;
        self.pos += 1;
        let mut entries = Vec::new();

        self.skip_ws();
        if self.peek() == Some(b'}') {
            self.pos += 1;
            return Ok(Value::Map(entries));
        }

        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(self.error_at(open, "unterminated flow mapping")),
                Some(b'}') => return Err(self.error_at(self.pos, "trailing comma before '}'")),
                Some(b',') => return Err(self.error_at(self.pos, "empty entry in flow mapping")),
                Some(b'{' | b'[') => {
                    return Err(self.error_at(self.pos, "collections cannot be mapping keys"))
                }
                _ => {}
            }

            let key = self.parse_key()?;
            self.skip_ws();
            let value = match self.peek() {
                Some(b':') => {
                    self.pos += 1;
                    self.skip_ws();
                    match self.peek() {
                        Some(b',' | b'}') => Value::Null,
                        _ => self.parse_value()?,
                    }
                }
                Some(b',' | b'}') => Value::Null,
                None => return Err(self.error_at(open, "unterminated flow mapping")),
                Some(_) => return Err(self.error_at(self.pos, "expected ':' after key")),
            };
            entries.push((key, value));

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Map(entries));
                }
                None => return Err(self.error_at(open, "unterminated flow mapping")),
                Some(_) => return Err(self.error_at(self.pos, "expected ',' or '}'")),
            }
        }
    }

    fn parse_seq(&mut self) -> Result<Value> {
        let open = self.pos;
        self.pos += 1;
        let mut items = Vec::new();

        self.skip_ws();
        if self.peek() == Some(b']') {
            self.pos += 1;
            return Ok(Value::Seq(items));
        }

        loop {
            self.skip_ws();
            match self.peek() {
                None => return Err(self.error_at(open, "unterminated flow sequence")),
                Some(b']') => return Err(self.error_at(self.pos, "trailing comma before ']'")),
                Some(b',') => return Err(self.error_at(self.pos, "empty entry in flow sequence")),
                _ => {}
            }
            items.push(self.parse_value()?);

            self.skip_ws();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Seq(items));
                }
                None => return Err(self.error_at(open, "unterminated flow sequence")),
                Some(_) => return Err(self.error_at(self.pos, "expected ',' or ']'")),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.peek() {
            Some(b'{') => self.parse_map(),
            Some(b'[') => self.parse_seq(),
            Some(b'"' | b'\'') => self.parse_quoted().map(Value::String),
            _ => {
                let token = self.parse_bare(Context::Value);
                Ok(scalar::resolve_plain(&token))
            }
        }
    }

    fn parse_key(&mut self) -> Result<String> {
        match self.peek() {
            Some(b'"' | b'\'') => self.parse_quoted(),
            _ => Ok(self.parse_bare(Context::Key)),
        }
    }

    fn parse_quoted(&mut self) -> Result<String> {
        let open = self.pos;
        let (close, body) = if self.bytes()[open] == b'"' {
            let close = find_closing_double(self.src, open + 1)
                .ok_or_else(|| self.error_at(open, "unterminated quoted string"))?;
            let body = scalar::unescape_double(&self.src[open + 1..close])
                .map_err(|message| self.error_at(open, message))?;
            (close, body)
        } else {
            let close = find_closing_single(self.src, open + 1)
                .ok_or_else(|| self.error_at(open, "unterminated quoted string"))?;
            (close, scalar::unescape_single(&self.src[open + 1..close]))
        };
        self.pos = close + 1;
        Ok(body)
    }

    /// Read an unquoted token up to the next structural character. Line
    /// breaks inside the token fold into single spaces.
    fn parse_bare(&mut self, ctx: Context) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            let stop = match b {
                b',' | b'}' | b']' => true,
                b':' if ctx == Context::Key => true,
                b'#' => self.pos > start && self.bytes()[self.pos - 1].is_ascii_whitespace(),
                _ => false,
            };
            if stop {
                break;
            }
            self.pos += 1;
        }
        let token = self.src[start..self.pos].trim();
        if token.contains('\n') {
            token
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            token.to_string()
        }
    }
}
