//! Error types for yamlet parsing and writing.

use thiserror::Error;

/// Errors that can occur while parsing or writing yamlet documents.
///
/// Every parse error carries the 1-based line number at which it was
/// detected. Parsing never recovers: the first error aborts the document.
#[derive(Error, Debug)]
pub enum YamletError {
    /// Dedent below the root indent, a dedent that matches no enclosing
    /// level, content nested under a leaf, or mixed array/map entries.
    #[error("indentation error at line {line}: {message}")]
    Indentation { line: usize, message: String },

    /// Missing `": "`, unterminated quoted scalar or flow collection,
    /// trailing comma, or stray content after a complete value.
    #[error("delimiter error at line {line}, column {column}: {message}")]
    Delimiter {
        line: usize,
        column: usize,
        message: String,
    },

    /// Unrecognized `!!tag`, or a value that cannot be coerced to its tag.
    #[error("tag error at line {line}: {message}")]
    Tag { line: usize, message: String },

    /// Alias to an undefined, forward, or enclosing anchor.
    #[error("anchor error at line {line}: {message}")]
    Anchor { line: usize, message: String },

    /// Block scalar line indented less than the scalar's content indent.
    #[error("block scalar error at line {line}: {message}")]
    BlockScalar { line: usize, message: String },

    /// A container view or point-write that does not fit the document shape.
    #[error("shape error: {0}")]
    Shape(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl YamletError {
    /// The 1-based line number of a parse error, if this is one.
    pub fn line(&self) -> Option<usize> {
        match self {
            YamletError::Indentation { line, .. }
            | YamletError::Delimiter { line, .. }
            | YamletError::Tag { line, .. }
            | YamletError::Anchor { line, .. }
            | YamletError::BlockScalar { line, .. } => Some(*line),
            _ => None,
        }
    }

    pub(crate) fn indentation(line: usize, message: impl Into<String>) -> Self {
        YamletError::Indentation {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn delimiter(line: usize, column: usize, message: impl Into<String>) -> Self {
        YamletError::Delimiter {
            line,
            column,
            message: message.into(),
        }
    }

    pub(crate) fn tag(line: usize, message: impl Into<String>) -> Self {
        YamletError::Tag {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn anchor(line: usize, message: impl Into<String>) -> Self {
        YamletError::Anchor {
            line,
            message: message.into(),
        }
    }
}

/// Convenience alias used throughout yamlet-core.
pub type Result<T> = std::result::Result<T, YamletError>;

/// Map a byte offset into `src` to a 1-based `(line, column)` pair.
pub(crate) fn locate(src: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(src.len());
    let before = &src.as_bytes()[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |p| p + 1);
    let column = src[line_start..offset].chars().count() + 1;
    (line, column)
}
