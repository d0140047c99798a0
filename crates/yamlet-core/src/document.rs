//! Document model: one tree per `---`-delimited segment.

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;

use crate::builder;
use crate::error::{Result, YamletError};
use crate::scanner;
use crate::tree::{NodeRef, Tree};
use crate::types::Value;
use crate::writer::{self, LINE_ENDING};

/// A parsed yamlet input.
///
/// Holds at least one tree. `is_multiple` is true when a `---` separator
/// followed content, even if nothing came after it.
#[derive(Debug, Clone)]
pub struct Document {
    trees: Vec<Tree>,
    multiple: bool,
}

/// Parse yamlet text.
///
/// # Errors
///
/// Returns the first [`YamletError`] encountered; parsing never recovers.
///
/// # Example
///
/// ```rust
/// let doc = yamlet_core::parse("name: demo\nports:\n  - 80\n  - 443\n").unwrap();
/// let root = doc.root();
/// assert_eq!(root.get("name").and_then(|n| n.value()).and_then(|v| v.as_str()), Some("demo"));
/// assert_eq!(root.get("ports").map(|p| p.len()), Some(2));
/// ```
pub fn parse(text: &str) -> Result<Document> {
    let mut trees = Vec::new();
    let mut multiple = false;
    let mut pos = 0;
    loop {
        let scan = scanner::scan(text, pos)?;
        let tree = builder::build(&scan.records)?;
        log::debug!(
            "parsed document segment {} ({} records, lines to {})",
            trees.len(),
            scan.records.len(),
            scan.next_line
        );
        trees.push(tree);
        if !scan.more {
            break;
        }
        multiple = true;
        pos = scan.end;
    }
    Ok(Document { trees, multiple })
}

/// Parse UTF-8 bytes. A leading byte-order mark is ignored.
pub fn parse_bytes(bytes: &[u8]) -> Result<Document> {
    let text = std::str::from_utf8(bytes)?;
    parse(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Read everything from `reader` and parse it.
pub fn read<R: Read>(mut reader: R) -> Result<Document> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_bytes(&bytes)
}

pub fn read_file(path: impl AsRef<Path>) -> Result<Document> {
    let bytes = fs::read(path.as_ref())?;
    parse_bytes(&bytes)
}

impl Document {
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    pub fn tree(&self, index: usize) -> Option<&Tree> {
        self.trees.get(index)
    }

    pub fn tree_mut(&mut self, index: usize) -> Option<&mut Tree> {
        self.trees.get_mut(index)
    }

    /// Root of the first document segment.
    pub fn root(&self) -> NodeRef<'_> {
        self.first().root()
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// Number of document segments.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// True when no segment has any content.
    pub fn is_empty(&self) -> bool {
        self.trees.iter().all(Tree::is_empty)
    }

    fn first(&self) -> &Tree {
        &self.trees[0]
    }

    /// The first segment as an ordered map, with merge keys applied.
    ///
    /// An empty document yields an empty map.
    pub fn to_map(&self) -> Result<Vec<(String, Value)>> {
        match self.first().to_value() {
            Value::Map(entries) => Ok(entries),
            Value::Null => Ok(Vec::new()),
            other => Err(YamletError::Shape(format!(
                "document root is a {}, not a map",
                other.kind()
            ))),
        }
    }

    /// The first segment as a list. An empty document yields an empty list.
    pub fn to_list(&self) -> Result<Vec<Value>> {
        match self.first().to_value() {
            Value::Seq(items) => Ok(items),
            Value::Null => Ok(Vec::new()),
            other => Err(YamletError::Shape(format!(
                "document root is a {}, not a list",
                other.kind()
            ))),
        }
    }

    /// One value per segment; empty segments are `Null`.
    pub fn to_values(&self) -> Vec<Value> {
        self.trees.iter().map(Tree::to_value).collect()
    }

    /// Overwrite a leaf of the first segment. See [`Tree::set_value`].
    pub fn set_value(&mut self, path: &[&str], value: Value) -> Result<()> {
        self.trees[0].set_value(path, value)
    }

    /// Write every segment, separated by `---`.
    pub fn write_to<W: io::Write>(&self, mut writer: W) -> Result<()> {
        let text = self.render()?;
        writer.write_all(text.as_bytes())?;
        log::debug!(
            "wrote {} document segment(s), {} bytes",
            self.trees.len(),
            text.len()
        );
        Ok(())
    }

    fn render(&self) -> Result<String> {
        let mut out = String::new();
        for (i, tree) in self.trees.iter().enumerate() {
            if i > 0 {
                out.push_str("---");
                out.push_str(LINE_ENDING);
            }
            out.push_str(&writer::to_string(&tree.to_value())?);
        }
        Ok(out)
    }
}

/// Renders like [`Document::write_to`]. A value the writer rejects becomes
/// `fmt::Error`, so `to_string()` panics on it; use `write_to` to get the error.
impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.render().map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for Document {
    type Err = YamletError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}
