//! # yamlet-core
//!
//! Pure-Rust parser and writer for **yamlet**, an indentation-based markup
//! language in the YAML family.
//!
//! yamlet covers the block subset people actually write in configuration
//! files: `key: value` mappings, `- item` arrays, quoted and plain scalars,
//! `|` / `>` block scalars with chomping, inline `{...}` / `[...]` flow
//! collections, `&anchor` / `*alias` references with `<<` merge keys,
//! explicit `!!tags`, and multi-document input separated by `---`.
//!
//! ## Quick start
//!
//! ```rust
//! use yamlet_core::{parse, Value};
//!
//! let text = "\
//! defaults: &defaults
//!   retries: 3
//! service:
//!   <<: *defaults
//!   name: api
//! ";
//! let doc = parse(text).unwrap();
//! let map = doc.to_map().unwrap();
//! let service = &map[1].1;
//! assert_eq!(service.get("retries"), Some(&Value::Integer(3)));
//! assert_eq!(service.get("name").and_then(Value::as_str), Some("api"));
//!
//! // Write it back out (lossy: anchors and comments are not reproduced).
//! let out = yamlet_core::to_string(&Value::Map(map)).unwrap();
//! assert!(out.contains("retries: 3"));
//! ```
//!
//! ## Modules
//!
//! - [`scanner`]: raw text → flat list of line records (first pass)
//! - [`block`]: `|` / `>` block scalar bodies
//! - [`flow`]: inline `{...}` / `[...]` collections
//! - [`builder`]: line records → node tree, anchors and aliases (second pass)
//! - [`tree`]: the node arena and its read/write handles
//! - [`document`]: multi-document wrapper and container views
//! - [`writer`]: `Value` → text
//! - [`scalar`]: plain scalar resolution and `!!tag` coercion
//! - [`error`]: error types with line numbers
//! - [`types`]: `Value`, `Tag` and block scalar enums

pub mod block;
pub mod builder;
pub mod document;
pub mod error;
pub mod flow;
pub mod scalar;
pub mod scanner;
pub mod tree;
pub mod types;
pub mod writer;

pub use document::{parse, parse_bytes, read, read_file, Document};
pub use error::{Result, YamletError};
pub use tree::{NodeId, NodeRef, Tree};
pub use types::{BlockStyle, Chomping, Tag, Value};
pub use writer::{to_string, write_value, LINE_ENDING};
