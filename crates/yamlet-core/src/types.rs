//! Shared value and tag types.
//!
//! [`Value`] is the generic container view of a parsed tree: what
//! `Document::to_map` / `to_list` hand to binding layers, and what the writer
//! consumes. Maps keep insertion order as a `Vec` of pairs so the crate does
//! not depend on `IndexMap`.

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use chrono::{DateTime, FixedOffset};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A resolved yamlet value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Decoded payload of a `!!binary` scalar.
    Binary(Vec<u8>),
    /// A `!!timestamp` scalar.
    Timestamp(DateTime<FixedOffset>),
    Seq(Vec<Value>),
    /// Key-value pairs in insertion order.
    Map(Vec<(String, Value)>),
}

impl Value {
    /// Look up a map entry. Returns `None` for non-maps and missing keys.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(entries) => entries.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(String, Value)]> {
        match self {
            Value::Map(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Human-readable kind name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Binary(_) => "binary",
            Value::Timestamp(_) => "timestamp",
            Value::Seq(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Convert into a `serde_json::Value`. Binary payloads become base64
    /// strings, timestamps RFC 3339 strings, non-finite floats null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(n) => serde_json::Value::Number((*n).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Binary(bytes) => serde_json::Value::String(B64.encode(bytes)),
            Value::Timestamp(ts) => serde_json::Value::String(ts.to_rfc3339()),
            Value::Seq(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(entries) => {
                let mut map = serde_json::Map::new();
                for (k, v) in entries {
                    map.insert(k.clone(), v.to_json());
                }
                serde_json::Value::Object(map)
            }
        }
    }

    /// Parse a JSON document into a `Value`.
    pub fn from_json_str(json: &str) -> crate::Result<Value> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Ok(Value::from(value))
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(n) => serializer.serialize_i64(*n),
            Value::Float(f) if f.is_finite() => serializer.serialize_f64(*f),
            Value::Float(_) => serializer.serialize_unit(),
            Value::String(s) => serializer.serialize_str(s),
            Value::Binary(bytes) => serializer.serialize_str(&B64.encode(bytes)),
            Value::Timestamp(ts) => serializer.serialize_str(&ts.to_rfc3339()),
            Value::Seq(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

/// Explicit type tag attached with `!!name`. `Auto` means no tag was given.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tag {
    #[default]
    Auto,
    Str,
    Float,
    Int,
    Bool,
    Binary,
    Timestamp,
    Set,
    OrderedMap,
    Seq,
    Map,
}

impl Tag {
    /// Resolve a tag name (the part after `!!`). Names are case-sensitive.
    pub fn from_name(name: &str) -> Option<Tag> {
        let tag = match name {
            "str" => Tag::Str,
            "float" => Tag::Float,
            "int" => Tag::Int,
            "bool" => Tag::Bool,
            "binary" => Tag::Binary,
            "timestamp" => Tag::Timestamp,
            "set" => Tag::Set,
            "omap" | "pairs" => Tag::OrderedMap,
            "seq" => Tag::Seq,
            "map" => Tag::Map,
            _ => return None,
        };
        Some(tag)
    }

    pub fn name(self) -> &'static str {
        match self {
            Tag::Auto => "auto",
            Tag::Str => "str",
            Tag::Float => "float",
            Tag::Int => "int",
            Tag::Bool => "bool",
            Tag::Binary => "binary",
            Tag::Timestamp => "timestamp",
            Tag::Set => "set",
            Tag::OrderedMap => "omap",
            Tag::Seq => "seq",
            Tag::Map => "map",
        }
    }

    /// Tags that describe collections rather than scalars.
    pub fn is_collection(self) -> bool {
        matches!(self, Tag::Set | Tag::OrderedMap | Tag::Seq | Tag::Map)
    }
}

/// Trailing line-terminator policy of a block scalar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chomping {
    /// Keep exactly one trailing terminator (no indicator).
    #[default]
    Clip,
    /// Keep every trailing terminator (`+`).
    Keep,
    /// Drop every trailing terminator (`-`).
    Strip,
}

/// `|` keeps line breaks, `>` folds them into spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    Literal,
    Folded,
}
