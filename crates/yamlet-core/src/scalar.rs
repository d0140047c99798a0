//! Scalar resolution and tag coercion.
//!
//! Untagged plain scalars are classified by content in this order:
//! null → bool → integer → float → string. Quoted and block scalars are
//! always strings unless an explicit `!!tag` says otherwise.

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::types::{Tag, Value};

/// Classify an untagged plain scalar.
pub fn resolve_plain(text: &str) -> Value {
    let s = text.trim();

    if is_null(s) {
        return Value::Null;
    }
    match s {
        "true" | "True" | "TRUE" => return Value::Bool(true),
        "false" | "False" | "FALSE" => return Value::Bool(false),
        _ => {}
    }
    if looks_like_int(s) {
        if let Some(n) = parse_int(s) {
            return Value::Integer(n);
        }
    }
    if let Some(f) = parse_special_float(s) {
        return Value::Float(f);
    }
    if looks_like_int(s) || looks_like_float(s) {
        // Integers too large for i64 still read as numbers.
        if let Ok(f) = s.parse::<f64>() {
            return Value::Float(f);
        }
    }
    Value::String(s.to_string())
}

/// Coerce the text of a scalar to an explicit tag.
///
/// `Auto` resolves the text as a plain scalar. Collection tags accept only an
/// empty (null) scalar, which becomes an empty collection.
pub fn coerce(tag: Tag, text: &str) -> Result<Value, String> {
    let s = text.trim();
    match tag {
        Tag::Auto => Ok(resolve_plain(s)),
        Tag::Str => Ok(Value::String(text.to_string())),
        Tag::Int => parse_int(s)
            .map(Value::Integer)
            .ok_or_else(|| format!("'{s}' is not a valid !!int")),
        Tag::Float => parse_float(s)
            .map(Value::Float)
            .ok_or_else(|| format!("'{s}' is not a valid !!float")),
        Tag::Bool => parse_bool(s)
            .map(Value::Bool)
            .ok_or_else(|| format!("'{s}' is not a valid !!bool")),
        Tag::Binary => decode_binary(s)
            .map(Value::Binary)
            .ok_or_else(|| "invalid base64 in !!binary scalar".to_string()),
        Tag::Timestamp => parse_timestamp(s)
            .map(Value::Timestamp)
            .ok_or_else(|| format!("'{s}' is not a valid !!timestamp")),
        Tag::Set | Tag::Map | Tag::OrderedMap if is_null(s) => Ok(Value::Map(Vec::new())),
        Tag::Seq if is_null(s) => Ok(Value::Seq(Vec::new())),
        Tag::Set | Tag::Map | Tag::OrderedMap | Tag::Seq => Err(format!(
            "!!{} cannot tag the scalar '{s}'",
            tag.name()
        )),
    }
}

/// Coerce an already-resolved value to an explicit tag.
///
/// Used for tagged flow collections and for `NodeRef::value_as` hints.
pub fn coerce_value(tag: Tag, value: Value) -> Result<Value, String> {
    match (tag, value) {
        (Tag::Auto, v) => Ok(v),
        (Tag::Str, Value::String(s)) => Ok(Value::String(s)),
        (Tag::Int, Value::Integer(n)) => Ok(Value::Integer(n)),
        (Tag::Int, Value::Float(f)) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Ok(Value::Integer(f as i64))
        }
        (Tag::Float, Value::Float(f)) => Ok(Value::Float(f)),
        (Tag::Float, Value::Integer(n)) => Ok(Value::Float(n as f64)),
        (Tag::Bool, Value::Bool(b)) => Ok(Value::Bool(b)),
        (Tag::Binary, Value::Binary(b)) => Ok(Value::Binary(b)),
        (Tag::Timestamp, Value::Timestamp(ts)) => Ok(Value::Timestamp(ts)),
        (Tag::Seq, Value::Seq(items)) => Ok(Value::Seq(items)),
        (Tag::Seq, Value::Null) => Ok(Value::Seq(Vec::new())),
        (Tag::Map | Tag::Set | Tag::OrderedMap, Value::Map(entries)) => Ok(Value::Map(entries)),
        (Tag::Map | Tag::Set | Tag::OrderedMap, Value::Null) => Ok(Value::Map(Vec::new())),
        (Tag::OrderedMap, Value::Seq(items)) => flatten_pairs(&items)
            .map(Value::Map)
            .ok_or_else(|| "!!omap list items must be single-pair maps".to_string()),
        (tag, v) if !tag.is_collection() => match scalar_text(&v) {
            Some(text) => coerce(tag, &text),
            None => Err(format!("!!{} cannot tag a {}", tag.name(), v.kind())),
        },
        (tag, v) => Err(format!("!!{} cannot tag a {}", tag.name(), v.kind())),
    }
}

/// Flatten a list of single-pair maps (`!!omap` / `!!pairs`) into one map.
pub fn flatten_pairs(items: &[Value]) -> Option<Vec<(String, Value)>> {
    items
        .iter()
        .map(|item| match item {
            Value::Map(entries) if entries.len() == 1 => Some(entries[0].clone()),
            _ => None,
        })
        .collect()
}

/// Textual form of a scalar value, as it would appear untagged.
pub fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(f) => format_float(*f),
        Value::String(s) => s.clone(),
        Value::Binary(bytes) => B64.encode(bytes),
        Value::Timestamp(ts) => ts.to_rfc3339(),
        Value::Seq(_) | Value::Map(_) => return None,
    };
    Some(text)
}

/// Format a float so that it reads back as a float: always a `.`, an
/// exponent, or one of the `.inf` / `.nan` forms.
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return ".nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { ".inf" } else { "-.inf" }.to_string();
    }
    let s = format!("{}", f);
    if s.contains(['.', 'e', 'E']) {
        s
    } else {
        format!("{s}.0")
    }
}

fn is_null(s: &str) -> bool {
    matches!(s, "" | "~" | "null" | "Null" | "NULL")
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" => Some(true),
        "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Decimal, `0x` hex or `0o` octal integer with an optional sign.
fn looks_like_int(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    if let Some(hex) = digits.strip_prefix("0x") {
        return !hex.is_empty() && hex.bytes().all(|b| b.is_ascii_hexdigit());
    }
    if let Some(oct) = digits.strip_prefix("0o") {
        return !oct.is_empty() && oct.bytes().all(|b| (b'0'..=b'7').contains(&b));
    }
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `[-+]?(\.[0-9]+|[0-9]+(\.[0-9]*)?)([eE][-+]?[0-9]+)?`
fn looks_like_float(s: &str) -> bool {
    let rest = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (mantissa, exponent) = match rest.find(['e', 'E']) {
        Some(pos) => (&rest[..pos], Some(&rest[pos + 1..])),
        None => (rest, None),
    };
    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (mantissa, None),
    };
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = match frac_part {
        Some(f) => all_digits(int_part) && all_digits(f) && !(int_part.is_empty() && f.is_empty()),
        None => !int_part.is_empty() && all_digits(int_part),
    };
    let exponent_ok = match exponent {
        Some(e) => {
            let e = e.strip_prefix(['-', '+']).unwrap_or(e);
            !e.is_empty() && all_digits(e)
        }
        None => true,
    };
    mantissa_ok && exponent_ok
}

fn parse_special_float(s: &str) -> Option<f64> {
    match s {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => Some(f64::NAN),
        _ => None,
    }
}

fn parse_int(s: &str) -> Option<i64> {
    let cleaned: String = s.chars().filter(|&c| c != '_').collect();
    let (sign, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", cleaned.strip_prefix('+').unwrap_or(&cleaned)),
    };
    if digits.starts_with(['-', '+']) {
        return None;
    }
    let (radix, body) = if let Some(hex) = digits.strip_prefix("0x") {
        (16, hex)
    } else if let Some(oct) = digits.strip_prefix("0o") {
        (8, oct)
    } else if let Some(bin) = digits.strip_prefix("0b") {
        (2, bin)
    } else {
        (10, digits)
    };
    if body.is_empty() || body.starts_with(['-', '+']) {
        return None;
    }
    i64::from_str_radix(&format!("{sign}{body}"), radix).ok()
}

fn parse_float(s: &str) -> Option<f64> {
    if let Some(f) = parse_special_float(s) {
        return Some(f);
    }
    let cleaned: String = s.chars().filter(|&c| c != '_').collect();
    if looks_like_float(&cleaned) {
        return cleaned.parse().ok();
    }
    parse_int(&cleaned).map(|n| n as f64)
}

/// Parse a YAML timestamp: RFC 3339 (with `T`, `t` or a space between date
/// and time), a zone-less date-time (read as UTC), or a bare date (midnight UTC).
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts);
    }
    let normalized = match s.as_bytes().get(10) {
        // `2001-12-14 21:59:43.10 -05:00`: drop the space before the zone too.
        Some(b' ' | b't') => format!(
            "{}T{}",
            &s[..10],
            s[11..].split_whitespace().collect::<String>()
        ),
        _ => s.to_string(),
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(ts);
    }
    let utc = FixedOffset::east_opt(0)?;
    if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_local_timezone(utc).single();
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0)?.and_local_timezone(utc).single();
    }
    None
}

/// Decode a `!!binary` payload, ignoring embedded whitespace (block scalars
/// commonly wrap long payloads).
pub fn decode_binary(s: &str) -> Option<Vec<u8>> {
    let compact: String = s.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    B64.decode(compact).ok()
}

/// Find the closing `"` of a double-quoted string whose body starts at
/// `start`, skipping backslash escapes.
pub fn find_closing_double(s: &str, start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Find the closing `'` of a single-quoted string whose body starts at
/// `start`. A doubled `''` is an escaped quote.
pub fn find_closing_single(s: &str, start: usize) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        if bytes[i] == b'\'' {
            if bytes.get(i + 1) == Some(&b'\'') {
                i += 2;
                continue;
            }
            return Some(i);
        }
        i += 1;
    }
    None
}

/// Decode the body of a single-quoted string.
pub fn unescape_single(s: &str) -> String {
    s.replace("''", "'")
}

/// Decode the body of a double-quoted string.
///
/// Handles `\" \\ \/ \n \r \t \b \f \0 \uXXXX` (with surrogate pairs).
/// Unknown escapes pass through with the backslash kept.
pub fn unescape_double(s: &str) -> Result<String, String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('/') => out.push('/'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let high = read_hex4(&mut chars)?;
                let code = if (0xD800..0xDC00).contains(&high) {
                    if chars.next() != Some('\\') || chars.next() != Some('u') {
                        return Err(format!("unpaired surrogate \\u{high:04X}"));
                    }
                    let low = read_hex4(&mut chars)?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(format!("invalid low surrogate \\u{low:04X}"));
                    }
                    0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
                } else {
                    high
                };
                let ch = char::from_u32(code)
                    .ok_or_else(|| format!("invalid unicode escape \\u{code:04X}"))?;
                out.push(ch);
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    Ok(out)
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Result<u32, String> {
    let hex: String = chars.by_ref().take(4).collect();
    if hex.len() != 4 {
        return Err("truncated \\u escape".to_string());
    }
    u32::from_str_radix(&hex, 16).map_err(|_| format!("invalid \\u escape '{hex}'"))
}

/// Quote a single-line string so the line scanner reads it back verbatim.
///
/// Line-level quoted scalars get no backslash processing, so double quotes
/// are used only when the text has no `"` or `\`; otherwise single quotes,
/// with `'` doubled. `None` for text containing a line break.
pub fn quote_verbatim(s: &str) -> Option<String> {
    if s.contains('\n') {
        return None;
    }
    if !s.contains(['"', '\\']) {
        return Some(format!("\"{s}\""));
    }
    Some(format!("'{}'", s.replace('\'', "''")))
}
