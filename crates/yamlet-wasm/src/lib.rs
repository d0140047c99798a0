//! WASM bindings for yamlet-core.
//!
//! Exposes `toJson`, `toJsonAll`, `fromJson` and `format` as `#[wasm_bindgen]`
//! functions callable from JavaScript/TypeScript. Built with
//! `wasm-bindgen-cli`.
//!
//! ## Build process
//!
//! ```sh
//! cargo build -p yamlet-wasm --target wasm32-unknown-unknown --release
//! wasm-bindgen --target nodejs --out-dir pkg/ \
//!   target/wasm32-unknown-unknown/release/yamlet_wasm.wasm
//! ```

use wasm_bindgen::prelude::*;
use yamlet_core::Value;

/// Parse yamlet text and return the first document as compact JSON.
///
/// An empty document becomes `null`. Throws a JS error on invalid input.
#[wasm_bindgen(js_name = toJson)]
pub fn to_json(text: &str) -> std::result::Result<String, JsValue> {
    first_as_json(text).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse yamlet text and return every document as a compact JSON array.
#[wasm_bindgen(js_name = toJsonAll)]
pub fn to_json_all(text: &str) -> std::result::Result<String, JsValue> {
    all_as_json(text).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Convert a JSON object or array into yamlet text.
///
/// Throws a JS error if the input is not valid JSON or has a scalar root.
#[wasm_bindgen(js_name = fromJson)]
pub fn from_json(json: &str) -> std::result::Result<String, JsValue> {
    json_as_yamlet(json).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Parse yamlet text and write it back in normalized form.
#[wasm_bindgen]
pub fn format(text: &str) -> std::result::Result<String, JsValue> {
    normalize(text).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn first_as_json(text: &str) -> yamlet_core::Result<String> {
    let doc = yamlet_core::parse(text)?;
    let json = doc
        .to_values()
        .first()
        .map_or(serde_json::Value::Null, Value::to_json);
    Ok(json.to_string())
}

fn all_as_json(text: &str) -> yamlet_core::Result<String> {
    let doc = yamlet_core::parse(text)?;
    let docs = doc.to_values().iter().map(Value::to_json).collect();
    Ok(serde_json::Value::Array(docs).to_string())
}

fn json_as_yamlet(json: &str) -> yamlet_core::Result<String> {
    yamlet_core::to_string(&Value::from_json_str(json)?)
}

fn normalize(text: &str) -> yamlet_core::Result<String> {
    let doc = yamlet_core::parse(text)?;
    let mut out = Vec::new();
    doc.write_to(&mut out)?;
    String::from_utf8(out).map_err(|e| yamlet_core::YamletError::Utf8(e.utf8_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_document_as_json() {
        let json = first_as_json("a: 1\nb: [x, true]\n---\nc: 2\n").unwrap();
        assert_eq!(json, r#"{"a":1,"b":["x",true]}"#);
    }

    #[test]
    fn empty_document_is_null() {
        assert_eq!(first_as_json("# only a comment\n").unwrap(), "null");
    }

    #[test]
    fn every_document_as_json() {
        let json = all_as_json("a: 1\n---\n- 2\n").unwrap();
        assert_eq!(json, r#"[{"a":1},[2]]"#);
    }

    #[test]
    fn json_to_yamlet() {
        let text = json_as_yamlet(r#"{"name":"x","tags":["a"]}"#).unwrap();
        assert_eq!(text, "name: x\ntags:\n  - a\n");
    }

    #[test]
    fn scalar_json_root_is_an_error() {
        assert!(json_as_yamlet("42").is_err());
    }

    #[test]
    fn merge_key_holding_a_map_is_an_error() {
        let err = json_as_yamlet(r#"{"<<": {"b": 1}, "c": 2}"#).unwrap_err();
        assert!(matches!(err, yamlet_core::YamletError::Shape(_)), "{err}");
    }

    #[test]
    fn normalize_reports_unwritable_values() {
        let err = normalize("a: [\"x\\n  \\ny\"]\n").unwrap_err();
        assert!(matches!(err, yamlet_core::YamletError::Shape(_)), "{err}");
    }

    #[test]
    fn normalize_resolves_aliases() {
        let text = normalize("a: &v 1\nb: *v # same\n").unwrap();
        assert_eq!(text, "a: 1\nb: 1\n");
    }

    #[test]
    fn parse_errors_carry_line_numbers() {
        let err = first_as_json("a:\n  b: 1\n c: 2\n").unwrap_err();
        assert!(err.to_string().contains("line 3"), "{err}");
    }
}
