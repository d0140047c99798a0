/// Inline flow collection tests: `{...}` maps and `[...]` lists, both through
/// the sub-parser directly and embedded in documents.
use yamlet_core::flow::parse_flow;
use yamlet_core::{parse, Value, YamletError};

fn flow(src: &str) -> Value {
    let (value, end) = parse_flow(src, 0).unwrap();
    assert_eq!(end, src.trim_end().len() - 1, "closing bracket offset");
    value
}

fn s(text: &str) -> Value {
    Value::String(text.to_string())
}

fn map(entries: Vec<(&str, Value)>) -> Value {
    Value::Map(entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
}

#[test]
fn map_with_nested_list_and_quotes() {
    let value = flow(r#"{a: 1, b: [x, 'y z'], c: "q\n"}"#);
    assert_eq!(
        value,
        map(vec![
            ("a", Value::Integer(1)),
            ("b", Value::Seq(vec![s("x"), s("y z")])),
            ("c", s("q\n")),
        ])
    );
}

#[test]
fn empty_collections() {
    assert_eq!(
        flow("[[], {}]"),
        Value::Seq(vec![Value::Seq(vec![]), Value::Map(vec![])])
    );
}

#[test]
fn bare_tokens_are_typed() {
    assert_eq!(
        flow("[true, null, ~, 2.5, -3, hello]"),
        Value::Seq(vec![
            Value::Bool(true),
            Value::Null,
            Value::Null,
            Value::Float(2.5),
            Value::Integer(-3),
            s("hello"),
        ])
    );
}

#[test]
fn quoted_tokens_stay_strings() {
    assert_eq!(flow(r#"["true", '42']"#), Value::Seq(vec![s("true"), s("42")]));
}

#[test]
fn key_without_colon_maps_to_null() {
    assert_eq!(
        flow("{a, b: 2}"),
        map(vec![("a", Value::Null), ("b", Value::Integer(2))])
    );
}

#[test]
fn key_with_empty_value_maps_to_null() {
    assert_eq!(flow("{a: , b: 1}"), map(vec![("a", Value::Null), ("b", Value::Integer(1))]));
}

#[test]
fn spans_lines_with_comments() {
    assert_eq!(
        flow("[1, # one\n 2]"),
        Value::Seq(vec![Value::Integer(1), Value::Integer(2)])
    );
}

#[test]
fn bare_token_line_breaks_fold() {
    assert_eq!(flow("[hello\n  world]"), Value::Seq(vec![s("hello world")]));
}

#[test]
fn double_quote_escapes() {
    assert_eq!(
        flow(r#"["é😀", "a\/b", "tab\there"]"#),
        Value::Seq(vec![s("é😀"), s("a/b"), s("tab\there")])
    );
}

#[test]
fn unknown_escape_keeps_backslash() {
    assert_eq!(flow(r#"["a\qb"]"#), Value::Seq(vec![s("a\\qb")]));
}

#[test]
fn single_quote_doubling() {
    assert_eq!(flow("['it''s']"), Value::Seq(vec![s("it's")]));
}

#[test]
fn colon_inside_value_is_content() {
    assert_eq!(
        flow("{url: http://x:80}"),
        map(vec![("url", s("http://x:80"))])
    );
}

// ============================================================================
// Errors
// ============================================================================

fn flow_err(src: &str) -> (usize, usize) {
    match parse_flow(src, 0) {
        Err(YamletError::Delimiter { line, column, .. }) => (line, column),
        other => panic!("expected delimiter error for {src:?}, got {other:?}"),
    }
}

#[test]
fn trailing_comma() {
    assert_eq!(flow_err("[1, 2,]"), (1, 7));
    assert_eq!(flow_err("{a: 1,}"), (1, 7));
}

#[test]
fn empty_entry() {
    assert_eq!(flow_err("[1, , 2]"), (1, 5));
}

#[test]
fn unterminated_points_at_opening_bracket() {
    assert_eq!(flow_err("[1, 2"), (1, 1));
    assert_eq!(flow_err("{a: [1"), (1, 5));
}

#[test]
fn collection_as_key() {
    assert_eq!(flow_err("{[a]: 1}"), (1, 2));
}

#[test]
fn invalid_code_point() {
    flow_err(r#"["\ud800"]"#);
}

// ============================================================================
// Embedded in documents
// ============================================================================

#[test]
fn flow_values_in_a_document() {
    let doc = parse("a: {x: 1, y: [true, null]}\nb:\n  - [1, 2]\n  - {}\n").unwrap();
    let m = doc.to_map().unwrap();
    assert_eq!(
        m[0].1,
        map(vec![
            ("x", Value::Integer(1)),
            ("y", Value::Seq(vec![Value::Bool(true), Value::Null])),
        ])
    );
    assert_eq!(
        m[1].1,
        Value::Seq(vec![
            Value::Seq(vec![Value::Integer(1), Value::Integer(2)]),
            Value::Map(vec![]),
        ])
    );
}

#[test]
fn multi_line_flow_reports_following_lines_correctly() {
    let err = parse("a: {x: 1,\n  y: 2}\nb: [1,,]\n").unwrap_err();
    assert!(matches!(err, YamletError::Delimiter { line: 3, column: 7, .. }), "{err}");
}

#[test]
fn tagged_flow_collection() {
    let doc = parse("o: !!omap [{a: 1}, {b: 2}]\n").unwrap();
    assert_eq!(
        doc.to_map().unwrap()[0].1,
        map(vec![("a", Value::Integer(1)), ("b", Value::Integer(2))])
    );
}

#[test]
fn anchored_flow_collection_is_aliasable() {
    let doc = parse("a: &list [1, 2]\nb: *list\n").unwrap();
    let m = doc.to_map().unwrap();
    assert_eq!(m[0].1, m[1].1);
}
