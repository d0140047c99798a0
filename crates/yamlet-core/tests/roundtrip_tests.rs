/// Roundtrip tests: parse → write → parse preserves the map view, and writing
/// is idempotent once a document has been normalized.
use yamlet_core::{parse, to_string, Value};

/// Assert that `text` survives a write/re-parse cycle with the same values.
fn assert_roundtrip(text: &str) {
    let first = parse(text).expect("initial parse failed").to_values();
    for (i, value) in first.iter().enumerate() {
        let written = to_string(value).expect("write failed");
        let reparsed = parse(&written)
            .unwrap_or_else(|e| panic!("re-parse failed: {e}\n--- written ---\n{written}"));
        let again = reparsed.to_values().remove(0);
        let expected = match value {
            Value::Map(m) if m.is_empty() => Value::Null,
            Value::Seq(s) if s.is_empty() => Value::Null,
            v => v.clone(),
        };
        assert_eq!(
            again, expected,
            "roundtrip of segment {i} changed values\n--- input ---\n{text}\n--- written ---\n{written}"
        );
    }
}

/// Assert that writing a normalized document reproduces it byte for byte.
fn assert_idempotent(text: &str) {
    let once = parse(text).unwrap().to_string();
    let twice = parse(&once).unwrap().to_string();
    assert_eq!(once, twice);
}

#[test]
fn roundtrip_flat_map() {
    assert_roundtrip("a: 1\nb: two\nc: 3.5\nd: true\ne: ~\n");
}

#[test]
fn roundtrip_nested() {
    assert_roundtrip("a:\n  b:\n    c: [1, 2, {d: e}]\n  f:\n    - x\n    - - y\n      - z\n");
}

#[test]
fn roundtrip_strings_needing_quotes() {
    assert_roundtrip(
        "a: \"true\"\nb: '42'\nc: \"x: y\"\nd: \" padded \"\ne: \"\"\nf: \"#hash\"\ng: \"tab\\there\"\nh: \"- dash\"\n",
    );
}

#[test]
fn roundtrip_block_scalars() {
    assert_roundtrip(
        "clip: |\n  one\n  two\nstrip: |-\n  one\nkeep: |+\n  one\n\n\nfolded: >\n  a\n  b\nindented: |2\n    deep\n  shallow\n",
    );
}

#[test]
fn roundtrip_blank_line_inside_block() {
    assert_roundtrip("a: |\n  one\n\n  three\nb: 1\n");
}

#[test]
fn roundtrip_tagged_values() {
    assert_roundtrip(
        "bin: !!binary aGVsbG8=\nts: !!timestamp 2001-12-14 21:59:43.10 -05:00\nday: !!timestamp 2002-12-14\n",
    );
}

#[test]
fn roundtrip_array_of_maps() {
    assert_roundtrip(
        "- name: a\n  tags: [x, y]\n  meta:\n    k: v\n- name: b\n  empty: {}\n  none: []\n",
    );
}

#[test]
fn roundtrip_with_anchors_compares_resolved_values() {
    assert_roundtrip("base: &b\n  x: 1\none:\n  <<: *b\n  y: 2\ntwo: *b\n");
}

#[test]
fn roundtrip_unicode_and_special_keys() {
    assert_roundtrip("\"key with: colon\": 1\ncafé: naïve\n\"\": empty key\n'#': hash\n");
}

#[test]
fn roundtrip_multi_document() {
    assert_roundtrip("a: 1\n---\n- 2\n---\nc:\n  d: 3\n");
}

#[test]
fn write_is_idempotent() {
    assert_idempotent("a: &x 1\nb: *x\nc: |\n  text\nd: [1, {e: f}]\n# comment\ng: 'quoted'\n");
    assert_idempotent("- - 1\n  - 2\n- k: v\n  l:\n    - m\n");
    assert_idempotent("a: 1\n---\nb: 2\n");
}
