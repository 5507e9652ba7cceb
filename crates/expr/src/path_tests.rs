use super::*;
use serde_json::json;

#[test]
fn parses_dotted_identifier_chain() {
    let segs = parse("a.b.c").unwrap();
    assert_eq!(segs.len(), 3);
    assert_eq!(segs[0].value, PathSegmentValue::Property("a".into()));
    assert_eq!(segs[1].value, PathSegmentValue::Property("b".into()));
    assert_eq!(segs[2].value, PathSegmentValue::Property("c".into()));
}

#[test]
fn parses_numeric_index_bracket() {
    let segs = parse("items[0]").unwrap();
    assert_eq!(segs[1].value, PathSegmentValue::Index(0));
}

#[test]
fn parses_quoted_bracket_property() {
    let segs = parse("items['weird key']").unwrap();
    assert_eq!(
        segs[1].value,
        PathSegmentValue::Property("weird key".into())
    );
}

#[test]
fn parses_nested_bracket_expression() {
    let segs = parse("items[idx]").unwrap();
    match &segs[1].value {
        PathSegmentValue::Expression(e) => assert_eq!(e, "idx"),
        other => panic!("expected expression segment, got {other:?}"),
    }
}

#[test]
fn rejects_leading_dot() {
    assert!(parse(".a").is_err());
}

#[test]
fn rejects_empty_path() {
    assert!(parse("").is_err());
}

#[test]
fn rejects_consecutive_dots() {
    assert!(parse("a..b").is_err());
}

#[test]
fn rejects_empty_brackets() {
    assert!(parse("a[]").is_err());
}

#[test]
fn rejects_numeric_segment_after_dot() {
    assert!(parse("a.0").is_err());
}

#[test]
fn rejects_unclosed_quote_in_bracket() {
    assert!(parse("a['b]").is_err());
}

#[test]
fn rejects_literal_index_in_double_bracket() {
    assert!(parse("a[[0]]").is_err());
}

#[test]
fn format_path_round_trips_identifier_chain() {
    let segs = parse("a.b[0]['weird key']").unwrap();
    let formatted = format_path(&segs);
    let reparsed = parse(&formatted).unwrap();
    assert_eq!(segs, reparsed);
}

#[test]
fn read_traverses_object_and_array() {
    let root = json!({"a": {"b": [10, 20, 30]}});
    let segs = parse("a.b[1]").unwrap();
    let mut resolve = |_: &str| -> Result<Value, PathError> { unreachable!() };
    let result = read(&root, &segs, &mut resolve).unwrap();
    assert_eq!(result, json!(20));
}

#[test]
fn read_evaluates_expression_segment_as_computed_key() {
    let root = json!({"items": ["x", "y", "z"]});
    let segs = parse("items[idx]").unwrap();
    let mut resolve = |expr: &str| -> Result<Value, PathError> {
        assert_eq!(expr, "idx");
        Ok(json!(2))
    };
    let result = read(&root, &segs, &mut resolve).unwrap();
    assert_eq!(result, json!("z"));
}

#[test]
fn read_errors_on_missing_property() {
    let root = json!({"a": 1});
    let segs = parse("missing").unwrap();
    let mut resolve = |_: &str| -> Result<Value, PathError> { unreachable!() };
    assert!(read(&root, &segs, &mut resolve).is_err());
}

#[test]
fn read_errors_on_index_out_of_bounds() {
    let root = json!({"a": [1, 2]});
    let segs = parse("a[5]").unwrap();
    let mut resolve = |_: &str| -> Result<Value, PathError> { unreachable!() };
    assert!(read(&root, &segs, &mut resolve).is_err());
}
