use super::*;
use serde_json::json;

#[test]
fn plain_string_without_reference_passes_through() {
    let mut eval = |_: &str| -> Result<Value, FlowError> { panic!("should not evaluate") };
    let result = resolve_value(&json!("hello world"), &mut eval).unwrap();
    assert_eq!(result, json!("hello world"));
}

#[test]
fn whole_reference_preserves_result_type() {
    let mut eval = |expr: &str| -> Result<Value, FlowError> {
        assert_eq!(expr, "${a.b}");
        Ok(json!(42))
    };
    let result = resolve_value(&json!("${a.b}"), &mut eval).unwrap();
    assert_eq!(result, json!(42));
}

#[test]
fn embedded_reference_is_stringified_and_spliced() {
    let mut eval = |_: &str| -> Result<Value, FlowError> { Ok(json!(7)) };
    let result = resolve_value(&json!("count: ${a.b} items"), &mut eval).unwrap();
    assert_eq!(result, json!("count: 7 items"));
}

#[test]
fn recurses_into_nested_objects_and_arrays() {
    let mut eval = |_: &str| -> Result<Value, FlowError> { Ok(json!("x")) };
    let input = json!({"a": ["${s.v}", "plain"], "b": "${s.v}"});
    let result = resolve_value(&input, &mut eval).unwrap();
    assert_eq!(result, json!({"a": ["x", "plain"], "b": "x"}));
}
