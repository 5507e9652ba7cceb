use super::*;
use serde_json::json;
use wf_expr::path;

fn resolver<'a>(
    context: &'a Value,
    metadata: &'a Value,
    step_results: &'a IndexMap<String, Value>,
    locals: &'a IndexMap<String, Value>,
) -> ReferenceResolver<'a> {
    ReferenceResolver {
        context,
        metadata,
        step_results,
        locals,
        deadline: Deadline::starting_now(5_000),
    }
}

#[test]
fn roots_in_context_scope() {
    let context = json!({"user": {"name": "ada"}});
    let metadata = json!({});
    let step_results = IndexMap::new();
    let locals = IndexMap::new();
    let segments = path::parse("context.user.name").unwrap();
    let r = resolver(&context, &metadata, &step_results, &locals);
    assert_eq!(r.resolve_path(&segments).unwrap(), json!("ada"));
}

#[test]
fn roots_in_metadata_scope() {
    let context = json!({});
    let metadata = json!({"runId": "abc"});
    let step_results = IndexMap::new();
    let locals = IndexMap::new();
    let segments = path::parse("metadata.runId").unwrap();
    let r = resolver(&context, &metadata, &step_results, &locals);
    assert_eq!(r.resolve_path(&segments).unwrap(), json!("abc"));
}

#[test]
fn roots_in_declared_local_variable() {
    let context = json!({});
    let metadata = json!({});
    let step_results = IndexMap::new();
    let mut locals = IndexMap::new();
    locals.insert("item".to_string(), json!(42));
    let segments = path::parse("item").unwrap();
    let r = resolver(&context, &metadata, &step_results, &locals);
    assert_eq!(r.resolve_path(&segments).unwrap(), json!(42));
}

#[test]
fn roots_in_step_result_by_name() {
    let context = json!({});
    let metadata = json!({});
    let mut step_results = IndexMap::new();
    step_results.insert("a".to_string(), json!({"value": 10}));
    let locals = IndexMap::new();
    let segments = path::parse("a.value").unwrap();
    let r = resolver(&context, &metadata, &step_results, &locals);
    assert_eq!(r.resolve_path(&segments).unwrap(), json!(10));
}

#[test]
fn preserves_quoted_bracket_key_verbatim() {
    let context = json!({});
    let metadata = json!({});
    let mut step_results = IndexMap::new();
    step_results.insert("a".to_string(), json!({"PR Link": "http://x"}));
    let locals = IndexMap::new();
    let segments = path::parse("a['PR Link']").unwrap();
    let r = resolver(&context, &metadata, &step_results, &locals);
    assert_eq!(r.resolve_path(&segments).unwrap(), json!("http://x"));
}

#[test]
fn unrecognised_root_is_unknown_reference() {
    let context = json!({});
    let metadata = json!({});
    let step_results = IndexMap::new();
    let locals = IndexMap::new();
    let segments = path::parse("nope.x").unwrap();
    let r = resolver(&context, &metadata, &step_results, &locals);
    assert!(matches!(
        r.resolve_path(&segments).unwrap_err(),
        PathError::UnknownReference(_)
    ));
}

#[test]
fn computed_expression_segment_reenters_evaluator() {
    let context = json!({"idx": 1});
    let metadata = json!({});
    let mut step_results = IndexMap::new();
    step_results.insert("items".to_string(), json!(["x", "y", "z"]));
    let locals = IndexMap::new();
    let segments = path::parse("items[${context.idx}]").unwrap();
    let r = resolver(&context, &metadata, &step_results, &locals);
    assert_eq!(r.resolve_path(&segments).unwrap(), json!("y"));
}
