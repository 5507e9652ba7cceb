use super::*;
use crate::context::no_locals;
use std::collections::HashMap;
use wf_core::TransformOpKind;
use wf_expr::Deadline;

fn ctx() -> RunContext {
    RunContext::new(HashMap::new(), Value::Null)
}

fn op(kind: TransformOpKind, using: &str) -> TransformOp {
    TransformOp {
        kind,
        using: using.to_string(),
        as_name: None,
        initial: None,
    }
}

fn run(step: &TransformStep) -> FlowResult<StepResult> {
    execute(step, &mut ctx(), &no_locals(), Deadline::starting_now(5_000))
}

#[test]
fn map_doubles_each_element() {
    let step = TransformStep {
        input: Some("${context.v}".to_string()),
        operations: vec![op(TransformOpKind::Map, "${item} * 2")],
    };
    let mut c = RunContext::new(
        HashMap::from([("v".to_string(), serde_json::json!([1, 2, 3]))]),
        Value::Null,
    );
    let result = execute(
        &step,
        &mut c,
        &no_locals(),
        Deadline::starting_now(5_000),
    )
    .unwrap();
    assert_eq!(result.result, serde_json::json!([2, 4, 6]));
}

#[test]
fn filter_keeps_only_truthy_predicate_results() {
    let mut c = RunContext::new(
        HashMap::from([("v".to_string(), serde_json::json!([1, 2, 3, 4]))]),
        Value::Null,
    );
    let step = TransformStep {
        input: Some("${context.v}".to_string()),
        operations: vec![op(TransformOpKind::Filter, "${item} >= 3")],
    };
    let result = execute(&step, &mut c, &no_locals(), Deadline::starting_now(5_000)).unwrap();
    assert_eq!(result.result, serde_json::json!([3, 4]));
}

#[test]
fn reduce_accumulates_with_initial_value() {
    let mut c = RunContext::new(
        HashMap::from([("v".to_string(), serde_json::json!([1, 2, 3]))]),
        Value::Null,
    );
    let mut reduce_op = op(TransformOpKind::Reduce, "${acc} + ${item}");
    reduce_op.initial = Some(serde_json::json!(10));
    let step = TransformStep {
        input: Some("${context.v}".to_string()),
        operations: vec![reduce_op],
    };
    let result = execute(&step, &mut c, &no_locals(), Deadline::starting_now(5_000)).unwrap();
    assert_eq!(result.result, serde_json::json!(16));
}

#[test]
fn sort_orders_ascending_by_comparator() {
    let mut c = RunContext::new(
        HashMap::from([("v".to_string(), serde_json::json!([3, 1, 2]))]),
        Value::Null,
    );
    let step = TransformStep {
        input: Some("${context.v}".to_string()),
        operations: vec![op(TransformOpKind::Sort, "${a} - ${b}")],
    };
    let result = execute(&step, &mut c, &no_locals(), Deadline::starting_now(5_000)).unwrap();
    assert_eq!(result.result, serde_json::json!([1, 2, 3]));
}

#[test]
fn unique_dedupes_by_evaluated_identity() {
    let mut c = RunContext::new(
        HashMap::from([("v".to_string(), serde_json::json!([1, 2, 1, 3, 2]))]),
        Value::Null,
    );
    let step = TransformStep {
        input: Some("${context.v}".to_string()),
        operations: vec![op(TransformOpKind::Unique, "${item}")],
    };
    let result = execute(&step, &mut c, &no_locals(), Deadline::starting_now(5_000)).unwrap();
    assert_eq!(result.result, serde_json::json!([1, 2, 3]));
}

#[test]
fn group_buckets_elements_by_evaluated_key() {
    let mut c = RunContext::new(
        HashMap::from([("v".to_string(), serde_json::json!([1, 2, 3, 4]))]),
        Value::Null,
    );
    let step = TransformStep {
        input: Some("${context.v}".to_string()),
        operations: vec![op(TransformOpKind::Group, "${item} % 2 == 0 ? 'even' : 'odd'")],
    };
    let result = execute(&step, &mut c, &no_locals(), Deadline::starting_now(5_000));
    // The evaluator has no ternary operator (spec §4.2); this using-
    // expression is intentionally invalid to prove group propagates
    // evaluation errors rather than silently grouping.
    assert!(result.is_err());
}

#[test]
fn join_uses_using_as_literal_separator() {
    let mut c = RunContext::new(
        HashMap::from([("v".to_string(), serde_json::json!(["a", "b", "c"]))]),
        Value::Null,
    );
    let step = TransformStep {
        input: Some("${context.v}".to_string()),
        operations: vec![op(TransformOpKind::Join, ", ")],
    };
    let result = execute(&step, &mut c, &no_locals(), Deadline::starting_now(5_000)).unwrap();
    assert_eq!(result.result, serde_json::json!("a, b, c"));
}

#[test]
fn non_array_input_is_a_transform_error() {
    let step = TransformStep {
        input: Some("${context.v}".to_string()),
        operations: vec![op(TransformOpKind::Map, "${item}")],
    };
    let mut c = RunContext::new(
        HashMap::from([("v".to_string(), serde_json::json!(42))]),
        Value::Null,
    );
    let err = execute(&step, &mut c, &no_locals(), Deadline::starting_now(5_000)).unwrap_err();
    assert!(matches!(
        err,
        wf_core::FlowError::Step(StepExecutionError::Transform(_))
    ));
}

#[test]
fn empty_operations_is_rejected() {
    let step = TransformStep {
        input: None,
        operations: vec![],
    };
    let err = run(&step).unwrap_err();
    assert!(matches!(
        err,
        wf_core::FlowError::Step(StepExecutionError::Transform(_))
    ));
}
