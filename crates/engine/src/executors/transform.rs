// SPDX-License-Identifier: MIT

//! Transform executor (spec §4.9). Every operation kind requires an
//! array pipeline value; `using` is evaluated per element (or per
//! left/right pair for `sort`, per accumulator/element pair for
//! `reduce`) except `join`, where the spec names `using` itself as the
//! literal separator rather than an expression to evaluate.

use crate::context::RunContext;
use crate::interpolate::display;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use wf_core::{StepExecutionError, StepKindName, StepResult, TransformOp, TransformOpKind, TransformStep};
use wf_expr::Deadline;

type FlowResult<T> = Result<T, wf_core::FlowError>;

pub fn execute(
    step: &TransformStep,
    ctx: &mut RunContext,
    locals: &IndexMap<String, Value>,
    deadline: Deadline,
) -> FlowResult<StepResult> {
    if step.operations.is_empty() {
        return Err(transform_err("operations must not be empty"));
    }

    let mut pipeline = match &step.input {
        Some(expr) => ctx.evaluate(expr, locals, deadline)?,
        None => Value::Null,
    };

    for op in &step.operations {
        let array = as_array(&pipeline, op.kind)?;
        pipeline = apply_op(op, array, ctx, locals, deadline)?;
        if let Some(name) = &op.as_name {
            ctx.set_context_var(name, pipeline.clone());
        }
    }

    Ok(StepResult {
        result: pipeline,
        kind: StepKindName::Transform,
        metadata: None,
    })
}

fn as_array(value: &Value, kind: TransformOpKind) -> FlowResult<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items.clone()),
        _ => Err(transform_err(format!(
            "{} requires an array input",
            kind_name(kind)
        ))),
    }
}

fn kind_name(kind: TransformOpKind) -> &'static str {
    match kind {
        TransformOpKind::Map => "map",
        TransformOpKind::Filter => "filter",
        TransformOpKind::Reduce => "reduce",
        TransformOpKind::Flatten => "flatten",
        TransformOpKind::Sort => "sort",
        TransformOpKind::Unique => "unique",
        TransformOpKind::Group => "group",
        TransformOpKind::Join => "join",
    }
}

fn apply_op(
    op: &TransformOp,
    items: Vec<Value>,
    ctx: &mut RunContext,
    locals: &IndexMap<String, Value>,
    deadline: Deadline,
) -> FlowResult<Value> {
    match op.kind {
        TransformOpKind::Map => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(eval_with(ctx, &op.using, "item", item, locals, deadline)?);
            }
            Ok(Value::Array(out))
        }
        TransformOpKind::Filter => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                let keep = eval_with(ctx, &op.using, "item", item.clone(), locals, deadline)?;
                if is_truthy(&keep) {
                    out.push(item);
                }
            }
            Ok(Value::Array(out))
        }
        TransformOpKind::Reduce => {
            let mut acc = op.initial.clone().unwrap_or(Value::Null);
            for item in items {
                let mut scope = locals.clone();
                scope.insert("acc".to_string(), acc);
                scope.insert("item".to_string(), item);
                acc = ctx.evaluate(&op.using, &scope, deadline)?;
            }
            Ok(acc)
        }
        TransformOpKind::Flatten => {
            let mut out = Vec::new();
            for item in items {
                let nested = eval_with(ctx, &op.using, "item", item, locals, deadline)?;
                match nested {
                    Value::Array(inner) => out.extend(inner),
                    other => out.push(other),
                }
            }
            Ok(Value::Array(out))
        }
        TransformOpKind::Sort => {
            let mut out = items;
            let mut sort_err = None;
            out.sort_by(|a, b| {
                if sort_err.is_some() {
                    return std::cmp::Ordering::Equal;
                }
                let mut scope = locals.clone();
                scope.insert("a".to_string(), a.clone());
                scope.insert("b".to_string(), b.clone());
                match ctx.evaluate(&op.using, &scope, deadline) {
                    Ok(v) => v
                        .as_f64()
                        .unwrap_or(0.0)
                        .partial_cmp(&0.0)
                        .unwrap_or(std::cmp::Ordering::Equal),
                    Err(e) => {
                        sort_err = Some(e);
                        std::cmp::Ordering::Equal
                    }
                }
            });
            if let Some(e) = sort_err {
                return Err(e);
            }
            Ok(Value::Array(out))
        }
        TransformOpKind::Unique => {
            let mut seen = Vec::new();
            let mut out = Vec::new();
            for item in items {
                let identity = eval_with(ctx, &op.using, "item", item.clone(), locals, deadline)?;
                if !seen.contains(&identity) {
                    seen.push(identity);
                    out.push(item);
                }
            }
            Ok(Value::Array(out))
        }
        TransformOpKind::Group => {
            let mut groups: Map<String, Value> = Map::new();
            for item in items {
                let key = eval_with(ctx, &op.using, "item", item.clone(), locals, deadline)?;
                let key = display(&key);
                match groups.get_mut(&key) {
                    Some(Value::Array(bucket)) => bucket.push(item),
                    _ => {
                        groups.insert(key, Value::Array(vec![item]));
                    }
                }
            }
            Ok(Value::Object(groups))
        }
        TransformOpKind::Join => {
            let separator = op.using.as_str();
            let joined = items
                .iter()
                .map(display)
                .collect::<Vec<_>>()
                .join(separator);
            Ok(Value::String(joined))
        }
    }
}

fn eval_with(
    ctx: &mut RunContext,
    expression: &str,
    local_name: &str,
    local_value: Value,
    locals: &IndexMap<String, Value>,
    deadline: Deadline,
) -> FlowResult<Value> {
    let mut scope = locals.clone();
    scope.insert(local_name.to_string(), local_value);
    ctx.evaluate(expression, &scope, deadline)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn transform_err(message: impl Into<String>) -> wf_core::FlowError {
    wf_core::FlowError::Step(StepExecutionError::Transform(message.into()))
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
