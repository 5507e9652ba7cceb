// SPDX-License-Identifier: MIT

//! Safe expression evaluator (spec §4.3). Runs tokenizer → parser →
//! tree-walking evaluation under a cooperative deadline, with no
//! access to the host environment — references are resolved purely
//! through the injected [`ReferenceLookup`], never through ambient
//! state.

use crate::error::PathError;
use crate::parser;
use crate::tokenizer::tokenize;
use serde_json::{Map, Value};
use std::time::Instant;
use wf_core::{codes, AstNode, ExpressionError, FlowError, PathSegment, TimeoutError};

/// Resolves a parsed reference's path segments to a value. Implemented
/// by the reference resolver (a higher crate); kept as a trait here so
/// `wf-expr` never depends on it, breaking what would otherwise be a
/// cycle (the resolver re-enters this evaluator for `expression`-typed
/// path segments).
pub trait ReferenceLookup {
    fn resolve(&mut self, segments: &[PathSegment]) -> Result<Value, PathError>;
}

/// Cooperative evaluation deadline, checked before visiting each AST
/// node (spec §4.3, §5: "single-threaded cooperative").
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    timeout_ms: u64,
}

impl Deadline {
    pub fn starting_now(timeout_ms: u64) -> Self {
        Self {
            start: Instant::now(),
            timeout_ms,
        }
    }

    fn check(&self, expression: &str) -> Result<(), FlowError> {
        let elapsed_ms = self.start.elapsed().as_millis() as u64;
        if elapsed_ms >= self.timeout_ms {
            return Err(FlowError::Timeout(TimeoutError {
                timeout_ms: self.timeout_ms,
                execution_time_ms: elapsed_ms,
                step_name: None,
                expression: Some(expression.to_string()),
            }));
        }
        Ok(())
    }
}

pub fn evaluate(
    expression: &str,
    lookup: &mut dyn ReferenceLookup,
    deadline: Deadline,
) -> Result<Value, FlowError> {
    let tokens = tokenize(expression)
        .map_err(|e| expr_err(expression, e.message, codes::TOKENIZER))?;
    let ast =
        parser::parse(&tokens).map_err(|e| expr_err(expression, e.message, codes::EXPRESSION))?;
    eval_node(&ast, lookup, deadline, expression)
}

fn expr_err(expression: &str, message: impl Into<String>, code: &str) -> FlowError {
    FlowError::Expression(ExpressionError::new(expression, message).with_code(code))
}

fn eval_node(
    node: &AstNode,
    lookup: &mut dyn ReferenceLookup,
    deadline: Deadline,
    expression: &str,
) -> Result<Value, FlowError> {
    deadline.check(expression)?;
    match node {
        AstNode::Literal(v) => Ok(v.clone()),
        AstNode::Reference(segments) => lookup.resolve(segments).map_err(|e| {
            let code = match &e {
                PathError::Syntax(_) => codes::PATH_SYNTAX.to_string(),
                PathError::Property(_) => codes::PROPERTY_ACCESS.to_string(),
                PathError::UnknownReference(_) => codes::UNKNOWN_REFERENCE.to_string(),
                PathError::Nested { code, .. } => code.clone(),
            };
            expr_err(expression, e.to_string(), &code)
        }),
        AstNode::Operation { op, left, right } => match right {
            Some(right) => eval_binary(op, left, right, lookup, deadline, expression),
            None => eval_unary(op, left, lookup, deadline, expression),
        },
        AstNode::Object(entries) => eval_object(entries, lookup, deadline, expression),
        AstNode::Array(entries) => eval_array(entries, lookup, deadline, expression),
        AstNode::Template(parts) => eval_template(parts, lookup, deadline, expression),
    }
}

fn eval_unary(
    op: &str,
    operand: &AstNode,
    lookup: &mut dyn ReferenceLookup,
    deadline: Deadline,
    expression: &str,
) -> Result<Value, FlowError> {
    let value = eval_node(operand, lookup, deadline, expression)?;
    match op {
        "!" => Ok(Value::Bool(!is_truthy(&value))),
        "-" => Ok(number_value(-to_number(&value))),
        "+" => Ok(number_value(to_number(&value))),
        other => Err(expr_err(
            expression,
            format!("unknown unary operator '{other}'"),
            codes::EXPRESSION,
        )),
    }
}

fn eval_binary(
    op: &str,
    left_node: &AstNode,
    right_node: &AstNode,
    lookup: &mut dyn ReferenceLookup,
    deadline: Deadline,
    expression: &str,
) -> Result<Value, FlowError> {
    match op {
        "&&" => {
            let left = eval_node(left_node, lookup, deadline, expression)?;
            if !is_truthy(&left) {
                return Ok(left);
            }
            eval_node(right_node, lookup, deadline, expression)
        }
        "||" => {
            let left = eval_node(left_node, lookup, deadline, expression)?;
            if is_truthy(&left) {
                return Ok(left);
            }
            eval_node(right_node, lookup, deadline, expression)
        }
        "??" => {
            let left = eval_node(left_node, lookup, deadline, expression)?;
            if !left.is_null() {
                return Ok(left);
            }
            eval_node(right_node, lookup, deadline, expression)
        }
        _ => {
            let left = eval_node(left_node, lookup, deadline, expression)?;
            let right = eval_node(right_node, lookup, deadline, expression)?;
            eval_strict_binary(op, &left, &right, expression)
        }
    }
}

fn eval_strict_binary(
    op: &str,
    left: &Value,
    right: &Value,
    expression: &str,
) -> Result<Value, FlowError> {
    match op {
        "+" => {
            if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
                Ok(Value::String(format!(
                    "{}{}",
                    to_display_string(left),
                    to_display_string(right)
                )))
            } else {
                Ok(number_value(to_number(left) + to_number(right)))
            }
        }
        "-" => Ok(number_value(to_number(left) - to_number(right))),
        "*" => Ok(number_value(to_number(left) * to_number(right))),
        "/" => {
            let divisor = to_number(right);
            if divisor == 0.0 {
                return Err(expr_err(expression, "Division by zero", codes::EXPRESSION));
            }
            Ok(number_value(to_number(left) / divisor))
        }
        "%" => {
            let divisor = to_number(right);
            if divisor == 0.0 {
                return Err(expr_err(expression, "Modulo by zero", codes::EXPRESSION));
            }
            Ok(number_value(to_number(left) % divisor))
        }
        "<" => Ok(Value::Bool(to_number(left) < to_number(right))),
        "<=" => Ok(Value::Bool(to_number(left) <= to_number(right))),
        ">" => Ok(Value::Bool(to_number(left) > to_number(right))),
        ">=" => Ok(Value::Bool(to_number(left) >= to_number(right))),
        "==" => Ok(Value::Bool(coercive_eq(left, right))),
        "!=" => Ok(Value::Bool(!coercive_eq(left, right))),
        "===" => Ok(Value::Bool(left == right)),
        "!==" => Ok(Value::Bool(left != right)),
        other => Err(expr_err(
            expression,
            format!("unknown operator '{other}'"),
            codes::EXPRESSION,
        )),
    }
}

fn eval_object(
    entries: &[wf_core::ObjectEntry],
    lookup: &mut dyn ReferenceLookup,
    deadline: Deadline,
    expression: &str,
) -> Result<Value, FlowError> {
    let mut map = Map::new();
    for entry in entries {
        if entry.spread {
            let spread_value = eval_node(&entry.value, lookup, deadline, expression)?;
            match spread_value {
                Value::Object(inner) => {
                    for (k, v) in inner {
                        map.insert(k, v);
                    }
                }
                other => {
                    return Err(expr_err(
                        expression,
                        format!("cannot spread non-object value {other}"),
                        codes::EXPRESSION,
                    ))
                }
            }
            continue;
        }
        let key_value = eval_node(&entry.key, lookup, deadline, expression)?;
        let key = match key_value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            other => {
                return Err(expr_err(
                    expression,
                    format!("object key must be a string or number, got {other}"),
                    codes::EXPRESSION,
                ))
            }
        };
        let value = eval_node(&entry.value, lookup, deadline, expression)?;
        map.insert(key, value);
    }
    Ok(Value::Object(map))
}

fn eval_array(
    entries: &[wf_core::ArrayEntry],
    lookup: &mut dyn ReferenceLookup,
    deadline: Deadline,
    expression: &str,
) -> Result<Value, FlowError> {
    let mut items = Vec::new();
    for entry in entries {
        if entry.spread {
            let spread_value = eval_node(&entry.value, lookup, deadline, expression)?;
            match spread_value {
                Value::Array(inner) => items.extend(inner),
                other => {
                    return Err(expr_err(
                        expression,
                        format!("cannot spread non-iterable value {other}"),
                        codes::EXPRESSION,
                    ))
                }
            }
        } else {
            items.push(eval_node(&entry.value, lookup, deadline, expression)?);
        }
    }
    Ok(Value::Array(items))
}

fn eval_template(
    parts: &[AstNode],
    lookup: &mut dyn ReferenceLookup,
    deadline: Deadline,
    expression: &str,
) -> Result<Value, FlowError> {
    let mut out = String::new();
    for part in parts {
        let value = eval_node(part, lookup, deadline, expression)?;
        out.push_str(&to_display_string(&value));
    }
    Ok(Value::String(out))
}

fn number_value(n: f64) -> Value {
    crate::numeric::canonical_number(n)
}

/// JS-style truthiness: false, null, 0, NaN, and "" are falsy; every
/// other value (including empty arrays/objects) is truthy.
fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// JS-style numeric coercion, restricted to the inputs this language
/// can actually produce (no `undefined`, no host objects).
fn to_number(v: &Value) -> f64 {
    match v {
        Value::Null => 0.0,
        Value::Bool(true) => 1.0,
        Value::Bool(false) => 0.0,
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(items) if items.is_empty() => 0.0,
        Value::Array(items) if items.len() == 1 => to_number(&items[0]),
        _ => f64::NAN,
    }
}

fn to_display_string(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => {
            serde_json::to_string(v).unwrap_or_else(|_| String::new())
        }
    }
}

fn coercive_eq(a: &Value, b: &Value) -> bool {
    if a == b {
        return true;
    }
    if a.is_null() || b.is_null() {
        return false;
    }
    to_number(a) == to_number(b)
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
