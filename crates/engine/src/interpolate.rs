// SPDX-License-Identifier: MIT

//! Reference interpolation inside arbitrary JSON values (spec §4.9
//! Request executor: "resolves references inside params").
//!
//! A string leaf is handled one of three ways: a string that is
//! exactly one whole `${...}` reference evaluates directly, preserving
//! the result's type; a string with `${...}` embedded among other text
//! is template-like and every reference is stringified and spliced in;
//! a string with no `${` at all passes through untouched.

use serde_json::{Map, Value};
use wf_core::FlowError;

pub fn resolve_value(
    value: &Value,
    eval: &mut impl FnMut(&str) -> Result<Value, FlowError>,
) -> Result<Value, FlowError> {
    match value {
        Value::String(s) => resolve_string(s, eval),
        Value::Array(items) => items
            .iter()
            .map(|v| resolve_value(v, eval))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| resolve_value(v, eval).map(|rv| (k.clone(), rv)))
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        other => Ok(other.clone()),
    }
}

fn resolve_string(
    s: &str,
    eval: &mut impl FnMut(&str) -> Result<Value, FlowError>,
) -> Result<Value, FlowError> {
    if !s.contains("${") {
        return Ok(Value::String(s.to_string()));
    }
    if is_single_whole_reference(s) {
        return eval(s);
    }

    let mut out = String::new();
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < s.len() {
        if bytes[i] == b'$' && i + 1 < s.len() && bytes[i + 1] == b'{' {
            let mut depth = 1;
            let mut j = i + 2;
            while j < s.len() && depth > 0 {
                match bytes[j] {
                    b'{' => depth += 1,
                    b'}' => depth -= 1,
                    _ => {}
                }
                j += 1;
            }
            let reference = &s[i..j];
            let value = eval(reference)?;
            out.push_str(&display(&value));
            i = j;
        } else {
            let ch = s[i..].chars().next().expect("i < s.len() guarantees a char");
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    Ok(Value::String(out))
}

fn is_single_whole_reference(s: &str) -> bool {
    if !s.starts_with("${") {
        return false;
    }
    let mut depth = 0;
    for (i, c) in s.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return i == s.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

/// JS-like string coercion for spliced template values.
pub fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
#[path = "interpolate_tests.rs"]
mod tests;
