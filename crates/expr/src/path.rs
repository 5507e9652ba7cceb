// SPDX-License-Identifier: MIT

//! Path accessor: parses a path string into segments and reads a value
//! from a nested structure (spec §4.1).

use crate::error::{PathError, PathSyntaxError, PropertyAccessError};
use serde_json::Value;
use wf_core::{PathSegment, PathSegmentKind, PathSegmentValue};

/// `Path := Segment ( '.' Segment | '[' Index ']' )*`
/// `Segment := [A-Za-z_$][A-Za-z0-9_$]*`
pub fn parse(path: &str) -> Result<Vec<PathSegment>, PathSyntaxError> {
    if path.is_empty() {
        return Err(PathSyntaxError::new("empty path", 0));
    }
    let chars: Vec<char> = path.chars().collect();
    if chars[0] == '.' {
        return Err(PathSyntaxError::new("leading '.' is not allowed", 0));
    }

    let mut segments = Vec::new();
    let (first, mut i) = parse_identifier_segment(&chars, 0)?;
    segments.push(first);

    while i < chars.len() {
        match chars[i] {
            '.' => {
                let dot_pos = i;
                i += 1;
                if i >= chars.len() {
                    return Err(PathSyntaxError::new("path ends after '.'", dot_pos));
                }
                if chars[i] == '.' {
                    return Err(PathSyntaxError::new("consecutive '.' is not allowed", i));
                }
                if chars[i].is_ascii_digit() {
                    return Err(PathSyntaxError::new(
                        "numeric segment after '.' must use bracket form",
                        i,
                    ));
                }
                let (seg, next) = parse_identifier_segment(&chars, i)?;
                segments.push(seg);
                i = next;
            }
            '[' => {
                let (seg, next) = parse_bracket_segment(&chars, i)?;
                segments.push(seg);
                i = next;
            }
            c => {
                return Err(PathSyntaxError::new(
                    format!("invalid identifier character '{c}'"),
                    i,
                ))
            }
        }
    }

    Ok(segments)
}

fn parse_identifier_segment(
    chars: &[char],
    start: usize,
) -> Result<(PathSegment, usize), PathSyntaxError> {
    if start >= chars.len() {
        return Err(PathSyntaxError::new("expected identifier", start));
    }
    let c0 = chars[start];
    if !(c0.is_ascii_alphabetic() || c0 == '_' || c0 == '$') {
        return Err(PathSyntaxError::new(
            format!("invalid identifier character '{c0}'"),
            start,
        ));
    }
    let mut end = start + 1;
    while end < chars.len()
        && (chars[end].is_ascii_alphanumeric() || chars[end] == '_' || chars[end] == '$')
    {
        end += 1;
    }
    let name: String = chars[start..end].iter().collect();
    Ok((PathSegment::property(name), end))
}

fn parse_bracket_segment(
    chars: &[char],
    start: usize,
) -> Result<(PathSegment, usize), PathSyntaxError> {
    let mut i = start + 1;
    let content_start = i;
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    while i < chars.len() {
        let c = chars[i];
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
        } else {
            match c {
                '\'' | '"' => quote = Some(c),
                '[' => depth += 1,
                ']' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        i += 1;
    }
    if depth != 0 || i >= chars.len() {
        return Err(PathSyntaxError::new("unclosed '['", start));
    }
    let content: String = chars[content_start..i].iter().collect();
    let end = i + 1;
    let raw: String = chars[start..end].iter().collect();

    if content.is_empty() {
        return Err(PathSyntaxError::new("empty brackets", start));
    }

    // Two consecutive opening brackets are only legal when the inner
    // content is itself an identifier-rooted expression (`a[b[0]]`),
    // not a bare literal index/string (`a[[0]]`, `a[['k']]`).
    if let Some(rest) = content.strip_prefix('[') {
        if let Some(c2) = rest.chars().next() {
            if c2.is_ascii_digit() || c2 == '\'' || c2 == '"' {
                return Err(PathSyntaxError::new(
                    "two consecutive opening brackets are not allowed here",
                    start,
                ));
            }
        }
    }

    let trimmed = content.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let idx: usize = trimmed.parse().map_err(|_| {
            PathSyntaxError::new("index literal out of range", start)
        })?;
        return Ok((
            PathSegment {
                kind: PathSegmentKind::Index,
                value: PathSegmentValue::Index(idx),
                raw,
            },
            end,
        ));
    }

    if trimmed.len() >= 2 {
        let first = trimmed.chars().next().expect("non-empty checked above");
        let last = trimmed.chars().last().expect("non-empty checked above");
        if (first == '\'' && last == '\'') || (first == '"' && last == '"') {
            let inner = trimmed[1..trimmed.len() - 1].to_string();
            return Ok((
                PathSegment {
                    kind: PathSegmentKind::Property,
                    value: PathSegmentValue::Property(inner),
                    raw,
                },
                end,
            ));
        }
        if (first == '\'' && last != '\'') || (first == '"' && last != first) {
            return Err(PathSyntaxError::new("unterminated quote in bracket", start));
        }
    }

    Ok((
        PathSegment {
            kind: PathSegmentKind::Expression,
            value: PathSegmentValue::Expression(trimmed.to_string()),
            raw,
        },
        end,
    ))
}

/// Read a value by traversing `segments` against `root`. `resolve_expr`
/// evaluates `expression`-typed segments (spec §4.1: "the result must
/// be string or number").
pub fn read(
    root: &Value,
    segments: &[PathSegment],
    resolve_expr: &mut dyn FnMut(&str) -> Result<Value, PathError>,
) -> Result<Value, PathError> {
    let mut current = root.clone();
    for seg in segments {
        current = match &seg.value {
            PathSegmentValue::Property(name) => access_property(&current, name)?,
            PathSegmentValue::Index(idx) => access_index(&current, *idx)?,
            PathSegmentValue::Expression(expr) => {
                let key = resolve_expr(expr)?;
                match key {
                    Value::String(s) => access_property(&current, &s)?,
                    Value::Number(n) => {
                        let idx = n.as_u64().ok_or_else(|| {
                            PropertyAccessError::new("computed index must be non-negative")
                        })? as usize;
                        access_index(&current, idx)?
                    }
                    _ => {
                        return Err(PathSyntaxError::new(
                            "computed key must evaluate to string or number",
                            0,
                        )
                        .into())
                    }
                }
            }
        };
    }
    Ok(current)
}

fn access_property(value: &Value, name: &str) -> Result<Value, PathError> {
    match value {
        Value::Object(map) => map
            .get(name)
            .cloned()
            .ok_or_else(|| PropertyAccessError::new(format!("property '{name}' not found")).into()),
        Value::Null => {
            Err(PropertyAccessError::new(format!("cannot read property '{name}' of null")).into())
        }
        _ => Err(PropertyAccessError::new(format!(
            "cannot read property '{name}' of a non-object value"
        ))
        .into()),
    }
}

fn access_index(value: &Value, idx: usize) -> Result<Value, PathError> {
    match value {
        Value::Array(arr) => arr
            .get(idx)
            .cloned()
            .ok_or_else(|| PropertyAccessError::new(format!("index {idx} out of bounds")).into()),
        Value::Null => {
            Err(PropertyAccessError::new(format!("cannot read index {idx} of null")).into())
        }
        _ => Err(
            PropertyAccessError::new(format!("cannot read index {idx} of a non-array value"))
                .into(),
        ),
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
