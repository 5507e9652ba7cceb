// SPDX-License-Identifier: MIT

//! Shunting-yard parser: token stream → postfix → AST (spec §4.3).

use crate::error::ParserError;
use crate::path;
use wf_core::{ArrayEntry, AstNode, ObjectEntry, Token};

pub fn parse(tokens: &[Token]) -> Result<AstNode, ParserError> {
    let mut output: Vec<AstNode> = Vec::new();
    let mut ops: Vec<(String, bool)> = Vec::new();
    let mut expect_operand = true;

    for token in tokens {
        match token {
            Token::Punctuation { value, .. } if value == "(" => {
                if !expect_operand {
                    return Err(ParserError::new("unexpected '(' where an operator was expected"));
                }
                ops.push(("(".into(), false));
                expect_operand = true;
            }
            Token::Punctuation { value, .. } if value == ")" => {
                if expect_operand {
                    return Err(ParserError::new("unexpected ')'"));
                }
                loop {
                    match ops.last() {
                        Some((op, _)) if op == "(" => break,
                        Some(_) => apply_top(&mut ops, &mut output)?,
                        None => return Err(ParserError::new("mismatched parentheses")),
                    }
                }
                ops.pop();
                expect_operand = false;
            }
            Token::Operator { value: op, .. } => {
                if expect_operand {
                    if op == "!" || op == "-" || op == "+" {
                        ops.push((op.clone(), true));
                    } else {
                        return Err(ParserError::new(format!(
                            "unexpected operator '{op}', expected an operand"
                        )));
                    }
                } else {
                    while let Some((top, top_is_unary)) = ops.last().cloned() {
                        if top == "(" {
                            break;
                        }
                        if precedence(&top, top_is_unary) >= precedence(op, false) {
                            apply_top(&mut ops, &mut output)?;
                        } else {
                            break;
                        }
                    }
                    ops.push((op.clone(), false));
                    expect_operand = true;
                }
            }
            Token::Reference { .. }
            | Token::Number { .. }
            | Token::Str { .. }
            | Token::Identifier { .. }
            | Token::ObjectLiteral { .. }
            | Token::ArrayLiteral { .. }
            | Token::TemplateLiteral { .. } => {
                if !expect_operand {
                    return Err(ParserError::new(
                        "unexpected value, expected an operator",
                    ));
                }
                output.push(build_primary(token)?);
                expect_operand = false;
            }
            Token::Punctuation { value, .. } => {
                return Err(ParserError::new(format!("unexpected token '{value}'")));
            }
        }
    }

    if expect_operand {
        return Err(ParserError::new("unexpected end of expression"));
    }
    while !ops.is_empty() {
        if ops.last().map(|(op, _)| op.as_str()) == Some("(") {
            return Err(ParserError::new("mismatched parentheses"));
        }
        apply_top(&mut ops, &mut output)?;
    }

    if output.len() != 1 {
        return Err(ParserError::new("malformed expression"));
    }
    Ok(output.pop().expect("checked length above"))
}

/// Binding power for the pop loop (spec §4.3 precedence table). Prefix
/// `!`/`-`/`+` sit at level 8, above every binary operator, so a unary
/// op on the stack always resolves before the binary op that follows it.
fn precedence(op: &str, is_unary: bool) -> u8 {
    if is_unary {
        return 8;
    }
    match op {
        "||" => 1,
        "&&" => 2,
        "==" | "!=" | "===" | "!==" => 3,
        "<" | "<=" | ">" | ">=" => 4,
        "+" | "-" => 5,
        "*" | "/" | "%" => 6,
        "??" => 7,
        _ => 0,
    }
}

fn apply_top(ops: &mut Vec<(String, bool)>, output: &mut Vec<AstNode>) -> Result<(), ParserError> {
    let (op, is_unary) = ops.pop().expect("caller checked non-empty");
    if is_unary {
        let operand = output
            .pop()
            .ok_or_else(|| ParserError::new(format!("unary '{op}' is missing an operand")))?;
        output.push(AstNode::Operation {
            op,
            left: Box::new(operand),
            right: None,
        });
    } else {
        let right = output
            .pop()
            .ok_or_else(|| ParserError::new(format!("operator '{op}' is missing a right operand")))?;
        let left = output
            .pop()
            .ok_or_else(|| ParserError::new(format!("operator '{op}' is missing a left operand")))?;
        output.push(AstNode::Operation {
            op,
            left: Box::new(left),
            right: Some(Box::new(right)),
        });
    }
    Ok(())
}

fn build_primary(token: &Token) -> Result<AstNode, ParserError> {
    match token {
        Token::Number { value, .. } => Ok(AstNode::Literal(crate::numeric::canonical_number(*value))),
        Token::Str { value, .. } => Ok(AstNode::Literal(serde_json::Value::String(value.clone()))),
        Token::Identifier { value, .. } => match value.as_str() {
            "true" => Ok(AstNode::Literal(serde_json::Value::Bool(true))),
            "false" => Ok(AstNode::Literal(serde_json::Value::Bool(false))),
            "null" | "undefined" => Ok(AstNode::Literal(serde_json::Value::Null)),
            other => Err(ParserError::new(format!("unexpected identifier '{other}'"))),
        },
        Token::Reference { raw, .. } => {
            let inner = reference_inner(raw);
            let segments = path::parse(&inner)
                .map_err(|e| ParserError::new(format!("invalid reference path: {}", e.message)))?;
            Ok(AstNode::Reference(segments))
        }
        Token::ObjectLiteral { tokens, .. } => build_object(tokens),
        Token::ArrayLiteral { tokens, .. } => build_array(tokens),
        Token::TemplateLiteral { tokens, .. } => build_template(tokens),
        other => Err(ParserError::new(format!(
            "token '{}' cannot start an expression",
            other.raw()
        ))),
    }
}

fn reference_inner(raw: &str) -> String {
    raw.strip_prefix("${")
        .and_then(|s| s.strip_suffix('}'))
        .unwrap_or(raw)
        .to_string()
}

/// Split `tokens` on top-level commas, tracking only `(`/`)` depth —
/// every other bracketed construct is already a single nested token by
/// the time the tokenizer hands it to the parser.
fn split_top_level_commas(tokens: &[Token]) -> Vec<&[Token]> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, tok) in tokens.iter().enumerate() {
        match tok {
            Token::Punctuation { value, .. } if value == "(" => depth += 1,
            Token::Punctuation { value, .. } if value == ")" => depth -= 1,
            Token::Punctuation { value, .. } if value == "," && depth == 0 => {
                parts.push(&tokens[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&tokens[start..]);
    parts
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect()
}

fn is_spread_prefix(tokens: &[Token]) -> bool {
    matches!(tokens.first(), Some(t) if t.is_operator("..."))
}

fn build_object(tokens: &[Token]) -> Result<AstNode, ParserError> {
    let mut entries = Vec::new();
    for entry_tokens in split_top_level_commas(tokens) {
        if is_spread_prefix(entry_tokens) {
            let value = parse(&entry_tokens[1..])?;
            reject_spread_of_literal(&value)?;
            entries.push(ObjectEntry {
                key: AstNode::Literal(serde_json::Value::Null),
                value,
                spread: true,
            });
            continue;
        }
        let colon_at = entry_tokens
            .iter()
            .position(|t| matches!(t, Token::Punctuation { value, .. } if value == ":"))
            .ok_or_else(|| ParserError::new("object entry is missing ':'"))?;
        let key_tokens = &entry_tokens[..colon_at];
        let value_tokens = &entry_tokens[colon_at + 1..];
        let key = match key_tokens {
            [Token::Identifier { value, .. }] => AstNode::Literal(serde_json::Value::String(value.clone())),
            [Token::Str { value, .. }] => AstNode::Literal(serde_json::Value::String(value.clone())),
            [Token::Reference { .. }] => build_primary(&key_tokens[0])?,
            _ => return Err(ParserError::new("invalid object key")),
        };
        let value = parse(value_tokens)?;
        entries.push(ObjectEntry {
            key,
            value,
            spread: false,
        });
    }
    Ok(AstNode::Object(entries))
}

fn build_array(tokens: &[Token]) -> Result<AstNode, ParserError> {
    let mut entries = Vec::new();
    for element_tokens in split_top_level_commas(tokens) {
        if is_spread_prefix(element_tokens) {
            let value = parse(&element_tokens[1..])?;
            reject_spread_of_literal(&value)?;
            entries.push(ArrayEntry {
                value,
                spread: true,
            });
        } else {
            entries.push(ArrayEntry {
                value: parse(element_tokens)?,
                spread: false,
            });
        }
    }
    Ok(AstNode::Array(entries))
}

fn build_template(tokens: &[Token]) -> Result<AstNode, ParserError> {
    let mut parts = Vec::new();
    for tok in tokens {
        match tok {
            Token::Str { value, .. } => {
                parts.push(AstNode::Literal(serde_json::Value::String(value.clone())))
            }
            Token::Reference { raw, .. } => {
                let inner = reference_inner(raw);
                let segments = path::parse(&inner).map_err(|e| {
                    ParserError::new(format!("invalid reference path: {}", e.message))
                })?;
                parts.push(AstNode::Reference(segments));
            }
            other => {
                return Err(ParserError::new(format!(
                    "unexpected token '{}' inside template literal",
                    other.raw()
                )))
            }
        }
    }
    Ok(AstNode::Template(parts))
}

/// Spec §4.2: spreading a literal number/string/bool/null/undefined is
/// a parse-time error; anything else (reference, operation, nested
/// object/array, parenthesised expression) is deferred to evaluation.
fn reject_spread_of_literal(value: &AstNode) -> Result<(), ParserError> {
    if matches!(value, AstNode::Literal(_)) {
        return Err(ParserError::new(
            "spreading a literal value is not allowed",
        ));
    }
    Ok(())
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
