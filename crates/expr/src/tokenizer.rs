// SPDX-License-Identifier: MIT

//! Tokenizer for the expression mini-language (spec §4.2, §9).
//!
//! `${...}` references, string/template literals, number literals, and
//! object/array literal heuristics are scanned with brace/bracket
//! depth counters; the remainder falls back to a longest-match
//! operator/punctuation scan (spec §3 operator table).

use crate::error::TokenizerError;
use wf_core::Token;

const MULTI_CHAR_OPERATORS: &[&str] = &[
    "===", "!==", "==", "!=", ">=", "<=", "&&", "||", "??", "...",
];
const SINGLE_CHAR_OPERATORS: &[char] = &['+', '-', '*', '/', '%', '<', '>', '!', '.', '=', '&', '|'];
const FORBIDDEN_SEQUENCES: &[&str] = &["++", "--", "**", "<>", "<<", ">>", "$$", "@@"];

pub fn tokenize(input: &str) -> Result<Vec<Token>, TokenizerError> {
    let chars: Vec<char> = input.chars().collect();
    let mut i = 0;
    let mut tokens = Vec::new();

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c == '$' && chars.get(i + 1) == Some(&'{') {
            let (tok, next) = scan_reference(&chars, i)?;
            tokens.push(tok);
            i = next;
            continue;
        }

        if c == '"' || c == '\'' {
            let (tok, next) = scan_string(&chars, i, c)?;
            tokens.push(tok);
            i = next;
            continue;
        }

        if c == '`' {
            let (tok, next) = scan_template(&chars, i)?;
            tokens.push(tok);
            i = next;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(|d| d.is_ascii_digit()))
        {
            let (tok, next) = scan_number(&chars, i)?;
            tokens.push(tok);
            i = next;
            continue;
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            let (tok, next) = scan_identifier(&chars, i);
            tokens.push(tok);
            i = next;
            continue;
        }

        if c == '{' {
            let (tok, next) = scan_object_literal(&chars, i)?;
            tokens.push(tok);
            i = next;
            continue;
        }

        if c == '[' {
            let (tok, next) = scan_array_literal(&chars, i)?;
            tokens.push(tok);
            i = next;
            continue;
        }

        if c == '(' || c == ')' || c == ',' || c == '}' || c == ']' || c == '?' || c == ':' {
            tokens.push(Token::Punctuation {
                value: c.to_string(),
                raw: c.to_string(),
            });
            i += 1;
            continue;
        }

        if let Some((op, len)) = match_operator(&chars, i)? {
            tokens.push(Token::Operator {
                value: op.clone(),
                raw: op,
            });
            i += len;
            continue;
        }

        return Err(TokenizerError {
            message: format!("unexpected character '{c}'"),
            position: i,
        });
    }

    Ok(tokens)
}

fn match_operator(chars: &[char], start: usize) -> Result<Option<(String, usize)>, TokenizerError> {
    for op in MULTI_CHAR_OPERATORS {
        let len = op.chars().count();
        if start + len <= chars.len() {
            let slice: String = chars[start..start + len].iter().collect();
            if &slice == *op {
                return Ok(Some((slice, len)));
            }
        }
    }
    if start + 2 <= chars.len() {
        let pair: String = chars[start..start + 2].iter().collect();
        if FORBIDDEN_SEQUENCES.contains(&pair.as_str()) {
            return Err(TokenizerError {
                message: format!("forbidden operator sequence '{pair}'"),
                position: start,
            });
        }
    }
    let c = chars[start];
    if SINGLE_CHAR_OPERATORS.contains(&c) {
        return Ok(Some((c.to_string(), 1)));
    }
    Ok(None)
}

/// `${ ... }` — brace-counted so nested object literals inside a
/// reference (`${a[${b}]}`) are scanned correctly.
fn scan_reference(chars: &[char], start: usize) -> Result<(Token, usize), TokenizerError> {
    let mut depth = 1usize;
    let mut i = start + 2;
    let inner_start = i;
    while i < chars.len() {
        match chars[i] {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            '"' | '\'' => {
                let (_, next) = scan_string(chars, i, chars[i])?;
                i = next;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    if depth != 0 {
        return Err(TokenizerError {
            message: "unterminated reference, expected '}'".into(),
            position: start,
        });
    }
    let inner: String = chars[inner_start..i].iter().collect();
    let end = i + 1;
    let raw: String = chars[start..end].iter().collect();
    let inner_tokens = tokenize(&inner)?;
    Ok((
        Token::Reference {
            tokens: inner_tokens,
            raw,
        },
        end,
    ))
}

fn scan_string(chars: &[char], start: usize, quote: char) -> Result<(Token, usize), TokenizerError> {
    let mut i = start + 1;
    let mut value = String::new();
    while i < chars.len() {
        let c = chars[i];
        if c == '\\' && i + 1 < chars.len() {
            value.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if c == quote {
            let end = i + 1;
            let raw: String = chars[start..end].iter().collect();
            return Ok((Token::Str { value, raw }, end));
        }
        value.push(c);
        i += 1;
    }
    Err(TokenizerError {
        message: "unterminated string literal".into(),
        position: start,
    })
}

/// Backtick template literal: text interleaved with `${...}` reference
/// tokens, scanned as a flat token list (spec §4.2).
fn scan_template(chars: &[char], start: usize) -> Result<(Token, usize), TokenizerError> {
    let mut i = start + 1;
    let mut parts = Vec::new();
    let mut literal = String::new();
    loop {
        if i >= chars.len() {
            return Err(TokenizerError {
                message: "unterminated template literal".into(),
                position: start,
            });
        }
        let c = chars[i];
        if c == '`' {
            i += 1;
            break;
        }
        if c == '\\' && i + 1 < chars.len() {
            literal.push(chars[i + 1]);
            i += 2;
            continue;
        }
        if c == '$' && chars.get(i + 1) == Some(&'{') {
            if !literal.is_empty() {
                parts.push(Token::Str {
                    value: std::mem::take(&mut literal),
                    raw: String::new(),
                });
            }
            let (tok, next) = scan_reference(chars, i)?;
            parts.push(tok);
            i = next;
            continue;
        }
        literal.push(c);
        i += 1;
    }
    if !literal.is_empty() {
        parts.push(Token::Str {
            value: literal,
            raw: String::new(),
        });
    }
    let raw: String = chars[start..i].iter().collect();
    Ok((
        Token::TemplateLiteral {
            tokens: parts,
            raw,
        },
        i,
    ))
}

fn scan_number(chars: &[char], start: usize) -> Result<(Token, usize), TokenizerError> {
    let mut i = start;
    let mut seen_dot = false;
    while i < chars.len() {
        let c = chars[i];
        if c.is_ascii_digit() {
            i += 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
            i += 1;
        } else {
            break;
        }
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    let raw: String = chars[start..i].iter().collect();
    let value: f64 = raw.parse().map_err(|_| TokenizerError {
        message: format!("invalid number literal '{raw}'"),
        position: start,
    })?;
    Ok((Token::Number { value, raw }, i))
}

fn scan_identifier(chars: &[char], start: usize) -> (Token, usize) {
    let mut i = start + 1;
    while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '$') {
        i += 1;
    }
    let raw: String = chars[start..i].iter().collect();
    (
        Token::Identifier {
            value: raw.clone(),
            raw,
        },
        i,
    )
}

/// `{...}` is an object literal when, scanning at depth 1, we see a
/// top-level `:` (key/value), a `...` spread, or nothing but
/// whitespace before the closing brace (empty object). Otherwise it is
/// treated as a lone punctuation brace, left for the caller/parser
/// (spec §9 standardizes this heuristic).
fn scan_object_literal(chars: &[char], start: usize) -> Result<(Token, usize), TokenizerError> {
    let (end, looks_like_object) = scan_braced(chars, start)?;
    if !looks_like_object {
        return Ok((
            Token::Punctuation {
                value: "{".into(),
                raw: "{".into(),
            },
            start + 1,
        ));
    }
    let inner: String = chars[start + 1..end - 1].iter().collect();
    let inner_tokens = tokenize(&inner)?;
    let raw: String = chars[start..end].iter().collect();
    Ok((
        Token::ObjectLiteral {
            tokens: inner_tokens,
            raw,
        },
        end,
    ))
}

fn scan_braced(chars: &[char], start: usize) -> Result<(usize, bool), TokenizerError> {
    let mut depth = 1usize;
    let mut i = start + 1;
    let mut saw_colon_at_depth_1 = false;
    let mut saw_spread_at_depth_1 = false;
    let mut only_whitespace = true;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '{' => {
                depth += 1;
                only_whitespace = false;
            }
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((
                        i + 1,
                        saw_colon_at_depth_1 || saw_spread_at_depth_1 || only_whitespace,
                    ));
                }
            }
            '"' | '\'' => {
                let (_, next) = scan_string(chars, i, c)?;
                i = next;
                only_whitespace = false;
                continue;
            }
            ':' if depth == 1 => {
                saw_colon_at_depth_1 = true;
                only_whitespace = false;
            }
            '.' if depth == 1 && chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') => {
                saw_spread_at_depth_1 = true;
                only_whitespace = false;
            }
            c if !c.is_whitespace() => only_whitespace = false,
            _ => {}
        }
        i += 1;
    }
    Err(TokenizerError {
        message: "unterminated '{'".into(),
        position: start,
    })
}

fn scan_array_literal(chars: &[char], start: usize) -> Result<(Token, usize), TokenizerError> {
    let mut depth = 1usize;
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            '"' | '\'' => {
                let (_, next) = scan_string(chars, i, chars[i])?;
                i = next;
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    if depth != 0 {
        return Err(TokenizerError {
            message: "unterminated '['".into(),
            position: start,
        });
    }
    let end = i + 1;
    let inner: String = chars[start + 1..i].iter().collect();
    let inner_tokens = tokenize(&inner)?;
    let raw: String = chars[start..end].iter().collect();
    Ok((
        Token::ArrayLiteral {
            tokens: inner_tokens,
            raw,
        },
        end,
    ))
}

#[cfg(test)]
#[path = "tokenizer_tests.rs"]
mod tests;
