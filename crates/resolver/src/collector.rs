// SPDX-License-Identifier: MIT

//! Reference Collector (spec §4.5): a pure static scan for dependency
//! analysis. Never evaluates; only tokenizes and walks the token tree.

use std::collections::HashSet;
use wf_core::Token;
use wf_expr::tokenize;

/// Identifiers that root a reference in something other than another
/// step's result, so they never become a dependency edge.
pub const RESERVED_ROOTS: &[&str] = &["context", "metadata", "item", "acc", "a", "b"];

/// Returns the set of external step names referenced by `expression`,
/// ignoring `locals` (declared loop variables in scope at this point).
pub fn collect_step_references(expression: &str, locals: &HashSet<String>) -> HashSet<String> {
    let mut out = HashSet::new();
    if let Ok(tokens) = tokenize(expression) {
        walk(&tokens, locals, &mut out);
    }
    out
}

fn walk(tokens: &[Token], locals: &HashSet<String>, out: &mut HashSet<String>) {
    for token in tokens {
        match token {
            Token::Reference { tokens: inner, .. } => {
                if let Some(Token::Identifier { value: root, .. }) = inner.first() {
                    if !RESERVED_ROOTS.contains(&root.as_str()) && !locals.contains(root) {
                        out.insert(root.clone());
                    }
                }
                walk(inner, locals, out);
            }
            Token::ObjectLiteral { tokens: inner, .. }
            | Token::ArrayLiteral { tokens: inner, .. }
            | Token::TemplateLiteral { tokens: inner, .. } => walk(inner, locals, out),
            _ => {}
        }
    }
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
