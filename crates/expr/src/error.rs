// SPDX-License-Identifier: MIT

//! Error types local to tokenizing, path parsing, and evaluation. These
//! wrap into `wf_core::ExpressionError` at the evaluator boundary
//! (spec §4.3: "wrap in ExpressionError preserving the inner message").

use thiserror::Error;
use wf_core::{codes, ExpressionError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("tokenizer error at {position}: {message}")]
pub struct TokenizerError {
    pub message: String,
    pub position: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("path syntax error at {position}: {message}")]
pub struct PathSyntaxError {
    pub message: String,
    pub position: usize,
}

impl PathSyntaxError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("property access error: {message}")]
pub struct PropertyAccessError {
    pub message: String,
}

impl PropertyAccessError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown reference: {name}")]
pub struct UnknownReferenceError {
    pub name: String,
}

/// Shunting-yard / AST-folding failure (spec §4.3: unexpected reference,
/// unbalanced parens, malformed spread, dangling operator).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("parse error: {message}")]
pub struct ParserError {
    pub message: String,
}

impl ParserError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<ParserError> for ExpressionError {
    fn from(e: ParserError) -> Self {
        ExpressionError::new(String::new(), e.message).with_code(codes::EXPRESSION)
    }
}

/// Any failure from resolving a path against a value.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error(transparent)]
    Syntax(#[from] PathSyntaxError),
    #[error(transparent)]
    Property(#[from] PropertyAccessError),
    #[error(transparent)]
    UnknownReference(#[from] UnknownReferenceError),
    /// An `expression`-typed segment re-entered the evaluator and that
    /// nested evaluation failed; `code` preserves the original
    /// `FlowError`'s error code for duck-typed retry classification.
    #[error("{message}")]
    Nested { code: String, message: String },
}

impl PathError {
    pub fn nested(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Nested {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// Wrap any subsystem error into the crate-wide `ExpressionError`,
/// attaching the offending expression text and the original message
/// (spec §4.3).
pub fn wrap_expression_error(expression: &str, message: impl Into<String>) -> ExpressionError {
    ExpressionError::new(expression, message)
}

impl From<TokenizerError> for ExpressionError {
    fn from(e: TokenizerError) -> Self {
        ExpressionError::new(String::new(), e.message).with_code(codes::TOKENIZER)
    }
}

impl From<PathSyntaxError> for ExpressionError {
    fn from(e: PathSyntaxError) -> Self {
        ExpressionError::new(String::new(), e.message).with_code(codes::PATH_SYNTAX)
    }
}

impl From<PathError> for ExpressionError {
    fn from(e: PathError) -> Self {
        let code = match &e {
            PathError::Syntax(_) => codes::PATH_SYNTAX.to_string(),
            PathError::Property(_) => codes::PROPERTY_ACCESS.to_string(),
            PathError::UnknownReference(_) => codes::UNKNOWN_REFERENCE.to_string(),
            PathError::Nested { code, .. } => code.clone(),
        };
        ExpressionError::new(String::new(), e.to_string()).with_code(code)
    }
}
