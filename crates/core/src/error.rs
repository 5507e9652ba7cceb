// SPDX-License-Identifier: MIT

//! Error taxonomy (spec §7).
//!
//! Every public error carries a `code` and an optional `details` map, the
//! way `oj_engine::error::RuntimeError` wraps its causes with `thiserror`
//! and `#[from]`. Codes are plain strings rather than a closed enum:
//! the retry engine classifies failures by duck-typed `code` equality
//! (spec §4.8), including codes produced by the injected RPC handler
//! that this crate has never heard of.

use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

/// Well-known error codes emitted by the engine itself. RPC handlers may
/// produce any other string; the retry engine does not special-case these.
pub mod codes {
    pub const VALIDATION: &str = "VALIDATION_ERROR";
    pub const UNKNOWN_DEPENDENCY: &str = "UNKNOWN_DEPENDENCY";
    pub const CYCLE: &str = "DEPENDENCY_CYCLE";
    pub const TOKENIZER: &str = "TOKENIZER_ERROR";
    pub const PATH_SYNTAX: &str = "PATH_SYNTAX_ERROR";
    pub const PROPERTY_ACCESS: &str = "PROPERTY_ACCESS_ERROR";
    pub const UNKNOWN_REFERENCE: &str = "UNKNOWN_REFERENCE";
    pub const EXPRESSION: &str = "EXPRESSION_ERROR";
    pub const REQUEST: &str = "REQUEST_ERROR";
    pub const TRANSFORM: &str = "TRANSFORM_ERROR";
    pub const CONDITION: &str = "CONDITION_ERROR";
    pub const LOOP: &str = "LOOP_ERROR";
    pub const TIMEOUT: &str = "TIMEOUT_ERROR";
    pub const MAX_RETRIES_EXCEEDED: &str = "MAX_RETRIES_EXCEEDED";
    pub const ABORTED: &str = "ABORTED";
}

/// A duck-typed error code. Compared by value, not by origin, so a
/// retry policy's `retryableErrors` list matches engine errors and
/// RPC-handler errors identically (spec §4.8 open question).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub String);

impl ErrorCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ErrorCode {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Position within a source string, used by syntax errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position(pub usize);

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flow or timeout/policy structure is invalid.
#[derive(Debug, Error)]
#[error("validation error: {message}")]
pub struct ValidationError {
    pub message: String,
    pub details: Value,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            details: Value::Null,
        }
    }
}

/// Unknown reference or dependency cycle.
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("unknown dependency: step '{step}' references unknown step '{dependency}'")]
    UnknownDependency { step: String, dependency: String },

    #[error("cycle detected: {}", members.join(" → "))]
    Cycle { members: Vec<String> },
}

/// Tokenizer, parser, evaluator, or reference-resolution failure.
#[derive(Debug, Error)]
#[error("expression error in `{expression}`: {message}")]
pub struct ExpressionError {
    pub expression: String,
    pub message: String,
    pub code: ErrorCode,
}

impl ExpressionError {
    pub fn new(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
            code: ErrorCode::new(codes::EXPRESSION),
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = ErrorCode::new(code.into());
        self
    }
}

/// RPC dispatch failure or invalid request step.
#[derive(Debug, Error)]
#[error("request error: {message}")]
pub struct RequestError {
    pub message: String,
    pub code: ErrorCode,
    #[source]
    pub cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RequestError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: ErrorCode::new(codes::REQUEST),
            cause: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = ErrorCode::new(code.into());
        self
    }

    pub fn with_cause(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }
}

/// Kind-specific step failures (subtypes of `StepExecutionError`).
#[derive(Debug, Error)]
pub enum StepExecutionError {
    #[error("transform error: {0}")]
    Transform(String),
    #[error("condition error: {0}")]
    Condition(String),
    #[error("loop error: {0}")]
    Loop(String),
}

impl StepExecutionError {
    pub fn code(&self) -> ErrorCode {
        let code = match self {
            Self::Transform(_) => codes::TRANSFORM,
            Self::Condition(_) => codes::CONDITION,
            Self::Loop(_) => codes::LOOP,
        };
        ErrorCode::new(code)
    }
}

/// Deadline exceeded (flow/step/expression).
#[derive(Debug, Error)]
#[error("timed out after {timeout_ms}ms (ran for {execution_time_ms}ms)")]
pub struct TimeoutError {
    pub timeout_ms: u64,
    pub execution_time_ms: u64,
    pub step_name: Option<String>,
    pub expression: Option<String>,
}

/// Retry exhaustion or internal invariant breach.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("max retries exceeded: {cause}")]
    MaxRetriesExceeded {
        cause: Box<FlowError>,
        attempts: u32,
    },
    #[error("internal error: {0}")]
    Internal(String),
}

/// Top-level union of every error this engine can produce. Carried
/// through the flow executor's propagation path (spec §7) so a single
/// `Result<_, FlowError>` covers validation, dependency analysis,
/// expression evaluation, and step execution.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Dependency(#[from] DependencyError),
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Step(#[from] StepExecutionError),
    #[error(transparent)]
    Timeout(#[from] TimeoutError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
    /// Cancellation not attributable to a timeout (external signal or a
    /// `stop` step). Spec §5: "others as plain abort".
    #[error("aborted: {reason}")]
    Aborted { reason: String },
}

impl FlowError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::new(codes::VALIDATION),
            Self::Dependency(DependencyError::UnknownDependency { .. }) => {
                ErrorCode::new(codes::UNKNOWN_DEPENDENCY)
            }
            Self::Dependency(DependencyError::Cycle { .. }) => ErrorCode::new(codes::CYCLE),
            Self::Expression(e) => e.code.clone(),
            Self::Request(e) => e.code.clone(),
            Self::Step(e) => e.code(),
            Self::Timeout(_) => ErrorCode::new(codes::TIMEOUT),
            Self::Execution(ExecutionError::MaxRetriesExceeded { .. }) => {
                ErrorCode::new(codes::MAX_RETRIES_EXCEEDED)
            }
            Self::Execution(ExecutionError::Internal(_)) => ErrorCode::new("INTERNAL_ERROR"),
            Self::Aborted { .. } => ErrorCode::new(codes::ABORTED),
        }
    }

    /// Human-readable details map attached to the user-visible report
    /// (spec §7: step name / expression / kind / message, no host frames).
    pub fn details(&self) -> Value {
        match self {
            Self::Timeout(t) => json!({
                "timeout": t.timeout_ms,
                "executionTime": t.execution_time_ms,
                "stepName": t.step_name,
                "expression": t.expression,
            }),
            Self::Expression(e) => json!({ "expression": e.expression }),
            _ => Value::Null,
        }
    }
}
