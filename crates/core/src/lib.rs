// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! wf-core: shared data model and error taxonomy for the workflow engine.

pub mod ast;
pub mod document;
pub mod error;
pub mod event;
pub mod flow;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod token;

pub use ast::{ArrayEntry, AstNode, ObjectEntry};
pub use document::{parse_flow, DocumentError, DocumentFormat};
pub use error::{
    codes, DependencyError, ErrorCode, ExecutionError, ExpressionError, FlowError, Position,
    RequestError, StepExecutionError, TimeoutError, ValidationError,
};
pub use event::{Event, EventBus, FlowStatus};
pub use flow::{
    builtin_default_timeout_ms, Backoff, BackoffStrategy, ConditionStep, Flow, LoopStep,
    PolicySet, Policies, RequestStep, RetryPolicy, StepDef, StepKind, StepKindName, StepPolicies,
    StepResult, StopStep, TimeoutSetting, TimeoutTable, TransformOp, TransformOpKind,
    TransformStep,
};
pub use token::{format_path, PathSegment, PathSegmentKind, PathSegmentValue, Token};
