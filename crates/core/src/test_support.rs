// SPDX-License-Identifier: MIT

//! Shared test builders for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::flow::{
    ConditionStep, Flow, LoopStep, RequestStep, StepDef, StepKind, StopStep, TransformOp,
    TransformOpKind, TransformStep,
};
use serde_json::Value;
use std::collections::HashMap;

pub fn flow(name: &str, steps: Vec<StepDef>) -> Flow {
    Flow {
        name: name.to_string(),
        description: None,
        context: HashMap::new(),
        steps,
        timeouts: None,
        policies: None,
    }
}

pub fn request_step(name: &str, method: &str, params: Value) -> StepDef {
    StepDef {
        name: name.to_string(),
        description: None,
        timeout: None,
        policies: None,
        kind: StepKind::Request(RequestStep {
            method: method.to_string(),
            params,
        }),
    }
}

pub fn transform_step(name: &str, input: Option<&str>, operations: Vec<TransformOp>) -> StepDef {
    StepDef {
        name: name.to_string(),
        description: None,
        timeout: None,
        policies: None,
        kind: StepKind::Transform(TransformStep {
            input: input.map(str::to_string),
            operations,
        }),
    }
}

pub fn map_op(using: &str) -> TransformOp {
    TransformOp {
        kind: TransformOpKind::Map,
        using: using.to_string(),
        as_name: None,
        initial: None,
    }
}

pub fn condition_step(name: &str, if_expr: &str, then: StepDef, else_step: Option<StepDef>) -> StepDef {
    StepDef {
        name: name.to_string(),
        description: None,
        timeout: None,
        policies: None,
        kind: StepKind::Condition(ConditionStep {
            if_expr: if_expr.to_string(),
            then: Box::new(then),
            else_step: else_step.map(Box::new),
        }),
    }
}

pub fn loop_step(name: &str, over: &str, as_name: &str, body: StepDef) -> StepDef {
    StepDef {
        name: name.to_string(),
        description: None,
        timeout: None,
        policies: None,
        kind: StepKind::Loop(LoopStep {
            over: over.to_string(),
            as_name: as_name.to_string(),
            condition: None,
            max_iterations: None,
            step: Some(Box::new(body)),
            steps: None,
        }),
    }
}

pub fn stop_step(name: &str, end_workflow: bool) -> StepDef {
    StepDef {
        name: name.to_string(),
        description: None,
        timeout: None,
        policies: None,
        kind: StepKind::Stop(StopStep { end_workflow }),
    }
}
