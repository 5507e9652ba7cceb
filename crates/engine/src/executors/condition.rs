// SPDX-License-Identifier: MIT

//! Condition executor (spec §4.9).

use super::execute_step;
use crate::context::RunContext;
use crate::dispatch::RpcHandler;
use indexmap::IndexMap;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use wf_core::{
    ConditionStep, Event, EventBus, FlowError, StepExecutionError, StepKindName, StepResult,
};
use wf_expr::Deadline;

pub async fn execute(
    step: &ConditionStep,
    ctx: &mut RunContext,
    locals: &IndexMap<String, Value>,
    deadline: Deadline,
    rpc: &dyn RpcHandler,
    events: &EventBus,
    signal: CancellationToken,
) -> Result<StepResult, FlowError> {
    let condition = ctx.evaluate(&step.if_expr, locals, deadline)?;
    let Value::Bool(truth) = condition else {
        return Err(FlowError::Step(StepExecutionError::Condition(
            "Condition must evaluate to boolean".to_string(),
        )));
    };

    let (branch, result) = if truth {
        if let Some(else_step) = &step.else_step {
            events.publish(Event::StepSkip {
                step_name: else_step.name.clone(),
                reason: format!("condition '{}' was true", step.if_expr),
            });
        }
        let result = execute_step(&step.then, ctx, locals, deadline, rpc, events, signal).await?;
        ("then", result.result)
    } else {
        events.publish(Event::StepSkip {
            step_name: step.then.name.clone(),
            reason: format!("condition '{}' was false", step.if_expr),
        });
        if let Some(else_step) = &step.else_step {
            let result = execute_step(else_step, ctx, locals, deadline, rpc, events, signal).await?;
            ("else", result.result)
        } else {
            ("none", Value::Null)
        }
    };

    Ok(StepResult {
        result,
        kind: StepKindName::Condition,
        metadata: Some(json!({ "branch": branch })),
    })
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
