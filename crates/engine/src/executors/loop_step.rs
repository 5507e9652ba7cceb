// SPDX-License-Identifier: MIT

//! Loop executor (spec §4.9).

use super::execute_step;
use crate::context::RunContext;
use crate::dispatch::RpcHandler;
use indexmap::IndexMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use wf_core::{Event, EventBus, FlowError, LoopStep, StepExecutionError, StepKindName, StepResult};
use wf_expr::Deadline;

pub async fn execute(
    step_name: &str,
    step: &LoopStep,
    ctx: &mut RunContext,
    locals: &IndexMap<String, Value>,
    deadline: Deadline,
    rpc: &dyn RpcHandler,
    events: &EventBus,
    signal: CancellationToken,
) -> Result<StepResult, FlowError> {
    let over = ctx.evaluate(&step.over, locals, deadline)?;
    let Value::Array(items) = over else {
        return Err(loop_err("Expected array for loop iteration"));
    };
    if step.step.is_none() == step.steps.is_none() {
        return Err(loop_err("Loop must have either step or steps defined"));
    }

    let total = items.len() as u64;
    let cap = step.max_iterations.unwrap_or(u64::MAX);
    let mut results = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        if index as u64 >= cap {
            break;
        }

        let mut scope = locals.clone();
        scope.insert(step.as_name.clone(), item);

        if let Some(condition) = &step.condition {
            let keep = ctx.evaluate(condition, &scope, deadline)?;
            let Value::Bool(keep) = keep else {
                return Err(loop_err("Loop condition must evaluate to boolean"));
            };
            if !keep {
                events.publish(Event::StepSkip {
                    step_name: step_name.to_string(),
                    reason: format!("loop condition false at iteration {}", index + 1),
                });
                continue;
            }
        }

        let body_result = if let Some(body) = &step.step {
            execute_step(body, ctx, &scope, deadline, rpc, events, signal.clone())
                .await?
                .result
        } else {
            let bodies = step.steps.as_ref().expect("exactly one of step/steps is set");
            let mut last = Value::Null;
            for body in bodies {
                let result =
                    execute_step(body, ctx, &scope, deadline, rpc, events, signal.clone()).await?;
                ctx.record_step(&body.name, result.clone());
                last = result.result;
            }
            last
        };
        results.push(body_result);

        let iteration = index as u64 + 1;
        let percent = if total == 0 {
            100
        } else {
            ((iteration * 100) / total).min(100) as u8
        };
        events.publish(Event::StepProgress {
            step_name: step_name.to_string(),
            iteration,
            total,
            percent,
        });
    }

    Ok(StepResult {
        result: Value::Array(results),
        kind: StepKindName::Loop,
        metadata: None,
    })
}

fn loop_err(message: impl Into<String>) -> FlowError {
    FlowError::Step(StepExecutionError::Loop(message.into()))
}

#[cfg(test)]
#[path = "loop_step_tests.rs"]
mod tests;
