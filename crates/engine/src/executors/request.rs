// SPDX-License-Identifier: MIT

//! Request executor (spec §4.9).

use crate::context::RunContext;
use crate::dispatch::RpcHandler;
use crate::interpolate::resolve_value;
use indexmap::IndexMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use wf_core::{FlowError, RequestError, RequestStep, StepKindName, StepResult};
use wf_expr::Deadline;

pub async fn execute(
    step: &RequestStep,
    ctx: &mut RunContext,
    locals: &IndexMap<String, Value>,
    deadline: Deadline,
    rpc: &dyn RpcHandler,
    signal: CancellationToken,
) -> Result<StepResult, FlowError> {
    if step.method.trim().is_empty() {
        return Err(RequestError::new("method must be a non-empty string").into());
    }
    if !matches!(step.params, Value::Object(_) | Value::Array(_)) {
        return Err(RequestError::new("params must be an object or array").into());
    }

    let resolved = resolve_value(&step.params, &mut |expr| ctx.evaluate(expr, locals, deadline))?;

    let result = rpc
        .dispatch(&step.method, resolved, signal)
        .await
        .map_err(FlowError::Request)?;

    Ok(StepResult {
        result,
        kind: StepKindName::Request,
        metadata: None,
    })
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
