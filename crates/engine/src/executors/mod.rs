// SPDX-License-Identifier: MIT

//! Step executors (spec §4.9): one module per step kind, dispatched
//! through [`execute_step`].

pub mod condition;
pub mod loop_step;
pub mod request;
pub mod stop;
pub mod transform;

use crate::context::RunContext;
use crate::dispatch::RpcHandler;
use indexmap::IndexMap;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use tokio_util::sync::CancellationToken;
use wf_core::{EventBus, FlowError, StepDef, StepKind, StepResult};
use wf_expr::Deadline;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Dispatch one step to its kind-specific executor. Boxed because
/// `Condition` and `Loop` recurse into this same function for their
/// nested step bodies — a plain `async fn` cannot call itself.
pub fn execute_step<'a>(
    step: &'a StepDef,
    ctx: &'a mut RunContext,
    locals: &'a IndexMap<String, Value>,
    deadline: Deadline,
    rpc: &'a dyn RpcHandler,
    events: &'a EventBus,
    signal: CancellationToken,
) -> BoxFuture<'a, Result<StepResult, FlowError>> {
    Box::pin(async move {
        match &step.kind {
            StepKind::Request(r) => request::execute(r, ctx, locals, deadline, rpc, signal).await,
            StepKind::Transform(t) => transform::execute(t, ctx, locals, deadline),
            StepKind::Condition(c) => {
                condition::execute(c, ctx, locals, deadline, rpc, events, signal).await
            }
            StepKind::Loop(l) => {
                loop_step::execute(&step.name, l, ctx, locals, deadline, rpc, events, signal).await
            }
            StepKind::Stop(s) => stop::execute(s),
        }
    })
}
