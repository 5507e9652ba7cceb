// SPDX-License-Identifier: MIT

//! Flow Executor (spec §4.10): validates the flow, asks the
//! Dependency Resolver for an ordered plan, then dispatches each step
//! in order, wrapping every attempt in the Retry Engine and a timeout
//! race, emitting lifecycle events throughout.

use crate::context::{no_locals, RunContext};
use crate::control::FlowControl;
use crate::dispatch::RpcHandler;
use crate::executors::execute_step;
use crate::logging::StepLogger;
use crate::retry::with_retry;
use indexmap::IndexMap;
use serde_json::json;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use wf_core::{
    Event, EventBus, Flow, FlowError, FlowStatus, StepDef, StepKindName, TimeoutError,
    ValidationError,
};
use wf_expr::Deadline;

pub struct FlowExecutor<'a> {
    flow: &'a Flow,
    rpc: &'a dyn RpcHandler,
    events: EventBus,
    control: FlowControl,
}

impl<'a> FlowExecutor<'a> {
    pub fn new(flow: &'a Flow, rpc: &'a dyn RpcHandler, events: EventBus) -> Self {
        Self {
            flow,
            rpc,
            events,
            control: FlowControl::new(),
        }
    }

    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    /// Suspends step dispatch until [`Self::resume`] or [`Self::abort`]
    /// (spec §4.10, §5 "pause gate").
    pub fn pause(&self) {
        self.control.pause();
    }

    pub fn resume(&self) {
        self.control.resume();
    }

    /// Tags the composed cancellation signal as an external abort,
    /// distinct from a timeout cancellation (spec §5).
    pub fn abort(&self, reason: impl Into<String>) {
        self.control.abort(reason);
    }

    /// `execute({signal?}) -> void` (spec §4.10). Each call starts from
    /// empty step results; nothing is cached across invocations.
    pub async fn execute(&self, caller_signal: Option<CancellationToken>) -> Result<(), FlowError> {
        let control = &self.control;
        let start = Instant::now();
        self.events.publish(Event::FlowStart {
            name: self.flow.name.clone(),
            timestamp_ms: now_ms(),
        });

        if let Err(e) = self.validate_step_names() {
            self.events.publish(Event::FlowError {
                error: e.to_string(),
            });
            self.events.publish(Event::FlowComplete {
                status: FlowStatus::Error,
                duration_ms: elapsed_ms(start),
            });
            return Err(e.into());
        }

        let order = match wf_resolver::plan(&self.flow.steps) {
            Ok(order) => order,
            Err(e) => {
                let err = FlowError::from(e);
                self.events.publish(Event::FlowError {
                    error: err.to_string(),
                });
                self.events.publish(Event::FlowComplete {
                    status: FlowStatus::Error,
                    duration_ms: elapsed_ms(start),
                });
                return Err(err);
            }
        };
        self.events.publish(Event::DependencyResolved {
            order: order.clone(),
        });

        let global_timeout_ms = match wf_resolver::resolve_step_timeout(
            StepKindName::Global,
            None,
            None,
            self.flow.policies.as_ref(),
            self.flow.timeouts.as_ref(),
        ) {
            Ok(ms) => ms,
            Err(e) => return Err(self.fail_validation(e, start)),
        };

        let steps_by_name: HashMap<&str, &StepDef> = self
            .flow
            .steps
            .iter()
            .map(|s| (s.name.as_str(), s))
            .collect();

        let mut run_ctx = RunContext::new(self.flow.context.clone(), run_metadata(&self.flow.name));

        let outcome = tokio::select! {
            biased;
            _ = wait_for_signal(caller_signal.as_ref()) => {
                control.abort("caller signal");
                Err(FlowError::Aborted { reason: control.abort_reason() })
            }
            _ = tokio::time::sleep(Duration::from_millis(global_timeout_ms)) => {
                control.cancel.cancel();
                Err(FlowError::Timeout(TimeoutError {
                    timeout_ms: global_timeout_ms,
                    execution_time_ms: elapsed_ms(start),
                    step_name: None,
                    expression: None,
                }))
            }
            result = self.run_plan(&order, &steps_by_name, &mut run_ctx, control) => result,
        };

        match &outcome {
            Ok(()) => {
                self.events.publish(Event::FlowComplete {
                    status: FlowStatus::Complete,
                    duration_ms: elapsed_ms(start),
                });
            }
            Err(FlowError::Aborted { reason }) => {
                self.events.publish(Event::FlowAborted {
                    reason: reason.clone(),
                });
                self.events.publish(Event::FlowComplete {
                    status: FlowStatus::Aborted,
                    duration_ms: elapsed_ms(start),
                });
            }
            Err(e) => {
                self.events.publish(Event::FlowError {
                    error: e.to_string(),
                });
                self.events.publish(Event::FlowComplete {
                    status: FlowStatus::Error,
                    duration_ms: elapsed_ms(start),
                });
            }
        }

        outcome
    }

    async fn run_plan(
        &self,
        order: &[String],
        steps_by_name: &HashMap<&str, &StepDef>,
        run_ctx: &mut RunContext,
        control: &FlowControl,
    ) -> Result<(), FlowError> {
        for step_name in order {
            control.wait_if_paused().await;
            if control.cancel.is_cancelled() {
                return Err(FlowError::Aborted {
                    reason: control.abort_reason(),
                });
            }

            let step = steps_by_name
                .get(step_name.as_str())
                .copied()
                .expect("plan only names steps that exist in the flow");

            self.events.publish(Event::StepStart {
                step_name: step.name.clone(),
                kind: step.kind.name().as_str().to_string(),
            });
            let logger = StepLogger::for_step(&step.name, step.kind.name().as_str());
            logger.log_start();
            let step_started = Instant::now();

            let step_timeout_ms = self.resolve_step_timeout(step)?;
            let retry_policy = self.retry_policy_for(step);
            let locals: IndexMap<String, serde_json::Value> = no_locals();

            let attempt_signal = control.cancel.clone();
            let result = with_retry(retry_policy, |_n| {
                let deadline = Deadline::starting_now(step_timeout_ms);
                let signal = attempt_signal.clone();
                let ctx: &mut RunContext = &mut *run_ctx;
                async move {
                    let fut = execute_step(step, ctx, &locals, deadline, self.rpc, &self.events, signal);
                    match tokio::time::timeout(Duration::from_millis(step_timeout_ms), fut).await {
                        Ok(result) => result,
                        Err(_) => Err(FlowError::Timeout(TimeoutError {
                            timeout_ms: step_timeout_ms,
                            execution_time_ms: step_timeout_ms,
                            step_name: Some(step.name.clone()),
                            expression: None,
                        })),
                    }
                }
            })
            .await;
            logger.log_outcome(step_started, &result);

            match result {
                Ok(step_result) => {
                    if control.cancel.is_cancelled() {
                        self.events.publish(Event::StepAborted {
                            step_name: step.name.clone(),
                            reason: control.abort_reason(),
                        });
                        return Err(FlowError::Aborted {
                            reason: control.abort_reason(),
                        });
                    }

                    self.events.publish(Event::StepComplete {
                        step_name: step.name.clone(),
                        result: step_result.result.clone(),
                    });

                    let is_stop_end = matches!(&step.kind, wf_core::StepKind::Stop(s) if s.end_workflow);
                    run_ctx.record_step(&step.name, step_result);
                    if is_stop_end {
                        break;
                    }
                }
                Err(e) => {
                    self.events.publish(Event::StepError {
                        step_name: step.name.clone(),
                        error: e.to_string(),
                    });
                    if !self.continue_on_failure(step) {
                        return Err(e);
                    }
                }
            }
        }
        Ok(())
    }

    fn validate_step_names(&self) -> Result<(), ValidationError> {
        let mut seen = std::collections::HashSet::new();
        for step in &self.flow.steps {
            if !seen.insert(step.name.as_str()) {
                return Err(ValidationError::new(format!(
                    "duplicate step name: '{}'",
                    step.name
                )));
            }
        }
        Ok(())
    }

    fn resolve_step_timeout(&self, step: &StepDef) -> Result<u64, FlowError> {
        let step_policy_timeout = step
            .policies
            .as_ref()
            .and_then(|p| p.timeout)
            .map(|t| t.timeout);
        wf_resolver::resolve_step_timeout(
            step.kind.name(),
            step.timeout,
            step_policy_timeout,
            self.flow.policies.as_ref(),
            self.flow.timeouts.as_ref(),
        )
        .map_err(FlowError::from)
    }

    fn retry_policy_for<'s>(&'s self, step: &'s StepDef) -> Option<&'s wf_core::RetryPolicy> {
        step.policies
            .as_ref()
            .and_then(|p| p.retry.as_ref())
            .or_else(|| {
                self.flow
                    .policies
                    .as_ref()
                    .and_then(|p| p.global.as_ref())
                    .and_then(|g| g.retry.as_ref())
            })
    }

    fn continue_on_failure(&self, step: &StepDef) -> bool {
        step.policies
            .as_ref()
            .and_then(|p| p.continue_on_failure)
            .or_else(|| {
                self.flow
                    .policies
                    .as_ref()
                    .and_then(|p| p.global.as_ref())
                    .and_then(|g| g.continue_on_failure)
            })
            .unwrap_or(false)
    }

    fn fail_validation(&self, e: ValidationError, start: Instant) -> FlowError {
        let err = FlowError::from(e);
        self.events.publish(Event::FlowError {
            error: err.to_string(),
        });
        self.events.publish(Event::FlowComplete {
            status: FlowStatus::Error,
            duration_ms: elapsed_ms(start),
        });
        err
    }
}

async fn wait_for_signal(signal: Option<&CancellationToken>) {
    match signal {
        Some(token) => token.cancelled().await,
        None => std::future::pending::<()>().await,
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

fn run_metadata(flow_name: &str) -> serde_json::Value {
    json!({
        "flowName": flow_name,
        "runId": uuid::Uuid::new_v4().to_string(),
        "startedAtMs": now_ms(),
    })
}

#[cfg(test)]
#[path = "flow_executor_tests.rs"]
mod tests;
