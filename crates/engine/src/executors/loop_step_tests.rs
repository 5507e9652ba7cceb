use super::*;
use crate::context::no_locals;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use wf_core::{EventBus, StepDef, StepKind, StopStep};
use wf_expr::Deadline;

struct NeverRpc;

#[async_trait]
impl RpcHandler for NeverRpc {
    async fn dispatch(
        &self,
        _method: &str,
        _params: Value,
        _signal: CancellationToken,
    ) -> Result<Value, wf_core::RequestError> {
        panic!("request executor should not be reached in these tests")
    }
}

fn stop_step(name: &str) -> StepDef {
    StepDef {
        name: name.to_string(),
        description: None,
        timeout: None,
        policies: None,
        kind: StepKind::Stop(StopStep { end_workflow: false }),
    }
}

#[tokio::test]
async fn iterates_array_and_collects_body_results() {
    let step = LoopStep {
        over: "${context.items}".to_string(),
        as_name: "item".to_string(),
        condition: None,
        max_iterations: None,
        step: Some(Box::new(StepDef {
            name: "echo".to_string(),
            description: None,
            timeout: None,
            policies: None,
            kind: StepKind::Transform(wf_core::TransformStep {
                input: Some("[${item}]".to_string()),
                operations: vec![wf_core::TransformOp {
                    kind: wf_core::TransformOpKind::Map,
                    using: "${item} * 10".to_string(),
                    as_name: None,
                    initial: None,
                }],
            }),
        })),
        steps: None,
    };
    let mut ctx = RunContext::new(
        HashMap::from([("items".to_string(), json!([1, 2, 3]))]),
        json!({}),
    );
    let events = EventBus::default();
    let result = execute(
        "loop_step",
        &step,
        &mut ctx,
        &no_locals(),
        Deadline::starting_now(5_000),
        &NeverRpc,
        &events,
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(result.result, json!([[10], [20], [30]]));
}

#[tokio::test]
async fn max_iterations_caps_the_loop() {
    let step = LoopStep {
        over: "${context.items}".to_string(),
        as_name: "item".to_string(),
        condition: None,
        max_iterations: Some(2),
        step: Some(Box::new(stop_step("body"))),
        steps: None,
    };
    let mut ctx = RunContext::new(
        HashMap::from([("items".to_string(), json!([1, 2, 3, 4]))]),
        json!({}),
    );
    let events = EventBus::default();
    let result = execute(
        "loop_step",
        &step,
        &mut ctx,
        &no_locals(),
        Deadline::starting_now(5_000),
        &NeverRpc,
        &events,
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(result.result.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn condition_skips_non_matching_elements() {
    let step = LoopStep {
        over: "${context.items}".to_string(),
        as_name: "item".to_string(),
        condition: Some("${item} >= 2".to_string()),
        max_iterations: None,
        step: Some(Box::new(stop_step("body"))),
        steps: None,
    };
    let mut ctx = RunContext::new(
        HashMap::from([("items".to_string(), json!([1, 2, 3]))]),
        json!({}),
    );
    let events = EventBus::default();
    let result = execute(
        "loop_step",
        &step,
        &mut ctx,
        &no_locals(),
        Deadline::starting_now(5_000),
        &NeverRpc,
        &events,
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(result.result.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn non_array_over_is_an_error() {
    let step = LoopStep {
        over: "${context.items}".to_string(),
        as_name: "item".to_string(),
        condition: None,
        max_iterations: None,
        step: Some(Box::new(stop_step("body"))),
        steps: None,
    };
    let mut ctx = RunContext::new(
        HashMap::from([("items".to_string(), json!(42))]),
        json!({}),
    );
    let events = EventBus::default();
    let err = execute(
        "loop_step",
        &step,
        &mut ctx,
        &no_locals(),
        Deadline::starting_now(5_000),
        &NeverRpc,
        &events,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FlowError::Step(StepExecutionError::Loop(_))));
}

#[tokio::test]
async fn missing_both_step_and_steps_is_an_error() {
    let step = LoopStep {
        over: "${context.items}".to_string(),
        as_name: "item".to_string(),
        condition: None,
        max_iterations: None,
        step: None,
        steps: None,
    };
    let mut ctx = RunContext::new(
        HashMap::from([("items".to_string(), json!([1]))]),
        json!({}),
    );
    let events = EventBus::default();
    let err = execute(
        "loop_step",
        &step,
        &mut ctx,
        &no_locals(),
        Deadline::starting_now(5_000),
        &NeverRpc,
        &events,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FlowError::Step(StepExecutionError::Loop(_))));
}
