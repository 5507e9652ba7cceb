use super::*;
use crate::context::no_locals;
use async_trait::async_trait;
use serde_json::json;
use std::collections::HashMap;
use wf_expr::Deadline;

struct EchoRpc;

#[async_trait]
impl RpcHandler for EchoRpc {
    async fn dispatch(
        &self,
        method: &str,
        params: Value,
        _signal: CancellationToken,
    ) -> Result<Value, RequestError> {
        Ok(json!({ "method": method, "params": params }))
    }
}

#[tokio::test]
async fn resolves_references_in_params_and_dispatches() {
    let mut ctx = RunContext::new(HashMap::new(), json!({}));
    ctx.record_step(
        "user",
        StepResult {
            result: json!({"id": 7}),
            kind: StepKindName::Request,
            metadata: None,
        },
    );
    let step = RequestStep {
        method: "users.get".to_string(),
        params: json!({"id": "${user.id}"}),
    };
    let result = execute(
        &step,
        &mut ctx,
        &no_locals(),
        Deadline::starting_now(5_000),
        &EchoRpc,
        CancellationToken::new(),
    )
    .await
    .unwrap();
    assert_eq!(
        result.result,
        json!({"method": "users.get", "params": {"id": 7}})
    );
}

#[tokio::test]
async fn rejects_empty_method() {
    let mut ctx = RunContext::new(HashMap::new(), json!({}));
    let step = RequestStep {
        method: "   ".to_string(),
        params: json!({}),
    };
    let err = execute(
        &step,
        &mut ctx,
        &no_locals(),
        Deadline::starting_now(5_000),
        &EchoRpc,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FlowError::Request(_)));
}

#[tokio::test]
async fn rejects_scalar_params() {
    let mut ctx = RunContext::new(HashMap::new(), json!({}));
    let step = RequestStep {
        method: "m".to_string(),
        params: json!("not an object"),
    };
    let err = execute(
        &step,
        &mut ctx,
        &no_locals(),
        Deadline::starting_now(5_000),
        &EchoRpc,
        CancellationToken::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, FlowError::Request(_)));
}
