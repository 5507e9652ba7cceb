// SPDX-License-Identifier: MIT

//! The injected RPC handler capability (spec §4.9 Request executor:
//! `dispatch(method, resolvedParams, {signal})`).

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use wf_core::RequestError;

/// Generalized from the teacher's per-adapter traits (`SessionAdapter`,
/// `AgentAdapter` in `oj_adapters`) to a single method-dispatch surface,
/// since this engine has no fixed set of effect kinds — the flow
/// document names whatever RPC method it wants.
#[async_trait]
pub trait RpcHandler: Send + Sync {
    async fn dispatch(
        &self,
        method: &str,
        params: Value,
        signal: CancellationToken,
    ) -> Result<Value, RequestError>;
}
