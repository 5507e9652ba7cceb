// SPDX-License-Identifier: MIT

//! Flow and step data model (spec §3, §6).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A named program: an ordered list of steps plus shared context,
/// timeouts, and policies. Immutable once constructed (spec §3).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Flow {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub context: HashMap<String, Value>,
    pub steps: Vec<StepDef>,
    #[serde(default)]
    pub timeouts: Option<TimeoutTable>,
    #[serde(default)]
    pub policies: Option<Policies>,
}

/// One step. Exactly one of the kind-specific shapes is present; which
/// one is present determines the step kind (spec §3, design note on
/// dynamic dispatch — modeled here as a tagged sum rather than a bag of
/// optional fields).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StepDef {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub policies: Option<PolicySet>,
    #[serde(flatten)]
    pub kind: StepKind,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Request(RequestStep),
    Transform(TransformStep),
    Condition(ConditionStep),
    Loop(LoopStep),
    Stop(StopStep),
}

impl StepKind {
    pub fn name(&self) -> StepKindName {
        match self {
            Self::Request(_) => StepKindName::Request,
            Self::Transform(_) => StepKindName::Transform,
            Self::Condition(_) => StepKindName::Condition,
            Self::Loop(_) => StepKindName::Loop,
            Self::Stop(_) => StepKindName::Stop,
        }
    }
}

/// The discriminant of a step kind, also used as the lookup key in the
/// timeout/policy resolution ladder (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKindName {
    Request,
    Transform,
    Condition,
    Loop,
    Stop,
    /// Not a step kind, but shares the resolution ladder (spec §4.7).
    Expression,
    /// The flow-wide fallback entry in the ladder.
    Global,
}

impl StepKindName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Transform => "transform",
            Self::Condition => "condition",
            Self::Loop => "loop",
            Self::Stop => "stop",
            Self::Expression => "expression",
            Self::Global => "global",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestStep {
    pub method: String,
    pub params: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransformStep {
    #[serde(default)]
    pub input: Option<String>,
    pub operations: Vec<TransformOp>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransformOp {
    #[serde(rename = "type")]
    pub kind: TransformOpKind,
    pub using: String,
    #[serde(default, rename = "as")]
    pub as_name: Option<String>,
    #[serde(default)]
    pub initial: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformOpKind {
    Map,
    Filter,
    Reduce,
    Flatten,
    Sort,
    Unique,
    Group,
    Join,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConditionStep {
    #[serde(rename = "if")]
    pub if_expr: String,
    pub then: Box<StepDef>,
    #[serde(default, rename = "else")]
    pub else_step: Option<Box<StepDef>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoopStep {
    pub over: String,
    #[serde(rename = "as")]
    pub as_name: String,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default, rename = "maxIterations")]
    pub max_iterations: Option<u64>,
    #[serde(default)]
    pub step: Option<Box<StepDef>>,
    #[serde(default)]
    pub steps: Option<Vec<StepDef>>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StopStep {
    #[serde(rename = "endWorkflow")]
    pub end_workflow: bool,
}

/// A step's completion record, addressable by step name (spec §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub result: Value,
    pub kind: StepKindName,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Timeouts map (ms), spec §6: `{ global?, request?, transform?,
/// condition?, loop?, expression? }`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TimeoutTable {
    #[serde(default)]
    pub global: Option<u64>,
    #[serde(default)]
    pub request: Option<u64>,
    #[serde(default)]
    pub transform: Option<u64>,
    #[serde(default)]
    pub condition: Option<u64>,
    #[serde(default, rename = "loop")]
    pub loop_: Option<u64>,
    #[serde(default)]
    pub expression: Option<u64>,
}

impl TimeoutTable {
    pub fn get(&self, kind: StepKindName) -> Option<u64> {
        match kind {
            StepKindName::Request => self.request,
            StepKindName::Transform => self.transform,
            StepKindName::Condition => self.condition,
            StepKindName::Loop => self.loop_,
            StepKindName::Expression => self.expression,
            StepKindName::Global | StepKindName::Stop => self.global,
        }
    }
}

/// Built-in default timeouts per kind, in milliseconds (spec §4.7).
pub fn builtin_default_timeout_ms(kind: StepKindName) -> u64 {
    match kind {
        StepKindName::Request => 30_000,
        StepKindName::Transform => 10_000,
        StepKindName::Condition => 5_000,
        StepKindName::Loop => 60_000,
        StepKindName::Expression => 1_000,
        StepKindName::Global | StepKindName::Stop => 30_000,
    }
}

/// Flow- or step-level policy bundle (spec §3, §4.7, §4.8).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PolicySet {
    #[serde(default)]
    pub timeout: Option<TimeoutSetting>,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default, rename = "continueOnFailure")]
    pub continue_on_failure: Option<bool>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct TimeoutSetting {
    pub timeout: u64,
}

/// Flow-wide policy document: a global default, plus per-kind overrides
/// nested under `step` (spec §4.7, ladder entries 2 and 3).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Policies {
    #[serde(default)]
    pub global: Option<PolicySet>,
    #[serde(default)]
    pub step: Option<StepPolicies>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StepPolicies {
    #[serde(default)]
    pub timeout: Option<TimeoutSetting>,
    #[serde(default)]
    pub retry: Option<RetryPolicy>,
    #[serde(default, rename = "continueOnFailure")]
    pub continue_on_failure: Option<bool>,
    #[serde(default)]
    pub request: Option<PolicySet>,
    #[serde(default)]
    pub transform: Option<PolicySet>,
    #[serde(default)]
    pub condition: Option<PolicySet>,
    #[serde(default, rename = "loop")]
    pub loop_: Option<PolicySet>,
}

impl StepPolicies {
    pub fn for_kind(&self, kind: StepKindName) -> Option<&PolicySet> {
        match kind {
            StepKindName::Request => self.request.as_ref(),
            StepKindName::Transform => self.transform.as_ref(),
            StepKindName::Condition => self.condition.as_ref(),
            StepKindName::Loop => self.loop_.as_ref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryPolicy {
    #[serde(rename = "maxAttempts")]
    pub max_attempts: u32,
    pub backoff: Backoff,
    #[serde(default, rename = "retryDelay")]
    pub retry_delay: Option<u64>,
    #[serde(default, rename = "retryableErrors")]
    pub retryable_errors: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Backoff {
    pub strategy: BackoffStrategy,
    pub initial: u64,
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
    #[serde(default, rename = "maxDelay")]
    pub max_delay: Option<u64>,
}

fn default_multiplier() -> f64 {
    2.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    Exponential,
    Linear,
}

#[cfg(test)]
#[path = "flow_tests.rs"]
mod tests;
