// SPDX-License-Identifier: MIT

//! Stop executor (spec §4.9): produces a result carrying the
//! `endWorkflow` flag; the flow executor is responsible for actually
//! aborting subsequent steps when it is set.

use serde_json::json;
use wf_core::{FlowError, StepKindName, StepResult, StopStep};

pub fn execute(step: &StopStep) -> Result<StepResult, FlowError> {
    Ok(StepResult {
        result: json!({ "endWorkflow": step.end_workflow }),
        kind: StepKindName::Stop,
        metadata: None,
    })
}

#[cfg(test)]
#[path = "stop_tests.rs"]
mod tests;
