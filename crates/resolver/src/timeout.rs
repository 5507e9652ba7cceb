// SPDX-License-Identifier: MIT

//! Timeout Resolver (spec §4.7): computes the effective timeout for a
//! step or an expression by walking a seven-entry precedence ladder.

use wf_core::{Policies, StepKindName, TimeoutTable, ValidationError};

const MIN_TIMEOUT_MS: u64 = 50;
const MAX_TIMEOUT_MS: u64 = 3_600_000;

/// Resolve the effective timeout for `kind`, walking the ladder in
/// spec §4.7 order and validating the winning value.
pub fn resolve_step_timeout(
    kind: StepKindName,
    step_timeout: Option<u64>,
    step_policy_timeout: Option<u64>,
    flow_policies: Option<&Policies>,
    flow_timeouts: Option<&TimeoutTable>,
) -> Result<u64, ValidationError> {
    let step_policies = flow_policies.and_then(|p| p.step.as_ref());

    let candidate = step_policy_timeout
        .or_else(|| {
            step_policies
                .and_then(|s| s.for_kind(kind))
                .and_then(|p| p.timeout)
                .map(|t| t.timeout)
        })
        .or_else(|| step_policies.and_then(|s| s.timeout).map(|t| t.timeout))
        .or_else(|| flow_timeouts.and_then(|t| t.get(kind)))
        .or_else(|| {
            flow_policies
                .and_then(|p| p.global.as_ref())
                .and_then(|g| g.timeout)
                .map(|t| t.timeout)
        })
        .or_else(|| flow_timeouts.and_then(|t| t.global))
        .or(step_timeout)
        .unwrap_or_else(|| wf_core::builtin_default_timeout_ms(kind));

    validate(candidate)
}

/// Same ladder, but for expression timeouts: a step-attached timeout
/// dominates before falling through to the `expression` ladder entry
/// (spec §4.7, last paragraph).
pub fn resolve_expression_timeout(
    step_timeout: Option<u64>,
    flow_policies: Option<&Policies>,
    flow_timeouts: Option<&TimeoutTable>,
) -> Result<u64, ValidationError> {
    if let Some(t) = step_timeout {
        return validate(t);
    }
    resolve_step_timeout(
        StepKindName::Expression,
        None,
        None,
        flow_policies,
        flow_timeouts,
    )
}

fn validate(value_ms: u64) -> Result<u64, ValidationError> {
    if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&value_ms) {
        return Err(ValidationError::new(format!(
            "timeout {value_ms}ms is outside the allowed range [{MIN_TIMEOUT_MS}ms, {MAX_TIMEOUT_MS}ms]"
        )));
    }
    Ok(value_ms)
}

#[cfg(test)]
#[path = "timeout_tests.rs"]
mod tests;
