// SPDX-License-Identifier: MIT

//! Retry Engine (spec §4.8): wraps an async step attempt with
//! duck-typed retryable-error classification and exponential/linear
//! backoff.

use std::future::Future;
use std::time::Duration;
use wf_core::{BackoffStrategy, ExecutionError, FlowError, RetryPolicy};

/// Run `attempt` (1-indexed attempt number) until it succeeds, the
/// failure is not retryable, or `max_attempts` is exhausted.
pub async fn with_retry<F, Fut, T>(policy: Option<&RetryPolicy>, mut attempt: F) -> Result<T, FlowError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FlowError>>,
{
    let Some(policy) = policy else {
        return attempt(1).await;
    };

    let mut n = 1;
    loop {
        match attempt(n).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retryable(&err, policy) {
                    return Err(err);
                }
                if n >= policy.max_attempts {
                    return Err(FlowError::Execution(ExecutionError::MaxRetriesExceeded {
                        cause: Box::new(err),
                        attempts: n,
                    }));
                }
                tokio::time::sleep(Duration::from_millis(delay_for(policy, n))).await;
                n += 1;
            }
        }
    }
}

fn is_retryable(err: &FlowError, policy: &RetryPolicy) -> bool {
    let code = err.code();
    policy
        .retryable_errors
        .iter()
        .any(|candidate| candidate == code.as_str())
}

/// `n` is the attempt number that just failed (1-indexed); the delay
/// computed here is served before attempt `n + 1`.
fn delay_for(policy: &RetryPolicy, n: u32) -> u64 {
    if let Some(fixed) = policy.retry_delay {
        return fixed;
    }
    let initial = policy.backoff.initial as f64;
    let raw = match policy.backoff.strategy {
        BackoffStrategy::Exponential => initial * policy.backoff.multiplier.powi(n as i32 - 1),
        BackoffStrategy::Linear => {
            let step = initial * 0.04;
            initial + (n as f64 - 1.0) * step
        }
    };
    let capped = policy
        .backoff
        .max_delay
        .map(|max| raw.min(max as f64))
        .unwrap_or(raw);
    capped.max(0.0) as u64
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
