// SPDX-License-Identifier: MIT

//! Logger facade (SPEC_FULL.md §3 ambient stack): nests `tracing`
//! spans per step and iteration, the way
//! `oj_engine::executor::Executor::execute` enters one `info_span!`
//! per effect and logs elapsed time on completion.

use std::time::Instant;
use tracing::Span;

#[derive(Clone)]
pub struct StepLogger {
    span: Span,
}

impl StepLogger {
    pub fn for_step(step_name: &str, kind: &str) -> Self {
        Self {
            span: tracing::info_span!("step", name = step_name, kind),
        }
    }

    pub fn for_iteration(&self, iteration: u64) -> Self {
        let _enter = self.span.enter();
        Self {
            span: tracing::info_span!("iteration", iteration),
        }
    }

    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }

    pub fn log_start(&self) {
        let _enter = self.enter();
        tracing::info!("starting");
    }

    pub fn log_outcome<T, E: std::fmt::Display>(&self, started: Instant, result: &Result<T, E>) {
        let _enter = self.enter();
        let elapsed_ms = started.elapsed().as_millis() as u64;
        match result {
            Ok(_) => tracing::info!(elapsed_ms, "completed"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "failed"),
        }
    }
}
