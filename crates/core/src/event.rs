// SPDX-License-Identifier: MIT

//! Lifecycle event stream (spec §5, §6).
//!
//! A single-producer, multi-consumer channel from the flow executor to
//! any number of listeners, the same shape as `oj_core::Event` fed
//! through `oj_engine::executor::Executor`'s `mpsc::Sender<Event>` —
//! generalized here to `tokio::sync::broadcast` since the spec allows
//! more than one listener per run.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

/// One lifecycle notification (spec §6 event table).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "payload")]
pub enum Event {
    FlowStart {
        name: String,
        timestamp_ms: u64,
    },
    FlowComplete {
        status: FlowStatus,
        duration_ms: u64,
    },
    FlowError {
        error: String,
    },
    FlowAborted {
        reason: String,
    },
    StepStart {
        step_name: String,
        kind: String,
    },
    StepComplete {
        step_name: String,
        result: Value,
    },
    StepError {
        step_name: String,
        error: String,
    },
    StepSkip {
        step_name: String,
        reason: String,
    },
    StepAborted {
        step_name: String,
        reason: String,
    },
    StepProgress {
        step_name: String,
        iteration: u64,
        total: u64,
        percent: u8,
    },
    DependencyResolved {
        order: Vec<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Complete,
    Error,
    Aborted,
    Paused,
}

/// Typed pub/sub for lifecycle events (spec §2, `Event Bus` row).
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publish an event. Silently drops it if there are no subscribers —
    /// the executor must keep running whether or not anyone is
    /// listening.
    pub fn publish(&self, event: Event) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
