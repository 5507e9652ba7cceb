// SPDX-License-Identifier: MIT

//! The composed cancellation surface an in-flight execution is
//! steered through: the caller's own signal, a stop step, and the
//! pause gate (spec §4.10 step 2, §5 "Cancellation").

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

pub struct FlowControl {
    pub cancel: CancellationToken,
    paused: AtomicBool,
    notify: Notify,
    abort_reason: Mutex<Option<String>>,
}

impl FlowControl {
    pub fn new() -> Self {
        Self {
            cancel: CancellationToken::new(),
            paused: AtomicBool::new(false),
            notify: Notify::new(),
            abort_reason: Mutex::new(None),
        }
    }

    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn abort(&self, reason: impl Into<String>) {
        *self.abort_reason.lock() = Some(reason.into());
        self.cancel.cancel();
        self.notify.notify_waiters();
    }

    pub fn abort_reason(&self) -> String {
        self.abort_reason
            .lock()
            .clone()
            .unwrap_or_else(|| "aborted".to_string())
    }

    /// Suspends the caller while paused; returns immediately once
    /// cancelled, so a paused flow can still be aborted.
    pub async fn wait_if_paused(&self) {
        while self.paused.load(Ordering::SeqCst) && !self.cancel.is_cancelled() {
            self.notify.notified().await;
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }
}

impl Default for FlowControl {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
