// SPDX-License-Identifier: MIT

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

//! wf-engine: the Flow Executor and everything it leans on — run
//! context, cancellation, retries, reference interpolation, and the
//! five step executors (spec §4.8–§4.10).

pub mod context;
pub mod control;
pub mod dispatch;
pub mod executors;
pub mod flow_executor;
pub mod interpolate;
pub mod logging;
pub mod retry;

pub use context::RunContext;
pub use control::FlowControl;
pub use dispatch::RpcHandler;
pub use flow_executor::FlowExecutor;
pub use logging::StepLogger;
pub use retry::with_retry;
