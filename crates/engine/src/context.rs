// SPDX-License-Identifier: MIT

//! Per-invocation run state: the spec's `ExecutionContext` (spec §3)
//! — context/metadata/step-results scopes plus the reference resolver
//! and expression evaluator wiring, assembled here since those types
//! depend on crates `wf-core` must not depend on.

use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use wf_core::{FlowError, StepResult};
use wf_expr::{evaluate, Deadline};
use wf_resolver::ReferenceResolver;

pub struct RunContext {
    /// The `context` scope: starts as the flow's declared `context`,
    /// then gains one key per transform operation's `as` (spec §4.9).
    pub context: Value,
    /// The read-only `metadata` scope (run id, flow name, start time).
    pub metadata: Value,
    /// Step name -> that step's stored `result`, for reference lookups.
    pub step_results: IndexMap<String, Value>,
    /// Full completion records, addressable by step name (spec §3).
    pub records: HashMap<String, StepResult>,
}

impl RunContext {
    pub fn new(context: HashMap<String, Value>, metadata: Value) -> Self {
        Self {
            context: Value::Object(context.into_iter().collect()),
            metadata,
            step_results: IndexMap::new(),
            records: HashMap::new(),
        }
    }

    pub fn record_step(&mut self, name: &str, result: StepResult) {
        self.step_results
            .insert(name.to_string(), result.result.clone());
        self.records.insert(name.to_string(), result);
    }

    pub fn set_context_var(&mut self, name: &str, value: Value) {
        if let Value::Object(map) = &mut self.context {
            map.insert(name.to_string(), value);
        }
    }

    pub fn resolver<'a>(
        &'a self,
        locals: &'a IndexMap<String, Value>,
        deadline: Deadline,
    ) -> ReferenceResolver<'a> {
        ReferenceResolver {
            context: &self.context,
            metadata: &self.metadata,
            step_results: &self.step_results,
            locals,
            deadline,
        }
    }

    pub fn evaluate(
        &self,
        expression: &str,
        locals: &IndexMap<String, Value>,
        deadline: Deadline,
    ) -> Result<Value, FlowError> {
        let mut resolver = self.resolver(locals, deadline);
        evaluate(expression, &mut resolver, deadline)
    }
}

pub fn no_locals() -> IndexMap<String, Value> {
    IndexMap::new()
}

pub fn one_local(name: &str, value: Value) -> IndexMap<String, Value> {
    let mut locals = IndexMap::new();
    locals.insert(name.to_string(), value);
    locals
}
