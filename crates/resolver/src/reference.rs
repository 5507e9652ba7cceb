// SPDX-License-Identifier: MIT

//! Reference Resolver (spec §4.4): roots a path in `context`, `metadata`,
//! a declared local variable, or a step's stored result, then delegates
//! traversal to the Path Accessor, re-entering the evaluator for
//! `expression`-typed segments.

use indexmap::IndexMap;
use serde_json::Value;
use wf_core::{PathSegment, PathSegmentValue};
use wf_expr::{evaluate, Deadline, PathError, ReferenceLookup};

pub const CONTEXT_ROOT: &str = "context";
pub const METADATA_ROOT: &str = "metadata";

/// Read-only view over the scopes a reference can root in. Cheap to
/// copy (every field is a shared reference), so it can be captured by
/// value inside the nested-evaluation callback without fighting the
/// borrow checker.
#[derive(Clone, Copy)]
pub struct ReferenceResolver<'a> {
    pub context: &'a Value,
    pub metadata: &'a Value,
    pub step_results: &'a IndexMap<String, Value>,
    pub locals: &'a IndexMap<String, Value>,
    pub deadline: Deadline,
}

impl<'a> ReferenceLookup for ReferenceResolver<'a> {
    fn resolve(&mut self, segments: &[PathSegment]) -> Result<Value, PathError> {
        (*self).resolve_path(segments)
    }
}

impl<'a> ReferenceResolver<'a> {
    pub fn resolve_path(self, segments: &[PathSegment]) -> Result<Value, PathError> {
        let Some(first) = segments.first() else {
            return Err(PathError::Syntax(wf_expr::PathSyntaxError::new(
                "empty reference",
                0,
            )));
        };
        let PathSegmentValue::Property(root_name) = &first.value else {
            return Err(PathError::Syntax(wf_expr::PathSyntaxError::new(
                "reference must start with an identifier",
                0,
            )));
        };

        let (root, rest) = if root_name == CONTEXT_ROOT {
            (self.context, &segments[1..])
        } else if root_name == METADATA_ROOT {
            (self.metadata, &segments[1..])
        } else if let Some(local) = self.locals.get(root_name) {
            (local, &segments[1..])
        } else if let Some(result) = self.step_results.get(root_name) {
            (result, &segments[1..])
        } else {
            return Err(PathError::UnknownReference(
                wf_expr::UnknownReferenceError {
                    name: root_name.clone(),
                },
            ));
        };

        let mut inner = self;
        let deadline = self.deadline;
        let mut callback = move |expr: &str| -> Result<Value, PathError> {
            evaluate(expr, &mut inner, deadline).map_err(|flow_err| {
                PathError::nested(flow_err.code().as_str().to_string(), flow_err.to_string())
            })
        };
        wf_expr::path::read(root, rest, &mut callback)
    }
}

#[cfg(test)]
#[path = "reference_tests.rs"]
mod tests;
