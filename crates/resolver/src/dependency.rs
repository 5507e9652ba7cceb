// SPDX-License-Identifier: MIT

//! Dependency Resolver (spec §4.6): builds the step dependency graph
//! from statically collected references, detects cycles, and produces
//! a topological plan that falls back to declaration order when no
//! dependency forces otherwise.

use crate::collector::collect_step_references;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use wf_core::{DependencyError, StepDef, StepKind};

/// All `${...}`-bearing string fields reachable from a single step,
/// including its nested `then`/`else`/`step`/`steps` bodies — those
/// nested steps are walked too so a dependency declared deep inside a
/// condition or loop body still becomes an edge on the *outer* step
/// (the engine only schedules top-level steps; nested steps execute as
/// part of their parent's own execution).
fn expressions_of(step: &StepDef, locals: &HashSet<String>) -> Vec<(String, HashSet<String>)> {
    let mut out = Vec::new();
    match &step.kind {
        StepKind::Request(r) => {
            let mut refs = HashSet::new();
            collect_from_value(&r.params, locals, &mut refs);
            out.push((step.name.clone(), refs));
        }
        StepKind::Transform(t) => {
            let mut refs = HashSet::new();
            if let Some(input) = &t.input {
                refs.extend(collect_step_references(input, locals));
            }
            for op in &t.operations {
                refs.extend(collect_step_references(&op.using, locals));
                if let Some(initial) = &op.initial {
                    collect_from_value(initial, locals, &mut refs);
                }
            }
            out.push((step.name.clone(), refs));
        }
        StepKind::Condition(c) => {
            let mut refs = HashSet::new();
            refs.extend(collect_step_references(&c.if_expr, locals));
            out.push((step.name.clone(), refs));
            out.extend(expressions_of(&c.then, locals));
            if let Some(else_step) = &c.else_step {
                out.extend(expressions_of(else_step, locals));
            }
        }
        StepKind::Loop(l) => {
            let mut refs = HashSet::new();
            refs.extend(collect_step_references(&l.over, locals));
            let mut body_locals = locals.clone();
            body_locals.insert(l.as_name.clone());
            if let Some(condition) = &l.condition {
                refs.extend(collect_step_references(condition, &body_locals));
            }
            out.push((step.name.clone(), refs));
            if let Some(body) = &l.step {
                out.extend(expressions_of(body, &body_locals));
            }
            if let Some(steps) = &l.steps {
                for body in steps {
                    out.extend(expressions_of(body, &body_locals));
                }
            }
        }
        StepKind::Stop(_) => out.push((step.name.clone(), HashSet::new())),
    }
    out
}

fn collect_from_value(value: &Value, locals: &HashSet<String>, out: &mut HashSet<String>) {
    match value {
        Value::String(s) => out.extend(collect_step_references(s, locals)),
        Value::Array(items) => {
            for item in items {
                collect_from_value(item, locals, out);
            }
        }
        Value::Object(map) => {
            for v in map.values() {
                collect_from_value(v, locals, out);
            }
        }
        _ => {}
    }
}

/// A dependency graph plus the declaration-order index of each step,
/// used as the topological-sort tie-break (spec §4.6.5).
pub struct DependencyGraph {
    pub order_index: HashMap<String, usize>,
    pub edges: HashMap<String, HashSet<String>>,
}

pub fn build_graph(steps: &[StepDef]) -> Result<DependencyGraph, DependencyError> {
    let order_index: HashMap<String, usize> = steps
        .iter()
        .enumerate()
        .map(|(i, s)| (s.name.clone(), i))
        .collect();

    let mut edges: HashMap<String, HashSet<String>> =
        steps.iter().map(|s| (s.name.clone(), HashSet::new())).collect();

    for step in steps {
        for (owner, refs) in expressions_of(step, &HashSet::new()) {
            let entry = edges.entry(owner.clone()).or_default();
            for dep in refs {
                if !order_index.contains_key(&dep) {
                    return Err(DependencyError::UnknownDependency {
                        step: owner.clone(),
                        dependency: dep,
                    });
                }
                entry.insert(dep);
            }
        }
    }

    Ok(DependencyGraph {
        order_index,
        edges,
    })
}

/// Kahn's algorithm with declaration order as the ready-set tie-break,
/// so a flow with no dependencies at all executes in source order.
pub fn topological_order(graph: &DependencyGraph) -> Result<Vec<String>, DependencyError> {
    let mut in_degree: HashMap<&str, usize> = graph
        .order_index
        .keys()
        .map(|name| (name.as_str(), 0usize))
        .collect();
    let mut dependents: HashMap<&str, Vec<&str>> = HashMap::new();

    for (step, deps) in &graph.edges {
        for dep in deps {
            *in_degree.get_mut(step.as_str()).expect("step name is known") += 1;
            dependents.entry(dep.as_str()).or_default().push(step.as_str());
        }
    }

    let mut ready: Vec<&str> = in_degree
        .iter()
        .filter(|(_, deg)| **deg == 0)
        .map(|(name, _)| *name)
        .collect();
    ready.sort_by_key(|name| graph.order_index[*name]);

    let mut order = Vec::with_capacity(graph.order_index.len());
    let mut ready_idx = 0;
    while ready_idx < ready.len() {
        let current = ready[ready_idx];
        ready_idx += 1;
        order.push(current.to_string());

        let mut newly_ready = Vec::new();
        if let Some(deps) = dependents.get(current) {
            for &dependent in deps {
                let deg = in_degree.get_mut(dependent).expect("dependent is known");
                *deg -= 1;
                if *deg == 0 {
                    newly_ready.push(dependent);
                }
            }
        }
        newly_ready.sort_by_key(|name| graph.order_index[*name]);
        for name in newly_ready {
            ready.insert(
                ready
                    .iter()
                    .skip(ready_idx)
                    .position(|n| graph.order_index[n] > graph.order_index[name])
                    .map(|p| p + ready_idx)
                    .unwrap_or(ready.len()),
                name,
            );
        }
    }

    if order.len() != graph.order_index.len() {
        let members = find_cycle(graph);
        return Err(DependencyError::Cycle { members });
    }

    Ok(order)
}

/// Depth-first search for one cycle, used only to build the error
/// message once Kahn's algorithm has already proven one exists.
fn find_cycle(graph: &DependencyGraph) -> Vec<String> {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Visiting,
        Done,
    }
    let mut state: HashMap<&str, State> = HashMap::new();
    let mut stack: Vec<&str> = Vec::new();

    fn visit<'a>(
        node: &'a str,
        graph: &'a DependencyGraph,
        state: &mut HashMap<&'a str, State>,
        stack: &mut Vec<&'a str>,
    ) -> Option<Vec<String>> {
        state.insert(node, State::Visiting);
        stack.push(node);
        if let Some(deps) = graph.edges.get(node) {
            for dep in deps {
                match state.get(dep.as_str()) {
                    Some(State::Visiting) => {
                        let start = stack.iter().position(|n| *n == dep.as_str()).unwrap_or(0);
                        let mut members: Vec<String> =
                            stack[start..].iter().map(|s| s.to_string()).collect();
                        members.push(dep.clone());
                        return Some(members);
                    }
                    Some(State::Done) => continue,
                    None => {
                        if let Some(found) = visit(dep.as_str(), graph, state, stack) {
                            return Some(found);
                        }
                    }
                }
            }
        }
        stack.pop();
        state.insert(node, State::Done);
        None
    }

    let mut names: Vec<&str> = graph.order_index.keys().map(|s| s.as_str()).collect();
    names.sort_by_key(|n| graph.order_index[*n]);
    for name in names {
        if state.get(name).is_none() {
            if let Some(found) = visit(name, graph, &mut state, &mut stack) {
                return found;
            }
        }
    }
    Vec::new()
}

/// Full plan operation (spec §4.6): `plan(flow) -> orderedSteps[]`.
pub fn plan(steps: &[StepDef]) -> Result<Vec<String>, DependencyError> {
    let graph = build_graph(steps)?;
    topological_order(&graph)
}

#[cfg(test)]
#[path = "dependency_tests.rs"]
mod tests;
