use super::*;

fn locals(names: &[&str]) -> std::collections::HashSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn collects_simple_step_reference() {
    let refs = collect_step_references("${stepA.value} + 1", &locals(&[]));
    assert_eq!(refs, locals(&["stepA"]));
}

#[test]
fn ignores_context_and_metadata_roots() {
    let refs = collect_step_references("${context.x} + ${metadata.y}", &locals(&[]));
    assert!(refs.is_empty());
}

#[test]
fn ignores_declared_local_variables() {
    let refs = collect_step_references("${item} + ${acc}", &locals(&[]));
    assert!(refs.is_empty());
    let refs = collect_step_references("${total}", &locals(&["total"]));
    assert!(refs.is_empty());
}

#[test]
fn collects_multiple_distinct_steps() {
    let refs = collect_step_references("${stepOne.x} == ${stepTwo.y}", &locals(&[]));
    assert_eq!(refs, locals(&["stepOne", "stepTwo"]));
}

#[test]
fn recurses_into_nested_reference_inside_brackets() {
    let refs = collect_step_references("${items[${idx.n}]}", &locals(&[]));
    assert_eq!(refs, locals(&["items", "idx"]));
}

#[test]
fn recurses_into_object_and_array_literals() {
    let refs = collect_step_references("{a: ${stepA}, list: [${stepB}]}", &locals(&[]));
    assert_eq!(refs, locals(&["stepA", "stepB"]));
}

#[test]
fn recurses_into_template_literal_parts() {
    let refs = collect_step_references("`${stepA} and ${stepB}`", &locals(&[]));
    assert_eq!(refs, locals(&["stepA", "stepB"]));
}
