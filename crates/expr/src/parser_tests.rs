use super::*;
use crate::tokenizer::tokenize;
use wf_core::AstNode;

fn parse_str(src: &str) -> AstNode {
    parse(&tokenize(src).unwrap()).unwrap()
}

#[test]
fn parses_binary_arithmetic_left_to_right_same_precedence() {
    let ast = parse_str("1-2-3");
    match ast {
        AstNode::Operation { op, left, .. } => {
            assert_eq!(op, "-");
            assert!(matches!(*left, AstNode::Operation { .. }));
        }
        other => panic!("expected operation, got {other:?}"),
    }
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let ast = parse_str("2+3*4");
    match ast {
        AstNode::Operation { op, right, .. } => {
            assert_eq!(op, "+");
            match right.as_deref() {
                Some(AstNode::Operation { op, .. }) => assert_eq!(op, "*"),
                other => panic!("expected nested multiply, got {other:?}"),
            }
        }
        other => panic!("expected operation, got {other:?}"),
    }
}

#[test]
fn parentheses_override_precedence() {
    let ast = parse_str("(2+3)*4");
    match ast {
        AstNode::Operation { op, left, .. } => {
            assert_eq!(op, "*");
            assert!(matches!(*left, AstNode::Operation { .. }));
        }
        other => panic!("expected operation, got {other:?}"),
    }
}

#[test]
fn unary_minus_parses_as_single_operand_operation() {
    let ast = parse_str("-5");
    match ast {
        AstNode::Operation { op, left, right } => {
            assert_eq!(op, "-");
            assert!(right.is_none());
            assert!(matches!(*left, AstNode::Literal(_)));
        }
        other => panic!("expected unary operation, got {other:?}"),
    }
}

#[test]
fn rejects_reference_in_operator_position() {
    let tokens = tokenize("${a} ${b}").unwrap();
    assert!(parse(&tokens).is_err());
}

#[test]
fn rejects_unbalanced_parentheses() {
    let tokens = tokenize("(1+2").unwrap();
    assert!(parse(&tokens).is_err());
}

#[test]
fn parses_object_literal_with_identifier_key() {
    let ast = parse_str("{a: 1, b: 2}");
    match ast {
        AstNode::Object(entries) => assert_eq!(entries.len(), 2),
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn parses_object_literal_spread() {
    let ast = parse_str("{...${a}, b: 1}");
    match ast {
        AstNode::Object(entries) => {
            assert!(entries[0].spread);
            assert!(!entries[1].spread);
        }
        other => panic!("expected object, got {other:?}"),
    }
}

#[test]
fn rejects_spread_of_literal_in_array() {
    let tokens = tokenize("[...5]").unwrap();
    assert!(parse(&tokens).is_err());
}

#[test]
fn parses_array_literal_elements() {
    let ast = parse_str("[1, 2, 3]");
    match ast {
        AstNode::Array(entries) => assert_eq!(entries.len(), 3),
        other => panic!("expected array, got {other:?}"),
    }
}

#[test]
fn parses_template_literal_into_interleaved_parts() {
    let ast = parse_str("`hello ${name}!`");
    match ast {
        AstNode::Template(parts) => {
            assert_eq!(parts.len(), 3);
            assert!(matches!(parts[1], AstNode::Reference(_)));
        }
        other => panic!("expected template, got {other:?}"),
    }
}

#[test]
fn parses_reference_into_path_segments() {
    let ast = parse_str("${a.b[0]}");
    match ast {
        AstNode::Reference(segments) => assert_eq!(segments.len(), 3),
        other => panic!("expected reference, got {other:?}"),
    }
}
