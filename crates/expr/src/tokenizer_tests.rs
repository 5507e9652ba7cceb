use super::*;

fn raw_concat(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.raw()).collect()
}

#[test]
fn tokenizes_simple_reference() {
    let tokens = tokenize("${a.b}").unwrap();
    assert_eq!(tokens.len(), 1);
    match &tokens[0] {
        Token::Reference { raw, .. } => assert_eq!(raw, "${a.b}"),
        other => panic!("expected reference token, got {other:?}"),
    }
}

#[test]
fn tokenizes_number_literal() {
    let tokens = tokenize("42.5").unwrap();
    match &tokens[0] {
        Token::Number { value, .. } => assert_eq!(*value, 42.5),
        other => panic!("expected number token, got {other:?}"),
    }
}

#[test]
fn tokenizes_string_literal_with_escape() {
    let tokens = tokenize(r#"'a\'b'"#).unwrap();
    match &tokens[0] {
        Token::Str { value, .. } => assert_eq!(value, "a'b"),
        other => panic!("expected string token, got {other:?}"),
    }
}

#[test]
fn tokenizes_operators_by_longest_match() {
    let tokens = tokenize("a === b").unwrap();
    assert!(tokens.iter().any(|t| t.is_operator("===")));
    assert!(!tokens.iter().any(|t| t.is_operator("==")));
}

#[test]
fn tokenizes_arithmetic_expression() {
    let tokens = tokenize("2+3*4").unwrap();
    assert_eq!(tokens.len(), 5);
}

#[test]
fn tokenizes_logical_expression() {
    let tokens = tokenize("false||true&&false").unwrap();
    assert!(tokens.iter().any(|t| t.is_operator("||")));
    assert!(tokens.iter().any(|t| t.is_operator("&&")));
}

#[test]
fn tokenizes_object_literal_by_colon_heuristic() {
    let tokens = tokenize("{a: 1, b: 2}").unwrap();
    assert_eq!(tokens.len(), 1);
    assert!(matches!(tokens[0], Token::ObjectLiteral { .. }));
}

#[test]
fn tokenizes_empty_object_literal() {
    let tokens = tokenize("{}").unwrap();
    assert!(matches!(tokens[0], Token::ObjectLiteral { .. }));
}

#[test]
fn tokenizes_spread_object_literal() {
    let tokens = tokenize("{...a}").unwrap();
    assert!(matches!(tokens[0], Token::ObjectLiteral { .. }));
}

#[test]
fn tokenizes_array_literal() {
    let tokens = tokenize("[1, 2, 3]").unwrap();
    assert!(matches!(tokens[0], Token::ArrayLiteral { .. }));
}

#[test]
fn tokenizes_template_literal_with_embedded_reference() {
    let tokens = tokenize("`hello ${name}!`").unwrap();
    match &tokens[0] {
        Token::TemplateLiteral { tokens: parts, .. } => {
            assert_eq!(parts.len(), 3);
            assert!(matches!(parts[1], Token::Reference { .. }));
        }
        other => panic!("expected template literal, got {other:?}"),
    }
}

#[test]
fn rejects_unterminated_string() {
    assert!(tokenize("'abc").is_err());
}

#[test]
fn rejects_unterminated_reference() {
    assert!(tokenize("${a.b").is_err());
}

#[test]
fn raw_slices_are_non_empty_for_every_token() {
    let tokens = tokenize("a + ${b} * 3").unwrap();
    for t in &tokens {
        assert!(!t.raw().is_empty());
    }
    assert!(!raw_concat(&tokens).is_empty());
}
