// SPDX-License-Identifier: MIT

//! Token model (spec §3, §4.2).

/// A lexical token produced by the tokenizer. Every variant carries the
/// literal source slice (`raw`) it was parsed from, so `raw` fields
/// concatenate back to a prefix-faithful slice of the original
/// expression (spec §8, round-trip property).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number { value: f64, raw: String },
    Str { value: String, raw: String },
    Identifier { value: String, raw: String },
    Operator { value: String, raw: String },
    Punctuation { value: String, raw: String },
    Reference { tokens: Vec<Token>, raw: String },
    ObjectLiteral { tokens: Vec<Token>, raw: String },
    ArrayLiteral { tokens: Vec<Token>, raw: String },
    TemplateLiteral { tokens: Vec<Token>, raw: String },
}

impl Token {
    pub fn raw(&self) -> &str {
        match self {
            Token::Number { raw, .. }
            | Token::Str { raw, .. }
            | Token::Identifier { raw, .. }
            | Token::Operator { raw, .. }
            | Token::Punctuation { raw, .. }
            | Token::Reference { raw, .. }
            | Token::ObjectLiteral { raw, .. }
            | Token::ArrayLiteral { raw, .. }
            | Token::TemplateLiteral { raw, .. } => raw,
        }
    }

    pub fn is_operator(&self, value: &str) -> bool {
        matches!(self, Token::Operator { value: v, .. } if v == value)
    }
}

/// Kind of a single path segment (spec §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathSegmentKind {
    Property,
    Index,
    Expression,
}

/// One step of a parsed path: `.name`, `[0]`, `['quoted key']`, or
/// `[expr]`. `raw` preserves the original source text for `formatPath`
/// round-tripping (spec §8).
#[derive(Debug, Clone, PartialEq)]
pub struct PathSegment {
    pub kind: PathSegmentKind,
    pub value: PathSegmentValue,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathSegmentValue {
    Property(String),
    Index(usize),
    Expression(String),
}

impl PathSegment {
    pub fn property(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: PathSegmentKind::Property,
            raw: name.clone(),
            value: PathSegmentValue::Property(name),
        }
    }

    pub fn index(i: usize) -> Self {
        Self {
            kind: PathSegmentKind::Index,
            raw: i.to_string(),
            value: PathSegmentValue::Index(i),
        }
    }
}

/// Render a sequence of segments back into a path string (spec §8:
/// `formatPath` round-trip — re-parsing the result yields the same
/// segments).
pub fn format_path(segments: &[PathSegment]) -> String {
    let mut out = String::new();
    for (i, seg) in segments.iter().enumerate() {
        match &seg.value {
            PathSegmentValue::Property(p) => {
                if i == 0 {
                    out.push_str(p);
                } else if p.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
                    && !p.chars().next().is_some_and(|c| c.is_ascii_digit())
                {
                    out.push('.');
                    out.push_str(p);
                } else {
                    out.push_str(&format!("['{}']", p));
                }
            }
            PathSegmentValue::Index(idx) => out.push_str(&format!("[{}]", idx)),
            PathSegmentValue::Expression(e) => out.push_str(&format!("[{}]", e)),
        }
    }
    out
}
