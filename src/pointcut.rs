//! Pointcut parser: `execution(ClassName.methodPattern)`.
//!
//! A small hand-rolled recursive-descent parser — the grammar is only
//! three tokens deep, not worth pulling in a parser-combinator
//! dependency for.

use crate::error::{DiError, Result};

#[derive(Clone, Debug, PartialEq, Eq)]
enum MethodPattern {
    Any,
    Exact(String),
}

/// A compiled `execution(...)` expression: a predicate over
/// `(class_name, method_name)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pointcut {
    class_name: String,
    method_pattern: MethodPattern,
    source: String,
}

impl Pointcut {
    /// Parses `expr`, failing with `InvalidPointcut` on anything that
    /// does not match `execution(ClassName.methodPattern)`.
    pub fn parse(expr: &str) -> Result<Self> {
        let trimmed = expr.trim();
        let invalid = || DiError::invalid_pointcut(expr);

        let inner = trimmed
            .strip_prefix("execution(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(invalid)?;

        let (class_name, method_part) = inner.split_once('.').ok_or_else(invalid)?;

        if !is_ident(class_name) {
            return Err(invalid());
        }

        let method_pattern = if method_part == "*" {
            MethodPattern::Any
        } else if is_ident(method_part) {
            MethodPattern::Exact(method_part.to_string())
        } else {
            return Err(invalid());
        };

        Ok(Self {
            class_name: class_name.to_string(),
            method_pattern,
            source: trimmed.to_string(),
        })
    }

    /// Whether this pointcut matches a call to `method_name` on a
    /// target whose declared class name is `class_name`.
    pub fn matches(&self, class_name: &str, method_name: &str) -> bool {
        if self.class_name != class_name {
            return false;
        }
        match &self.method_pattern {
            MethodPattern::Any => true,
            MethodPattern::Exact(name) => name == method_name,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

fn is_ident(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
