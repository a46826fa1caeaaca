//! Condition evaluator for conditional-mode workflows.
//!
//! Conditions are parsed into a closed grammar and matched against the run
//! input. Nothing is ever evaluated as code.
//!
//! | form                       | meaning                                  |
//! |----------------------------|------------------------------------------|
//! | `always`                   | true                                     |
//! | `never`                    | false                                    |
//! | `input.<field> === <lit>`  | `input[field]` strictly equals `<lit>`   |
//! | `input.<field> !== <lit>`  | `input[field]` does not equal `<lit>`    |
//! | `input.<field>`            | `input[field]` is truthy                 |
//!
//! `<lit>` is a quoted string (`"premium"` or `'premium'`) or a raw token,
//! which is compared as a string. A missing field never equals anything and
//! is falsy. An expression outside the grammar evaluates to false.

use serde_json::Value;

const INPUT_PREFIX: &str = "input.";

/// A parsed step condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Always,
    Never,
    Equals { field: String, literal: String },
    NotEquals { field: String, literal: String },
    Truthy { field: String },
    /// Text that matches none of the forms above.
    Unrecognized(String),
}

impl Condition {
    /// Parse a condition string. Total: never fails, never panics.
    pub fn parse(expression: &str) -> Self {
        let expr = expression.trim();
        match expr {
            "always" => return Self::Always,
            "never" => return Self::Never,
            _ => {}
        }

        let Some(rest) = expr.strip_prefix(INPUT_PREFIX) else {
            return Self::Unrecognized(expr.to_string());
        };

        let field_len = rest
            .char_indices()
            .find(|(_, c)| !is_field_char(*c))
            .map_or(rest.len(), |(i, _)| i);
        let (field, tail) = rest.split_at(field_len);
        if !is_valid_field(field) {
            return Self::Unrecognized(expr.to_string());
        }
        let field = field.to_string();
        let tail = tail.trim_start();

        if tail.is_empty() {
            return Self::Truthy { field };
        }

        if let Some(literal) = tail.strip_prefix("===").and_then(parse_literal) {
            return Self::Equals { field, literal };
        }
        if let Some(literal) = tail.strip_prefix("!==").and_then(parse_literal) {
            return Self::NotEquals { field, literal };
        }

        Self::Unrecognized(expr.to_string())
    }

    /// Evaluate against the run input.
    pub fn evaluate(&self, input: &Value) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Equals { field, literal } => strict_equals(lookup(input, field), literal),
            Self::NotEquals { field, literal } => !strict_equals(lookup(input, field), literal),
            Self::Truthy { field } => lookup(input, field).is_some_and(value_to_bool),
            Self::Unrecognized(expr) => {
                tracing::warn!(condition = expr.as_str(), "unrecognized condition, treating as false");
                false
            }
        }
    }
}

/// Evaluate an optional step condition. An absent or blank condition is true.
pub fn evaluate_condition(condition: Option<&str>, input: &Value) -> bool {
    match condition.map(str::trim) {
        None | Some("") => true,
        Some(expr) => Condition::parse(expr).evaluate(input),
    }
}

/// Coerce a JSON value to boolean using JavaScript-like truthiness.
pub fn value_to_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Null => false,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn lookup<'a>(input: &'a Value, field: &str) -> Option<&'a Value> {
    input.as_object().and_then(|obj| obj.get(field))
}

/// Strict equality against a string literal: only a JSON string of the same
/// content matches.
fn strict_equals(value: Option<&Value>, literal: &str) -> bool {
    matches!(value, Some(Value::String(s)) if s == literal)
}

fn parse_literal(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for quote in ['"', '\''] {
        if raw.len() >= 2 && raw.starts_with(quote) && raw.ends_with(quote) {
            return Some(raw[1..raw.len() - 1].to_string());
        }
    }
    Some(raw.to_string())
}

fn is_field_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

fn is_valid_field(field: &str) -> bool {
    field
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
