//! Declarative request-body shapes.
//!
//! A [`BodyShape`] is plain data: a list of field rules. `ValidateBody` runs
//! [`BodyShape::validate`] against the parsed JSON body, collecting every
//! violation instead of stopping at the first, and rewrites strings to their
//! trimmed form.
//!
//! ```rust
//! use six_cities::shape::{BodyShape, FieldKind};
//!
//! let shape = BodyShape::new("CreateCommentDto")
//!     .required("text", FieldKind::text(5, 1024))
//!     .required("rating", FieldKind::integer(1, 5));
//!
//! let body = serde_json::json!({ "text": "  Lovely place  ", "rating": 5 });
//! let trimmed = shape.validate(&body).unwrap();
//! assert_eq!(trimmed["text"], "Lovely place");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::http_error::FieldViolation;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// What a single field must look like.
#[derive(Clone, Debug)]
pub enum FieldKind {
    /// String whose trimmed length (in chars) lies in `min..=max`.
    Text { min: usize, max: usize },
    Email,
    Integer { min: i64, max: i64 },
    Number { min: f64, max: f64 },
    Boolean,
    OneOf(&'static [&'static str]),
    List { item: Box<FieldKind>, min: usize, max: usize },
    Object(Vec<FieldRule>),
}

impl FieldKind {
    pub fn text(min: usize, max: usize) -> Self {
        Self::Text { min, max }
    }

    pub fn integer(min: i64, max: i64) -> Self {
        Self::Integer { min, max }
    }

    pub fn number(min: f64, max: f64) -> Self {
        Self::Number { min, max }
    }

    pub fn list(item: FieldKind, min: usize, max: usize) -> Self {
        Self::List { item: Box::new(item), min, max }
    }
}

#[derive(Clone, Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub required: bool,
    pub kind: FieldKind,
}

impl FieldRule {
    pub fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, required: true, kind }
    }

    pub fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, required: false, kind }
    }
}

/// A named set of field rules describing an accepted request body.
#[derive(Clone, Debug)]
pub struct BodyShape {
    name: &'static str,
    rules: Vec<FieldRule>,
}

impl BodyShape {
    pub fn new(name: &'static str) -> Self {
        Self { name, rules: Vec::new() }
    }

    pub fn required(mut self, field: &'static str, kind: FieldKind) -> Self {
        self.rules.push(FieldRule::required(field, kind));
        self
    }

    pub fn optional(mut self, field: &'static str, kind: FieldKind) -> Self {
        self.rules.push(FieldRule::optional(field, kind));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Checks `body` against every rule.
    ///
    /// On success returns the normalized body: strings trimmed, fields the
    /// shape does not mention left as they were.
    pub fn validate(&self, body: &Value) -> Result<Value, Vec<FieldViolation>> {
        let Value::Object(object) = body else {
            return Err(vec![FieldViolation::new("body", "body must be a JSON object")]);
        };

        let mut violations = Vec::new();
        let normalized = validate_object(&self.rules, object, "", &mut violations);

        if violations.is_empty() {
            Ok(Value::Object(normalized))
        } else {
            Err(violations)
        }
    }
}

fn validate_object(
    rules: &[FieldRule],
    object: &Map<String, Value>,
    prefix: &str,
    violations: &mut Vec<FieldViolation>,
) -> Map<String, Value> {
    let mut normalized = object.clone();

    for rule in rules {
        let path = if prefix.is_empty() {
            rule.name.to_owned()
        } else {
            format!("{prefix}.{}", rule.name)
        };

        match object.get(rule.name) {
            None | Some(Value::Null) => {
                if rule.required {
                    violations.push(FieldViolation::new(&path, format!("{path} is required")));
                }
            }
            Some(value) => {
                if let Some(clean) = check(&rule.kind, value, &path, violations) {
                    normalized.insert(rule.name.to_owned(), clean);
                }
            }
        }
    }

    normalized
}

/// Validates one value; returns its normalized form, or `None` after
/// recording a violation.
fn check(
    kind: &FieldKind,
    value: &Value,
    path: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<Value> {
    let mut reject = |message: String| {
        violations.push(FieldViolation::new(path, message));
        None
    };

    match kind {
        FieldKind::Text { min, max } => {
            let Some(s) = value.as_str() else {
                return reject(format!("{path} must be a string"));
            };
            let trimmed = s.trim();
            let len = trimmed.chars().count();
            if len < *min {
                return reject(format!("{path} must be at least {min} characters"));
            }
            if len > *max {
                return reject(format!("{path} must be at most {max} characters"));
            }
            Some(Value::String(trimmed.to_owned()))
        }
        FieldKind::Email => {
            let Some(s) = value.as_str() else {
                return reject(format!("{path} must be a string"));
            };
            let trimmed = s.trim();
            if !EMAIL.is_match(trimmed) {
                return reject(format!("{path} must be a valid email"));
            }
            Some(Value::String(trimmed.to_owned()))
        }
        FieldKind::Integer { min, max } => {
            let Some(n) = value.as_i64() else {
                return reject(format!("{path} must be an integer"));
            };
            if n < *min || n > *max {
                return reject(format!("{path} must be between {min} and {max}"));
            }
            Some(value.clone())
        }
        FieldKind::Number { min, max } => {
            let Some(n) = value.as_f64() else {
                return reject(format!("{path} must be a number"));
            };
            if n < *min || n > *max {
                return reject(format!("{path} must be between {min} and {max}"));
            }
            Some(value.clone())
        }
        FieldKind::Boolean => {
            if !value.is_boolean() {
                return reject(format!("{path} must be a boolean"));
            }
            Some(value.clone())
        }
        FieldKind::OneOf(allowed) => {
            let trimmed = value.as_str().map(str::trim);
            match trimmed {
                Some(s) if allowed.contains(&s) => Some(Value::String(s.to_owned())),
                _ => reject(format!("{path} must be one of: {}", allowed.join(", "))),
            }
        }
        FieldKind::List { item, min, max } => {
            let Some(items) = value.as_array() else {
                return reject(format!("{path} must be an array"));
            };
            if items.len() < *min || items.len() > *max {
                return if min == max {
                    reject(format!("{path} must contain exactly {min} items"))
                } else {
                    reject(format!("{path} must contain between {min} and {max} items"))
                };
            }
            let before = violations.len();
            let cleaned: Vec<Value> = items
                .iter()
                .enumerate()
                .filter_map(|(i, v)| check(item, v, &format!("{path}[{i}]"), violations))
                .collect();
            (violations.len() == before).then_some(Value::Array(cleaned))
        }
        FieldKind::Object(rules) => {
            let Some(object) = value.as_object() else {
                return reject(format!("{path} must be an object"));
            };
            let before = violations.len();
            let cleaned = validate_object(rules, object, path, violations);
            (violations.len() == before).then_some(Value::Object(cleaned))
        }
    }
}
