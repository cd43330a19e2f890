//! Parse-tree types shared by the parser and the resolver passes.
//!
//! Nothing here is resolved: composites keep their declared shape and
//! operations keep their time-travel offset. Pass 2 onwards turns these
//! into flat writes against a store.

use serde::Serialize;
use serde_json::Number;
use std::fmt;

/// A key path, outermost container first: `color of car` is `["car", "color"]`.
pub type Path = Vec<String>;

// ──────────────────────────────────────────────
// Values
// ──────────────────────────────────────────────

/// A value as written, before it is folded into a store.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// `have <key> is <value> ... that`. Keys are relative paths, so a pair
    /// may itself reach into a nested container (`have color of car is ...`).
    Object(Vec<(Path, Value)>),
    /// `have <value> ... that`, or `have 0` for the empty array.
    Array(Vec<Value>),
}

impl Value {
    /// The plain form of a scalar; `None` for objects and arrays.
    pub fn to_scalar(&self) -> Option<serde_json::Value> {
        match self {
            Value::Null => Some(serde_json::Value::Null),
            Value::Bool(b) => Some(serde_json::Value::Bool(*b)),
            Value::Number(n) => Some(serde_json::Value::Number(n.clone())),
            Value::String(s) => Some(serde_json::Value::String(s.clone())),
            Value::Object(_) | Value::Array(_) => None,
        }
    }
}

// ──────────────────────────────────────────────
// Operations
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    /// `K can't be`
    CantExist,
    /// `K can't be V`
    CantBe,
    /// `K has to be V`
    HasToBe,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ConstraintKind::CantExist => "can't exist",
            ConstraintKind::CantBe => "can't be",
            ConstraintKind::HasToBe => "has to be",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub kind: ConstraintKind,
    pub path: Path,
    /// Absent only for `CantExist`.
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Assign { path: Path, value: Value },
    Constraint(Constraint),
    /// An `also` joiner. Only lives between the parser and pass 1.
    Separator,
    /// `K can be` / `K can be V`: accepted, does nothing.
    Inert,
}

/// One parsed statement with its accumulated time-travel offset.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub op: Operation,
    /// Negative for `return K`, positive for `skip K`, summed over nested wrappers.
    pub offset: i64,
}

impl Statement {
    pub fn new(op: Operation) -> Self {
        Statement { op, offset: 0 }
    }
}

/// Render a path the way the language writes it: `"color" of "car"`.
pub fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        return "the document".to_owned();
    }
    path.iter()
        .rev()
        .map(|key| serde_json::Value::String(key.clone()).to_string())
        .collect::<Vec<_>>()
        .join(" of ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_path_reverses_into_of_chain() {
        let path = vec!["car".to_owned(), "color".to_owned()];
        assert_eq!(display_path(&path), r#""color" of "car""#);
    }

    #[test]
    fn composites_have_no_scalar_form() {
        assert!(Value::Array(vec![]).to_scalar().is_none());
        assert_eq!(
            Value::String("x".into()).to_scalar(),
            Some(serde_json::Value::String("x".into()))
        );
    }
}
