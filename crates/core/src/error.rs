use crate::ast::{display_path, ConstraintKind};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// A failed read. No partial value is ever returned alongside one of these.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadError {
    /// The document does not match the grammar.
    #[error("syntax error at line {line}, column {column}: {message}\n{context}")]
    Syntax {
        line: u32,
        column: u32,
        /// The offending token or character as written in the source.
        found: String,
        message: String,
        /// The offending source line with a caret under `column`.
        context: String,
    },

    /// A write tried to descend through a key that holds a scalar.
    #[error(
        "cannot write {}: {} holds a scalar, not a container",
        display_path(.path),
        serde_json::Value::String(.segment.clone())
    )]
    Structural {
        path: Vec<String>,
        /// The key holding the scalar.
        segment: String,
    },

    /// An assignment broke a `can't be`, `can't exist` or `has to be` rule.
    #[error(
        "{} {rule}{}, but {} was assigned",
        display_path(.path),
        required_suffix(.required),
        .offered
    )]
    ConstraintViolation {
        path: Vec<String>,
        rule: ConstraintKind,
        offered: Value,
        #[serde(skip_serializing_if = "Option::is_none")]
        required: Option<Value>,
    },
}

fn required_suffix(required: &Option<Value>) -> String {
    required.as_ref().map(|v| format!(" {v}")).unwrap_or_default()
}

impl ReadError {
    /// Machine-readable form, tagged with `"kind"`.
    pub fn to_json_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

/// Build a positioned syntax error against `src`.
pub(crate) fn syntax_error(
    src: &str,
    line: u32,
    column: u32,
    found: impl Into<String>,
    message: impl Into<String>,
) -> ReadError {
    let source_line = src
        .lines()
        .nth(line.saturating_sub(1) as usize)
        .unwrap_or_default();
    let caret = " ".repeat(column.saturating_sub(1) as usize);
    ReadError::Syntax {
        line,
        column,
        found: found.into(),
        message: message.into(),
        context: format!("{source_line}\n{caret}^"),
    }
}

/// A non-fatal problem noticed while reading. Warnings never abort a read.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// An array had gaps between its indices; the holes were dropped.
    ArrayHoles { path: Vec<String> },
    /// A constraint was declared after a value that already breaks it.
    /// The existing value is kept.
    ConstraintConflict {
        path: Vec<String>,
        rule: ConstraintKind,
        existing: Value,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ArrayHoles { path } => write!(
                f,
                "array holes in {} are removed, check the array indices",
                display_path(path)
            ),
            Warning::ConstraintConflict {
                path,
                rule,
                existing,
            } => write!(
                f,
                "{} {rule}, but it already is {existing}; keeping the existing value",
                display_path(path)
            ),
        }
    }
}
