//! Pass 2: Unwind composite assignments into leaf writes.
//!
//! `car have color is "red" that` becomes a single write of `"red"` at
//! `(car, color)`. Arrays write the array marker at their own path before
//! their elements so the store can switch to array mode; empty composites
//! write a placeholder so the key still appears in the output.
//!
//! A composite assignment is preceded by a [`FlatOp::Check`] carrying the
//! whole value, so rules on the assigned path compare against all of it
//! rather than one leaf at a time.

use crate::ast::{Constraint, Operation, Path, Statement, Value};

/// What a flat write puts at its path.
#[derive(Debug, Clone, PartialEq)]
pub enum Leaf {
    Scalar(serde_json::Value),
    /// `have that`
    EmptyObject,
    /// `have 0`
    EmptyArray,
    /// Reserved signal that the container at this path is an array.
    ArrayMarker,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlatOp {
    Write { path: Path, leaf: Leaf },
    /// The whole composite assigned at `path`, checked before its writes.
    Check { path: Path, value: Value },
    Constraint(Constraint),
    /// A parsed statement with no effect. Still occupies its index.
    Inert,
}

/// A flat operation tagged with the index and offset of its statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub op: FlatOp,
    pub index: usize,
    pub offset: i64,
}

pub fn unwind(statements: Vec<Statement>) -> Vec<Entry> {
    let mut entries = Vec::with_capacity(statements.len());
    for (index, statement) in statements.into_iter().enumerate() {
        let offset = statement.offset;
        let mut push = |op| entries.push(Entry { op, index, offset });
        match statement.op {
            Operation::Assign { path, value } => {
                let writes = flatten(&path, &value);
                if matches!(value, Value::Object(_) | Value::Array(_)) {
                    push(FlatOp::Check { path, value });
                }
                for (path, leaf) in writes {
                    push(FlatOp::Write { path, leaf });
                }
            }
            Operation::Constraint(c) => push(FlatOp::Constraint(c)),
            Operation::Inert => push(FlatOp::Inert),
            Operation::Separator => {}
        }
    }
    entries
}

/// Depth-first, order-preserving expansion of `value` written at `path`.
pub fn flatten(path: &Path, value: &Value) -> Vec<(Path, Leaf)> {
    let mut out = Vec::new();
    flatten_into(path.clone(), value, &mut out);
    out
}

fn flatten_into(path: Path, value: &Value, out: &mut Vec<(Path, Leaf)>) {
    match value {
        Value::Object(pairs) if pairs.is_empty() => out.push((path, Leaf::EmptyObject)),
        Value::Array(items) if items.is_empty() => out.push((path, Leaf::EmptyArray)),
        Value::Object(pairs) => {
            for (key, value) in pairs {
                let mut nested = path.clone();
                nested.extend(key.iter().cloned());
                flatten_into(nested, value, out);
            }
        }
        Value::Array(items) => {
            out.push((path.clone(), Leaf::ArrayMarker));
            for (i, item) in items.iter().enumerate() {
                let mut nested = path.clone();
                nested.push(i.to_string());
                flatten_into(nested, item, out);
            }
        }
        scalar => {
            if let Some(plain) = scalar.to_scalar() {
                out.push((path, Leaf::Scalar(plain)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ConstraintKind;
    use serde_json::json;

    fn p(keys: &[&str]) -> Path {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn nested_composites_flatten_depth_first() {
        let value = Value::Object(vec![
            (p(&["name"]), Value::String("Ada".into())),
            (
                p(&["tags"]),
                Value::Array(vec![Value::Bool(true), Value::Object(vec![])]),
            ),
            (p(&["size", "shoe"]), Value::Number(42.into())),
        ]);
        assert_eq!(
            flatten(&p(&["who"]), &value),
            vec![
                (p(&["who", "name"]), Leaf::Scalar(json!("Ada"))),
                (p(&["who", "tags"]), Leaf::ArrayMarker),
                (p(&["who", "tags", "0"]), Leaf::Scalar(json!(true))),
                (p(&["who", "tags", "1"]), Leaf::EmptyObject),
                (p(&["who", "size", "shoe"]), Leaf::Scalar(json!(42))),
            ]
        );
    }

    #[test]
    fn empty_composites_leave_a_placeholder() {
        assert_eq!(
            flatten(&p(&["x"]), &Value::Array(vec![])),
            vec![(p(&["x"]), Leaf::EmptyArray)]
        );
    }

    #[test]
    fn entries_keep_their_statement_index() {
        let statements = vec![
            Statement::new(Operation::Inert),
            Statement {
                op: Operation::Assign {
                    path: p(&["a"]),
                    value: Value::Array(vec![Value::Null]),
                },
                offset: -1,
            },
            Statement::new(Operation::Constraint(Constraint {
                kind: ConstraintKind::CantExist,
                path: p(&["b"]),
                value: None,
            })),
        ];
        let entries = unwind(statements);
        let indexed: Vec<(usize, i64)> = entries.iter().map(|e| (e.index, e.offset)).collect();
        assert_eq!(indexed, vec![(0, 0), (1, -1), (1, -1), (1, -1), (2, 0)]);
        assert_eq!(entries[0].op, FlatOp::Inert);
    }

    #[test]
    fn composite_assignments_lead_with_a_whole_value_check() {
        let value = Value::Array(vec![int(1)]);
        let entries = unwind(vec![
            Statement::new(Operation::Assign {
                path: p(&["x"]),
                value: value.clone(),
            }),
            Statement::new(Operation::Assign {
                path: p(&["y"]),
                value: int(2),
            }),
        ]);
        let ops: Vec<FlatOp> = entries.into_iter().map(|e| e.op).collect();
        assert_eq!(
            ops,
            vec![
                FlatOp::Check {
                    path: p(&["x"]),
                    value,
                },
                FlatOp::Write {
                    path: p(&["x"]),
                    leaf: Leaf::ArrayMarker,
                },
                FlatOp::Write {
                    path: p(&["x", "0"]),
                    leaf: Leaf::Scalar(json!(1)),
                },
                FlatOp::Write {
                    path: p(&["y"]),
                    leaf: Leaf::Scalar(json!(2)),
                },
            ]
        );
    }

    fn int(n: i64) -> Value {
        Value::Number(n.into())
    }
}
