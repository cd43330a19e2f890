//! Pass 4: Apply ordered entries to the store, enforcing constraints.
//!
//! Constraints are registered on a path and checked against every later
//! write at that path or below it. A composite assigned at the path itself
//! is compared whole. Registering a constraint that the current
//! value already breaks only warns; the value stays.

use crate::ast::{Constraint, ConstraintKind, Path, Value};
use crate::error::{ReadError, Warning};
use crate::pass2_unwind::{flatten, Entry, FlatOp, Leaf};
use crate::pass5_materialize::{materialize, materialize_node};
use crate::store::{Node, Store};
use serde_json::{json, Number, Value as Plain};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Registered {
    kind: ConstraintKind,
    /// Plain form of the rule's value; absent for `CantExist`.
    required: Option<Plain>,
}

/// Everything one read accumulates. Dropped once the value is materialized.
#[derive(Debug, Default)]
pub struct ReadState {
    root: Store,
    constraints: HashMap<Path, Vec<Registered>>,
    warnings: Vec<Warning>,
}

impl ReadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, entry: Entry) -> Result<(), ReadError> {
        match entry.op {
            FlatOp::Inert => Ok(()),
            FlatOp::Constraint(constraint) => self.register(constraint),
            FlatOp::Check { path, value } => self.check_assigned(&path, &value),
            FlatOp::Write { path, leaf } => {
                self.check(&path, &leaf)?;
                write_leaf(&mut self.root, &path, leaf)
            }
        }
    }

    /// Materialize the root and hand back the value with every warning.
    pub fn finish(mut self) -> (Plain, Vec<Warning>) {
        let mut holes = Vec::new();
        let value = materialize(&self.root, &mut Vec::new(), &mut holes);
        for warning in holes {
            self.warn(warning);
        }
        (value, self.warnings)
    }

    fn warn(&mut self, warning: Warning) {
        tracing::warn!(%warning, "wtfl read warning");
        self.warnings.push(warning);
    }

    // -- Constraints --------------------------------------------

    fn register(&mut self, constraint: Constraint) -> Result<(), ReadError> {
        let required = match &constraint.value {
            Some(value) => Some(plain_value(&constraint.path, value)?),
            None => None,
        };

        if let Some(node) = resolve(&self.root, &constraint.path) {
            let existing = materialize_node(node, &mut Vec::new(), &mut Vec::new());
            let conflicts = match (constraint.kind, &required) {
                (ConstraintKind::CantExist, _) => true,
                (ConstraintKind::CantBe, Some(required)) => loose_eq(&existing, required),
                (ConstraintKind::HasToBe, Some(required)) => !loose_eq(&existing, required),
                (_, None) => false,
            };
            if conflicts {
                self.warn(Warning::ConstraintConflict {
                    path: constraint.path.clone(),
                    rule: constraint.kind,
                    existing,
                });
            }
        }

        tracing::debug!(path = ?constraint.path, rule = %constraint.kind, "constraint registered");
        self.constraints
            .entry(constraint.path)
            .or_default()
            .push(Registered {
                kind: constraint.kind,
                required,
            });
        Ok(())
    }

    /// Check a write against the rules on every prefix of its path,
    /// outermost first, each in registration order.
    fn check(&self, path: &[String], leaf: &Leaf) -> Result<(), ReadError> {
        for depth in 1..=path.len() {
            let (rule_path, below) = path.split_at(depth);
            let Some(rules) = self.constraints.get(rule_path) else {
                continue;
            };
            for rule in rules {
                if !rule.allows(below, leaf) {
                    return Err(ReadError::ConstraintViolation {
                        path: rule_path.to_vec(),
                        rule: rule.kind,
                        offered: offered(leaf),
                        required: rule.required.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Check a composite assigned at `path` against the rules on that exact
    /// path. Its leaves are checked one by one afterwards.
    fn check_assigned(&self, path: &Path, value: &Value) -> Result<(), ReadError> {
        let Some(rules) = self.constraints.get(path) else {
            return Ok(());
        };
        let offered = plain_value(path, value)?;
        for rule in rules {
            let allowed = match (rule.kind, &rule.required) {
                (ConstraintKind::CantExist, _) => false,
                (ConstraintKind::CantBe, Some(required)) => !loose_eq(&offered, required),
                (ConstraintKind::HasToBe, Some(required)) => loose_eq(&offered, required),
                (_, None) => true,
            };
            if !allowed {
                return Err(ReadError::ConstraintViolation {
                    path: path.clone(),
                    rule: rule.kind,
                    offered,
                    required: rule.required.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Registered {
    /// Whether `leaf`, written `below` this rule's path, is allowed.
    fn allows(&self, below: &[String], leaf: &Leaf) -> bool {
        let required = match (self.kind, &self.required) {
            (ConstraintKind::CantExist, _) => return false,
            (_, None) => return true,
            (_, Some(required)) => required,
        };
        match self.kind {
            ConstraintKind::CantBe if below.is_empty() => match leaf {
                Leaf::ArrayMarker => true,
                _ => !loose_eq(&offered(leaf), required),
            },
            ConstraintKind::CantBe => true,
            _ => descend(required, below).is_some_and(|target| leaf_matches(leaf, target)),
        }
    }
}

/// The part of `value` at the relative path `below`.
fn descend<'v>(value: &'v Plain, below: &[String]) -> Option<&'v Plain> {
    below.iter().try_fold(value, |current, key| match current {
        Plain::Object(map) => map.get(key),
        Plain::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn leaf_matches(leaf: &Leaf, target: &Plain) -> bool {
    match leaf {
        Leaf::Scalar(value) => loose_eq(value, target),
        Leaf::EmptyObject => target.is_object(),
        Leaf::EmptyArray | Leaf::ArrayMarker => target.is_array(),
    }
}

/// What a leaf looks like to whoever reads the error.
fn offered(leaf: &Leaf) -> Plain {
    match leaf {
        Leaf::Scalar(value) => value.clone(),
        Leaf::EmptyObject => json!({}),
        Leaf::EmptyArray | Leaf::ArrayMarker => json!([]),
    }
}

// ──────────────────────────────────────────────
// Store writes
// ──────────────────────────────────────────────

fn structural(path: &[String], segment: &str) -> ReadError {
    ReadError::Structural {
        path: path.to_vec(),
        segment: segment.to_owned(),
    }
}

/// Walk (creating as needed) to the parent of `path` and write the leaf.
fn write_leaf(root: &mut Store, path: &[String], leaf: Leaf) -> Result<(), ReadError> {
    let Some((last, parents)) = path.split_last() else {
        return match leaf {
            Leaf::Scalar(_) => Err(structural(path, "")),
            Leaf::EmptyObject => Ok(()),
            Leaf::EmptyArray | Leaf::ArrayMarker => {
                root.mark_array();
                Ok(())
            }
        };
    };

    let mut store = root;
    for key in parents {
        store = store.child_mut(key).ok_or_else(|| structural(path, key))?;
    }
    match leaf {
        Leaf::Scalar(value) => store.insert(last, Node::Scalar(value)),
        Leaf::EmptyObject => {
            store.container_mut(last).ok_or_else(|| structural(path, last))?;
        }
        Leaf::EmptyArray => {
            store
                .container_mut(last)
                .ok_or_else(|| structural(path, last))?
                .mark_array();
        }
        Leaf::ArrayMarker => {
            store
                .child_mut(last)
                .ok_or_else(|| structural(path, last))?
                .mark_array();
        }
    }
    Ok(())
}

fn resolve<'s>(root: &'s Store, path: &[String]) -> Option<&'s Node> {
    let (first, rest) = path.split_first()?;
    rest.iter().try_fold(root.get(first)?, |node, key| match node {
        Node::Store(store) => store.get(key),
        Node::Scalar(_) => None,
    })
}

/// The plain value `value` would materialize to if written at `path` into
/// an empty document.
fn plain_value(path: &Path, value: &Value) -> Result<Plain, ReadError> {
    let mut scratch = Store::new();
    for (at, leaf) in flatten(path, value) {
        write_leaf(&mut scratch, &at, leaf)?;
    }
    Ok(resolve(&scratch, path)
        .map(|node| materialize_node(node, &mut Vec::new(), &mut Vec::new()))
        .unwrap_or(Plain::Null))
}

// ──────────────────────────────────────────────
// Equality
// ──────────────────────────────────────────────

/// Value equality with numbers compared by value across integer and float
/// representations, and objects compared regardless of key order.
pub fn loose_eq(a: &Plain, b: &Plain) -> bool {
    match (a, b) {
        (Plain::Number(x), Plain::Number(y)) => numbers_eq(x, y),
        (Plain::Array(xs), Plain::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| loose_eq(x, y))
        }
        (Plain::Object(xs), Plain::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| loose_eq(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_eq(x: &Number, y: &Number) -> bool {
    if x.is_f64() || y.is_f64() {
        return x.as_f64() == y.as_f64();
    }
    match (x.as_i64(), y.as_i64()) {
        (Some(a), Some(b)) => a == b,
        _ => x.as_u64().is_some() && x.as_u64() == y.as_u64(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Operation, Statement};
    use crate::pass2_unwind::unwind;

    fn p(keys: &[&str]) -> Path {
        keys.iter().map(|k| k.to_string()).collect()
    }

    fn state_after(ops: Vec<Operation>) -> Result<ReadState, ReadError> {
        let mut state = ReadState::new();
        for entry in unwind(ops.into_iter().map(Statement::new).collect()) {
            state.apply(entry)?;
        }
        Ok(state)
    }

    fn assign(keys: &[&str], value: Value) -> Operation {
        Operation::Assign {
            path: p(keys),
            value,
        }
    }

    fn rule(kind: ConstraintKind, keys: &[&str], value: Option<Value>) -> Operation {
        Operation::Constraint(Constraint {
            kind,
            path: p(keys),
            value,
        })
    }

    fn int(n: i64) -> Value {
        Value::Number(n.into())
    }

    #[test]
    fn writes_build_nested_stores() {
        let state = state_after(vec![
            assign(&["car", "color"], Value::String("red".into())),
            assign(&["car", "wheels"], int(4)),
        ])
        .unwrap();
        let (value, warnings) = state.finish();
        assert_eq!(value, json!({ "car": { "color": "red", "wheels": 4 } }));
        assert!(warnings.is_empty());
    }

    #[test]
    fn writing_through_a_scalar_is_structural() {
        let err = state_after(vec![
            assign(&["a"], int(1)),
            assign(&["a", "b"], int(2)),
        ])
        .unwrap_err();
        assert_eq!(err, structural(&p(&["a", "b"]), "a"));
    }

    #[test]
    fn scattered_numeric_writes_become_an_array() {
        let state = state_after(vec![
            assign(&["xs", "1"], int(20)),
            assign(&["xs"], Value::Array(vec![int(10)])),
        ])
        .unwrap();
        assert_eq!(state.finish().0, json!({ "xs": [10, 20] }));
    }

    #[test]
    fn a_named_key_keeps_a_store_an_object() {
        let state = state_after(vec![
            assign(&["xs", "name"], int(1)),
            assign(&["xs"], Value::Array(vec![int(10)])),
        ])
        .unwrap();
        assert_eq!(state.finish().0, json!({ "xs": { "name": 1, "0": 10 } }));
    }

    #[test]
    fn cant_be_rejects_equal_values_only() {
        let ops = |value| {
            vec![
                rule(ConstraintKind::CantBe, &["x"], Some(int(5))),
                assign(&["x"], value),
            ]
        };
        assert!(state_after(ops(int(6))).is_ok());
        let err = state_after(ops(Value::Number(Number::from_f64(5.0).unwrap()))).unwrap_err();
        assert!(matches!(
            err,
            ReadError::ConstraintViolation { rule: ConstraintKind::CantBe, .. }
        ));
    }

    #[test]
    fn cant_exist_covers_descendants() {
        let err = state_after(vec![
            rule(ConstraintKind::CantExist, &["car"], None),
            assign(&["car", "color"], Value::String("red".into())),
        ])
        .unwrap_err();
        match err {
            ReadError::ConstraintViolation { path, offered, .. } => {
                assert_eq!(path, p(&["car"]));
                assert_eq!(offered, json!("red"));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn has_to_be_follows_the_required_shape() {
        let required = Value::Object(vec![(p(&["color"]), Value::String("red".into()))]);
        let base = || rule(ConstraintKind::HasToBe, &["car"], Some(required.clone()));

        assert!(state_after(vec![
            base(),
            assign(&["car", "color"], Value::String("red".into())),
        ])
        .is_ok());
        assert!(state_after(vec![base(), assign(&["car"], Value::Object(vec![]))]).is_err());
        assert!(state_after(vec![
            base(),
            assign(&["car", "color"], Value::String("blue".into())),
        ])
        .is_err());
        assert!(state_after(vec![base(), assign(&["car", "size"], int(1))]).is_err());
        assert!(state_after(vec![base(), assign(&["car"], int(1))]).is_err());
    }

    #[test]
    fn composites_are_compared_whole_at_the_constrained_path() {
        let one = || Value::Array(vec![int(1)]);
        let err = state_after(vec![
            rule(ConstraintKind::CantBe, &["x"], Some(one())),
            assign(&["x"], one()),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ReadError::ConstraintViolation {
                path: p(&["x"]),
                rule: ConstraintKind::CantBe,
                offered: json!([1]),
                required: Some(json!([1])),
            }
        );

        let both = Value::Array(vec![int(1), int(2)]);
        let err = state_after(vec![
            rule(ConstraintKind::HasToBe, &["x"], Some(both.clone())),
            assign(&["x"], one()),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            ReadError::ConstraintViolation { rule: ConstraintKind::HasToBe, .. }
        ));
        assert!(state_after(vec![
            rule(ConstraintKind::HasToBe, &["x"], Some(both.clone())),
            assign(&["x"], both),
        ])
        .is_ok());

        let pair = |key: &str| (p(&[key]), int(1));
        let err = state_after(vec![
            rule(
                ConstraintKind::HasToBe,
                &["x"],
                Some(Value::Object(vec![pair("a"), pair("b")])),
            ),
            assign(&["x"], Value::Object(vec![pair("a")])),
        ])
        .unwrap_err();
        assert!(matches!(err, ReadError::ConstraintViolation { .. }));
    }

    #[test]
    fn cant_be_leaves_other_composites_alone() {
        let state = state_after(vec![
            rule(ConstraintKind::CantBe, &["x"], Some(Value::Array(vec![int(1)]))),
            assign(&["x"], Value::Array(vec![int(2)])),
        ])
        .unwrap();
        assert_eq!(state.finish().0, json!({ "x": [2] }));
    }

    #[test]
    fn empty_composites_replace_a_scalar() {
        let state = state_after(vec![
            assign(&["x"], int(1)),
            assign(&["x"], Value::Object(vec![])),
            assign(&["y"], int(2)),
            assign(&["y"], Value::Array(vec![])),
        ])
        .unwrap();
        assert_eq!(state.finish().0, json!({ "x": {}, "y": [] }));
    }

    #[test]
    fn late_constraints_warn_and_keep_the_value() {
        let state = state_after(vec![
            assign(&["x"], int(5)),
            rule(ConstraintKind::CantBe, &["x"], Some(int(5))),
        ])
        .unwrap();
        let (value, warnings) = state.finish();
        assert_eq!(value, json!({ "x": 5 }));
        assert_eq!(
            warnings,
            vec![Warning::ConstraintConflict {
                path: p(&["x"]),
                rule: ConstraintKind::CantBe,
                existing: json!(5),
            }]
        );
    }

    #[test]
    fn loose_equality() {
        assert!(loose_eq(&json!(5), &json!(5.0)));
        assert!(loose_eq(&json!({ "a": 1, "b": 2 }), &json!({ "b": 2, "a": 1.0 })));
        assert!(!loose_eq(&json!([1, 2]), &json!([2, 1])));
        assert!(!loose_eq(&json!(-1), &json!(u64::MAX)));
        assert!(loose_eq(&json!(u64::MAX), &json!(u64::MAX)));
    }
}
