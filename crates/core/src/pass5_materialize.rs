//! Pass 5: Turn the store tree into a plain value.

use crate::ast::Path;
use crate::error::Warning;
use crate::store::{index_of, Node, Store};
use serde_json::{Map, Value};

/// Materialize `store`, found at `path`. Array holes are reported into
/// `warnings`, once per array.
pub fn materialize(store: &Store, path: &mut Path, warnings: &mut Vec<Warning>) -> Value {
    if store.is_array() {
        return materialize_array(store, path, warnings);
    }
    let mut map = Map::new();
    for (key, node) in store.iter() {
        path.push(key.to_owned());
        map.insert(key.to_owned(), materialize_node(node, path, warnings));
        path.pop();
    }
    Value::Object(map)
}

pub fn materialize_node(node: &Node, path: &mut Path, warnings: &mut Vec<Warning>) -> Value {
    match node {
        Node::Scalar(value) => value.clone(),
        Node::Store(store) => materialize(store, path, warnings),
    }
}

fn materialize_array(store: &Store, path: &mut Path, warnings: &mut Vec<Warning>) -> Value {
    let mut items: Vec<(i64, &str, &Node)> = store
        .iter()
        .filter_map(|(key, node)| index_of(key).map(|i| (i, key, node)))
        .filter(|(i, _, _)| *i >= 0)
        .collect();
    items.sort_by_key(|(i, _, _)| *i);

    let mut next = 0;
    let mut holes = false;
    let mut out = Vec::with_capacity(items.len());
    for (i, key, node) in items {
        holes |= i > next;
        next = next.max(i.saturating_add(1));
        path.push(key.to_owned());
        out.push(materialize_node(node, path, warnings));
        path.pop();
    }
    if holes {
        warnings.push(Warning::ArrayHoles { path: path.clone() });
    }
    Value::Array(out)
}
