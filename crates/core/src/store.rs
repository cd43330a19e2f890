//! The mutable tree writes are folded into.
//!
//! A [`Store`] does not know whether it is an object or an array until it
//! is materialized: it becomes an array only if it received the array
//! marker and every key written into it so far looks like an index.

use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Value),
    Store(Store),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    fields: Vec<(String, Node)>,
    index: HashMap<String, usize>,
    eligible_for_array: bool,
    is_array: bool,
}

impl Default for Store {
    fn default() -> Self {
        Store {
            fields: Vec::new(),
            index: HashMap::new(),
            eligible_for_array: true,
            is_array: false,
        }
    }
}

/// An optionally negative run of ASCII digits that fits an `i64`.
pub fn is_index_key(key: &str) -> bool {
    index_of(key).is_some()
}

pub(crate) fn index_of(key: &str) -> Option<i64> {
    let digits = key.strip_prefix('-').unwrap_or(key);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    key.parse().ok()
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.index.get(key).map(|&i| &self.fields[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        let i = *self.index.get(key)?;
        Some(&mut self.fields[i].1)
    }

    /// Write `node` under `key`, replacing any previous value in place. A key
    /// that is not an index rules out array mode for good.
    pub fn insert(&mut self, key: &str, node: Node) {
        if !is_index_key(key) {
            self.eligible_for_array = false;
            self.is_array = false;
        }
        match self.index.get(key) {
            Some(&i) => self.fields[i].1 = node,
            None => {
                self.index.insert(key.to_owned(), self.fields.len());
                self.fields.push((key.to_owned(), node));
            }
        }
    }

    /// The child store under `key`, created empty if absent. `None` when the
    /// key holds a scalar.
    pub fn child_mut(&mut self, key: &str) -> Option<&mut Store> {
        if self.get(key).is_none() {
            self.insert(key, Node::Store(Store::new()));
        }
        match self.get_mut(key) {
            Some(Node::Store(store)) => Some(store),
            _ => None,
        }
    }

    /// Like [`Store::child_mut`], but a scalar under `key` is replaced by an
    /// empty store first.
    pub fn container_mut(&mut self, key: &str) -> Option<&mut Store> {
        if let Some(Node::Scalar(_)) = self.get(key) {
            self.insert(key, Node::Store(Store::new()));
        }
        self.child_mut(key)
    }

    /// React to the array marker. Ignored once the store is ineligible.
    pub fn mark_array(&mut self) {
        if self.eligible_for_array {
            self.is_array = true;
        }
    }

    pub fn is_array(&self) -> bool {
        self.is_array
    }

    pub fn is_eligible_for_array(&self) -> bool {
        self.eligible_for_array
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.fields.iter().map(|(k, n)| (k.as_str(), n))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn index_keys() {
        assert!(is_index_key("0"));
        assert!(is_index_key("-3"));
        assert!(is_index_key("007"));
        assert!(!is_index_key(""));
        assert!(!is_index_key("-"));
        assert!(!is_index_key("+1"));
        assert!(!is_index_key("1.5"));
        assert!(!is_index_key("99999999999999999999"));
        assert!(!is_index_key("x"));
    }

    #[test]
    fn marker_needs_eligibility() {
        let mut store = Store::new();
        store.insert("0", Node::Scalar(json!(1)));
        store.mark_array();
        assert!(store.is_array());

        store.insert("name", Node::Scalar(json!("x")));
        assert!(!store.is_array());
        store.insert("1", Node::Scalar(json!(2)));
        store.mark_array();
        assert!(!store.is_array());
        assert!(!store.is_eligible_for_array());
    }

    #[test]
    fn overwrite_keeps_position() {
        let mut store = Store::new();
        store.insert("a", Node::Scalar(json!(1)));
        store.insert("b", Node::Scalar(json!(2)));
        store.insert("a", Node::Scalar(json!(3)));
        let keys: Vec<&str> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(store.get("a"), Some(&Node::Scalar(json!(3))));
    }

    #[test]
    fn child_mut_refuses_scalars() {
        let mut store = Store::new();
        store.insert("a", Node::Scalar(json!(1)));
        assert!(store.child_mut("a").is_none());
        assert!(store.child_mut("b").is_some_and(|s| s.is_empty()));
    }

    #[test]
    fn container_mut_replaces_scalars_in_place() {
        let mut store = Store::new();
        store.insert("a", Node::Scalar(json!(1)));
        store.insert("b", Node::Scalar(json!(2)));
        assert!(store.container_mut("a").is_some_and(|s| s.is_empty()));
        let keys: Vec<&str> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(store.get("a"), Some(&Node::Store(Store::new())));
    }
}
