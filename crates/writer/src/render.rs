//! Recursive rendering of a value tree.
//!
//! Layout: top-level entries separated by a blank line; composites open with
//! `have` at the end of their line, list one entry or element per line
//! indented two spaces, and close with `that is all` on a line of their own.
//! One item per line is what keeps the output unambiguous: `have 0` followed
//! by a newline is always the empty array, and a `have` on the line after a
//! key is never read as `key have ...`.

use crate::synonyms::{self, pick};
use rand::Rng;
use serde_json::{Map, Value};

pub(crate) struct Renderer<'r, R: Rng + ?Sized> {
    rng: &'r mut R,
}

impl<'r, R: Rng + ?Sized> Renderer<'r, R> {
    pub(crate) fn new(rng: &'r mut R) -> Self {
        Renderer { rng }
    }

    fn pick(&mut self, pool: &[&'static str]) -> &'static str {
        pick(pool, self.rng)
    }

    pub(crate) fn document(&mut self, map: &Map<String, Value>) -> String {
        self.entries(map).join("\n\n")
    }

    fn entries(&mut self, map: &Map<String, Value>) -> Vec<String> {
        map.iter()
            .map(|(key, value)| {
                let is = self.pick(synonyms::IS);
                format!("{}{} {}", quote(key), is, self.value(value))
            })
            .collect()
    }

    fn value(&mut self, value: &Value) -> String {
        match value {
            Value::Null => self.pick(synonyms::NULL).to_owned(),
            Value::Bool(true) => self.pick(synonyms::TRUE).to_owned(),
            Value::Bool(false) => self.pick(synonyms::FALSE).to_owned(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => quote(s),
            Value::Array(items) if items.is_empty() => format!("{} 0", self.pick(synonyms::HAVE)),
            Value::Array(items) => {
                let have = self.pick(synonyms::HAVE);
                let lines: Vec<String> = items.iter().map(|item| self.value(item)).collect();
                format!("{}\n{}\n{}", have, indent(&lines.join("\n")), self.tail())
            }
            Value::Object(map) if map.is_empty() => {
                format!("{}\n{}", self.pick(synonyms::HAVE), self.tail())
            }
            Value::Object(map) => {
                let have = self.pick(synonyms::HAVE);
                let lines = self.entries(map);
                format!("{}\n{}\n{}", have, indent(&lines.join("\n")), self.tail())
            }
        }
    }

    /// `that is all`, in one of its many spellings.
    fn tail(&mut self) -> String {
        let that = self.pick(synonyms::THAT);
        let is = self.pick(synonyms::IS);
        format!("{}{} all", that, is)
    }
}

fn quote(s: &str) -> String {
    Value::String(s.to_owned()).to_string()
}

fn indent(text: &str) -> String {
    format!("  {}", text.replace('\n', "\n  "))
}
