//! Five-pass reader: WTFL text -> plain JSON value.
//!
//! A thin orchestrator that calls each pass module in order:
//! parse, unwind, order, apply, materialize.

use crate::error::{ReadError, Warning};
use crate::options::ReadOptions;
use crate::pass1_parse;
use crate::pass2_unwind;
use crate::pass3_order;
use crate::pass4_apply::ReadState;
use serde_json::Value;

/// A decoded document together with the warnings raised while reading it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub value: Value,
    pub warnings: Vec<Warning>,
}

/// A configured decoder. Holds nothing but its options, so one reader can
/// be shared freely.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reader {
    options: ReadOptions,
}

impl Reader {
    pub fn new(options: ReadOptions) -> Self {
        Reader { options }
    }

    pub fn read(&self, src: &str) -> Result<Value, ReadError> {
        self.decode(src).map(|decoded| decoded.value)
    }

    /// Read `src`, returning the value and any warnings, or the first error.
    pub fn decode(&self, src: &str) -> Result<Decoded, ReadError> {
        // Pass 1: parse into statements
        let statements = pass1_parse::parse_statements(src, &self.options)?;

        // Pass 2: unwind composites into flat writes
        let entries = pass2_unwind::unwind(statements);

        // Pass 3: time-travel ordering
        let entries = pass3_order::order(entries);
        tracing::debug!(entries = entries.len(), "entries ordered");

        // Pass 4: apply to the store
        let mut state = ReadState::new();
        for entry in entries {
            state.apply(entry)?;
        }

        // Pass 5: materialize
        let (value, warnings) = state.finish();
        Ok(Decoded { value, warnings })
    }
}

/// Read a document with default options.
pub fn read(src: &str) -> Result<Value, ReadError> {
    Reader::default().read(src)
}

/// Read a document with the given options.
pub fn read_with(src: &str, options: ReadOptions) -> Result<Value, ReadError> {
    Reader::new(options).read(src)
}
