#![allow(clippy::result_large_err)]
//! wtfl-core: WTFL decoder.
//!
//! Reads WTFL documents (`age is 36`, `hobbies have "chess" also "tea"
//! that`) into plain `serde_json` values through a five-pass pipeline.
//!
//! # Public API
//!
//! - [`read()`] / [`read_with()`] -- decode a document
//! - [`Reader`] -- a configured decoder; [`Reader::decode`] also returns warnings
//! - [`ReadOptions`], [`Numerals`], [`CaseMode`] -- per-read configuration
//! - [`ReadError`], [`Warning`] -- failures and non-fatal findings
//!
//! Individual passes are public for selective pipeline execution.

pub mod ast;
pub mod error;
pub mod lexer;
pub mod numeral;
pub mod options;
pub mod parser;
pub mod pass1_parse;
pub mod pass2_unwind;
pub mod pass3_order;
pub mod pass4_apply;
pub mod pass5_materialize;
pub mod read;
pub mod store;

// ── Convenience re-exports: key types ────────────────────────────────

pub use ast::{ConstraintKind, Path};
pub use error::{ReadError, Warning};
pub use numeral::{NumeralFn, Numerals};
pub use options::{CaseMode, ReadOptions};
pub use read::{Decoded, Reader};

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use read::{read, read_with};
