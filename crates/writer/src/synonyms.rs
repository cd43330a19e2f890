//! Interchangeable spellings, one pool per keyword class.

use rand::seq::SliceRandom;
use rand::Rng;

pub const HAVE: &[&str] = &["have", "has", "'ve"];
pub const THAT: &[&str] = &["that", "this", "these", "those"];
/// Includes the separator before the word, since the contracted forms attach
/// straight to the key.
pub const IS: &[&str] = &[" is", " are", "'s", "'re", " do", " does", " be"];
pub const TRUE: &[&str] = &["true", "falsen't"];
pub const FALSE: &[&str] = &["false", "truen't"];
pub const NULL: &[&str] = &["haven't", "hasn't", "'ven't"];

/// Uniform pick from a pool.
pub fn pick<R: Rng + ?Sized>(pool: &[&'static str], rng: &mut R) -> &'static str {
    pool.choose(rng).copied().unwrap_or_default()
}
