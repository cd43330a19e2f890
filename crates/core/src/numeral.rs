//! Numeral decoding.
//!
//! The lexer only classifies numerals; turning their text into a number is
//! done here, through a [`Numerals`] table the caller can override per read.

use serde_json::Number;
use std::fmt;

/// Decodes the full text of a numeral literal, prefix and `_` separators
/// included, into a number. The error string becomes a syntax error message.
pub type NumeralFn = fn(&str) -> Result<Number, String>;

/// The four numeral decoders used by a read.
#[derive(Clone, Copy)]
pub struct Numerals {
    /// Literals with a `.` or an exponent: `1.5`, `.5`, `2e10`.
    pub float: NumeralFn,
    /// Plain decimal digit runs: `36`, `1_000`.
    pub int: NumeralFn,
    /// `0r` literals: `0rXIV`.
    pub roman: NumeralFn,
    /// `0b`, `0o`, `0d`, `0z`, `0x`, `0v` and `0u` literals.
    pub based: NumeralFn,
}

impl Default for Numerals {
    fn default() -> Self {
        Numerals {
            float: parse_float,
            int: parse_int,
            roman: parse_roman,
            based: parse_based,
        }
    }
}

impl fmt::Debug for Numerals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Numerals").finish_non_exhaustive()
    }
}

fn strip_separators(text: &str) -> String {
    text.chars().filter(|c| *c != '_').collect()
}

fn integer(digits: &str, radix: u32, text: &str) -> Result<Number, String> {
    if let Ok(n) = i64::from_str_radix(digits, radix) {
        return Ok(Number::from(n));
    }
    u64::from_str_radix(digits, radix)
        .map(Number::from)
        .map_err(|_| format!("integer literal '{}' is out of range", text))
}

pub fn parse_int(text: &str) -> Result<Number, String> {
    integer(&strip_separators(text), 10, text)
}

pub fn parse_float(text: &str) -> Result<Number, String> {
    let value: f64 = strip_separators(text)
        .parse()
        .map_err(|_| format!("invalid float literal '{}'", text))?;
    Number::from_f64(value).ok_or_else(|| format!("float literal '{}' is out of range", text))
}

fn roman_digit(c: char) -> Option<i64> {
    Some(match c.to_ascii_uppercase() {
        'I' => 1,
        'V' => 5,
        'X' => 10,
        'L' => 50,
        'C' => 100,
        'D' => 500,
        'M' => 1000,
        _ => return None,
    })
}

/// Subtractive roman decoding over runs of equal digits: a run is subtracted
/// when the digit after it is worth more than the whole run.
pub fn parse_roman(text: &str) -> Result<Number, String> {
    let digits = text.get(2..).unwrap_or_default();
    if digits.is_empty() {
        return Err(format!("roman literal '{}' has no digits", text));
    }
    let overflow = || format!("roman literal '{}' is out of range", text);

    let mut total: i64 = 0;
    let (mut run_digit, mut run_len): (i64, i64) = (0, 0);
    for c in digits.chars() {
        let value = roman_digit(c).ok_or_else(|| format!("invalid roman digit '{}'", c))?;
        if value == run_digit {
            run_len += 1;
            continue;
        }
        let run = run_digit.checked_mul(run_len).ok_or_else(overflow)?;
        total = if value > run {
            total.checked_sub(run)
        } else {
            total.checked_add(run)
        }
        .ok_or_else(overflow)?;
        run_digit = value;
        run_len = 1;
    }
    let run = run_digit.checked_mul(run_len).ok_or_else(overflow)?;
    total.checked_add(run).map(Number::from).ok_or_else(overflow)
}

pub fn parse_based(text: &str) -> Result<Number, String> {
    let mut chars = text.chars();
    let prefix = match (chars.next(), chars.next()) {
        (Some('0'), Some(p)) => p.to_ascii_lowercase(),
        _ => return Err(format!("'{}' is not a prefixed numeral", text)),
    };
    let digits = strip_separators(chars.as_str());
    if digits.is_empty() {
        return Err(format!("numeral '{}' has no digits", text));
    }
    let radix = match prefix {
        'b' => 2,
        'o' => 8,
        'd' => 10,
        'z' => 12,
        'x' => 16,
        'v' => 20,
        'u' => {
            if let Some(bad) = digits.chars().find(|c| *c != '1') {
                return Err(format!("invalid digit '{}' in unary literal", bad));
            }
            return Ok(Number::from(digits.len() as u64));
        }
        other => return Err(format!("unknown numeral prefix '0{}'", other)),
    };
    integer(&digits, radix, text)
}

/// Negate a decoded number; `None` when the result does not fit.
pub fn negate(n: &Number) -> Option<Number> {
    if n.is_f64() {
        return n.as_f64().and_then(|f| Number::from_f64(-f));
    }
    if let Some(i) = n.as_i64() {
        return i.checked_neg().map(Number::from);
    }
    match n.as_u64() {
        Some(u) if u == i64::MIN.unsigned_abs() => Some(Number::from(i64::MIN)),
        _ => None,
    }
}
