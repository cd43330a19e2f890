use super::Parser;
use crate::ast::{Constraint, ConstraintKind, Operation, Path, Statement, Value};
use crate::error::ReadError;
use crate::lexer::{Keyword, NumeralKind, Token};

impl<'a> Parser<'a> {
    // -- Statements ---------------------------------------------

    pub(super) fn parse_statement(&mut self) -> Result<Statement, ReadError> {
        let mut offset = 0i64;
        while let Some(shift) = self.parse_travel()? {
            offset = offset.saturating_add(shift);
        }
        let op = self.parse_keyed()?;
        Ok(Statement { op, offset })
    }

    /// `return <n> and`, `skip <n> and`, `stay and`. Anything else starting
    /// with those words is an ordinary key.
    fn parse_travel(&mut self) -> Result<Option<i64>, ReadError> {
        let sign = match self.keyword_at(0)? {
            Some(Keyword::Stay) => {
                if !self.is_keyword(1, Keyword::And)? {
                    return Ok(None);
                }
                self.advance()?;
                self.advance()?;
                return Ok(Some(0));
            }
            Some(Keyword::Return) => -1,
            Some(Keyword::Skip) => 1,
            _ => return Ok(None),
        };
        let integer = matches!(
            self.peek(1)?.token,
            Token::Numeral(kind) if kind != NumeralKind::Float
        );
        if !integer || !self.is_keyword(2, Keyword::And)? {
            return Ok(None);
        }

        self.advance()?;
        let token = self.advance()?;
        let distance = match token.token {
            Token::Numeral(kind) => self.decode_numeral(&token, kind)?,
            _ => return Err(self.err_at(&token, "expected a distance")),
        };
        let distance = distance
            .as_i64()
            .filter(|d| *d >= 0)
            .ok_or_else(|| {
                self.err_at(
                    &token,
                    format!("time-travel distance {} must be an integer from 0 to {}", distance, i64::MAX),
                )
            })?;
        self.advance()?; // and
        Ok(Some(sign * distance))
    }

    fn parse_keyed(&mut self) -> Result<Operation, ReadError> {
        let path = self.parse_key()?;
        self.nested(path.len(), |p| p.parse_predicate(path))
    }

    /// Everything after the statement's key.
    fn parse_predicate(&mut self, path: Path) -> Result<Operation, ReadError> {
        let key_line = self.last_end.line;

        match self.keyword_at(0)? {
            Some(Keyword::Is) => {
                self.advance()?;
                let value = self.parse_value()?;
                Ok(Operation::Assign { path, value })
            }
            Some(Keyword::Can) => {
                self.advance()?;
                self.expect_is("can")?;
                self.parse_optional_value()?;
                Ok(Operation::Inert)
            }
            Some(Keyword::Cant) => {
                self.advance()?;
                self.expect_is("can't")?;
                let (kind, value) = match self.parse_optional_value()? {
                    Some(value) => (ConstraintKind::CantBe, Some(value)),
                    None => (ConstraintKind::CantExist, None),
                };
                Ok(Operation::Constraint(Constraint { kind, path, value }))
            }
            Some(Keyword::Have)
                if self.is_keyword(1, Keyword::To)? && self.is_keyword(2, Keyword::Is)? =>
            {
                self.advance()?;
                self.advance()?;
                self.advance()?;
                let value = self.parse_value()?;
                Ok(Operation::Constraint(Constraint {
                    kind: ConstraintKind::HasToBe,
                    path,
                    value: Some(value),
                }))
            }
            Some(Keyword::Have) if self.peek(0)?.start.line == key_line => {
                let value = self.parse_composite()?;
                Ok(Operation::Assign { path, value })
            }
            _ => Err(self.expected("'is', 'have', 'can' or 'can't' after the key")),
        }
    }

    fn expect_is(&mut self, after: &str) -> Result<(), ReadError> {
        if self.is_keyword(0, Keyword::Is)? {
            self.advance()?;
            Ok(())
        } else {
            Err(self.expected(&format!("'is' after '{}'", after)))
        }
    }

    /// The value of `can is V` / `can't is V`, which must start on the line
    /// of the `is`.
    fn parse_optional_value(&mut self) -> Result<Option<Value>, ReadError> {
        let line = self.last_end.line;
        if self.peek(0)?.start.line == line && self.starts_value(0)? {
            self.parse_value().map(Some)
        } else {
            Ok(None)
        }
    }

    // -- Keys ---------------------------------------------------

    /// `K1 of K2 of K3`, outermost container first in the result.
    pub(super) fn parse_key(&mut self) -> Result<Path, ReadError> {
        let start = self.peek(0)?.clone();
        let mut segments = vec![self.parse_segment()?];
        while self.is_keyword(0, Keyword::Of)? {
            self.advance()?;
            segments.push(self.parse_segment()?);
        }
        self.check_depth(segments.len(), &start)?;
        segments.reverse();
        Ok(segments)
    }

    fn parse_segment(&mut self) -> Result<String, ReadError> {
        while self.at_droppable_prefix(0)? {
            self.advance()?;
        }
        match self.peek(0)?.token.clone() {
            Token::Minus | Token::Numeral(_) => Ok(self.parse_number()?.to_string()),
            Token::Name(name) => {
                self.advance()?;
                Ok(name)
            }
            Token::Str(s) => {
                self.advance()?;
                Ok(s)
            }
            Token::Bool(b) => {
                self.advance()?;
                Ok(b.to_string())
            }
            Token::Keyword(Keyword::Havent) => {
                self.advance()?;
                Ok("null".to_owned())
            }
            Token::Keyword(k) if k.names_a_key() => Ok(self.advance()?.text),
            Token::Keyword(_) | Token::Eof => Err(self.expected("a key")),
        }
    }

    /// Whether the token `n` ahead can be a key segment on its own.
    pub(super) fn names_a_key(&mut self, n: usize) -> Result<bool, ReadError> {
        Ok(match self.peek(n)?.token {
            Token::Keyword(k) => k.names_a_key() || k == Keyword::Havent,
            Token::Eof => false,
            Token::Name(_) | Token::Str(_) | Token::Bool(_) | Token::Numeral(_) | Token::Minus => {
                true
            }
        })
    }

    /// An article (or `but`) in front of a key is dropped, unless it is the
    /// key itself: `the cat is 1` vs `a is 1`.
    pub(super) fn at_droppable_prefix(&mut self, n: usize) -> Result<bool, ReadError> {
        if !matches!(self.keyword_at(n)?, Some(Keyword::Prefix | Keyword::But)) {
            return Ok(false);
        }
        Ok(self.names_a_key(n + 1)? && !self.is_verb(n + 1)?)
    }
}
