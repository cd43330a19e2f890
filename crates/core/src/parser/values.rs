use super::Parser;
use crate::ast::{Path, Value};
use crate::error::ReadError;
use crate::lexer::{Keyword, NumeralKind, Spanned, Token};

impl<'a> Parser<'a> {
    // -- Values -------------------------------------------------

    pub(super) fn parse_value(&mut self) -> Result<Value, ReadError> {
        match self.peek(0)?.token.clone() {
            Token::Str(s) => {
                self.advance()?;
                Ok(Value::String(s))
            }
            Token::Bool(b) => {
                self.advance()?;
                Ok(Value::Bool(b))
            }
            Token::Keyword(Keyword::Havent) => {
                self.advance()?;
                Ok(Value::Null)
            }
            Token::Minus | Token::Numeral(_) => self.parse_number().map(Value::Number),
            Token::Keyword(Keyword::Have) => self.parse_composite(),
            _ => Err(self.expected("a value")),
        }
    }

    /// `have ... that`, positioned at the `have`.
    pub(super) fn parse_composite(&mut self) -> Result<Value, ReadError> {
        let have = self.advance()?;
        self.check_depth(1, &have)?;
        self.nested(1, |p| p.parse_composite_body(&have))
    }

    fn parse_composite_body(&mut self, have: &Spanned) -> Result<Value, ReadError> {
        if self.at_empty_array(have)? {
            let zero = self.advance()?;
            if self.is_closer(0)? && self.peek(0)?.start.line == zero.end.line {
                self.close_composite()?;
            }
            return Ok(Value::Array(Vec::new()));
        }

        self.skip_joiners(true)?;
        if self.is_closer(0)? {
            self.close_composite()?;
            return Ok(Value::Object(Vec::new()));
        }
        if self.looks_like_pair()? {
            self.parse_pairs(have).map(Value::Object)
        } else {
            self.parse_elements(have).map(Value::Array)
        }
    }

    /// `have 0` on one line, with no further value after the `0` on that line.
    fn at_empty_array(&mut self, have: &Spanned) -> Result<bool, ReadError> {
        let zero = self.peek(0)?;
        if zero.token != Token::Numeral(NumeralKind::Decimal)
            || zero.text != "0"
            || zero.start.line != have.end.line
        {
            return Ok(false);
        }
        let line = zero.end.line;
        Ok(!(self.peek(1)?.start.line == line && self.starts_value(1)?))
    }

    /// Scan ahead over `[prefix] segment (of segment)*` and report whether
    /// the composite opens with a `key is value` pair. Stops at a closer.
    fn looks_like_pair(&mut self) -> Result<bool, ReadError> {
        let mut i = 0;
        loop {
            if self.at_droppable_prefix(i)? {
                i += 1;
            }
            if self.is_closer(i)? || !self.names_a_key(i)? {
                return Ok(false);
            }
            if self.peek(i)?.token == Token::Minus {
                i += 1;
            }
            i += 1;
            if !self.is_keyword(i, Keyword::Of)? {
                break;
            }
            i += 1;
        }
        let key_line = self.peek(i - 1)?.end.line;
        Ok(match self.keyword_at(i)? {
            Some(Keyword::Is) => true,
            Some(Keyword::Have) => self.peek(i)?.start.line == key_line,
            _ => false,
        })
    }

    fn parse_pairs(&mut self, have: &Spanned) -> Result<Vec<(Path, Value)>, ReadError> {
        let mut pairs = Vec::new();
        loop {
            self.skip_joiners(true)?;
            if self.is_closer(0)? {
                self.close_composite()?;
                return Ok(pairs);
            }
            if self.at_eof()? {
                return Err(self.unclosed(have));
            }
            let key = self.parse_key()?;
            let key_line = self.last_end.line;
            let value = self.nested(key.len(), |p| match p.keyword_at(0)? {
                Some(Keyword::Is) => {
                    p.advance()?;
                    p.parse_value()
                }
                Some(Keyword::Have) if p.peek(0)?.start.line == key_line => p.parse_composite(),
                _ => Err(p.expected("'is' after the key")),
            })?;
            pairs.push((key, value));
        }
    }

    fn parse_elements(&mut self, have: &Spanned) -> Result<Vec<Value>, ReadError> {
        let mut items = Vec::new();
        loop {
            self.skip_joiners(false)?;
            if self.is_closer(0)? {
                self.close_composite()?;
                return Ok(items);
            }
            if self.at_eof()? {
                return Err(self.unclosed(have));
            }
            items.push(self.parse_value()?);
        }
    }

    fn unclosed(&mut self, have: &Spanned) -> ReadError {
        self.expected(&format!(
            "'that' closing the '{}' at line {}, column {}",
            have.text, have.start.line, have.start.column
        ))
    }

    /// Consume the closing `that`/`there` and skip the free text after it.
    fn close_composite(&mut self) -> Result<(), ReadError> {
        let closer = self.advance()?;
        self.lookahead.clear();
        self.lexer.rewind(closer.end);
        self.lexer.skip_tail();
        Ok(())
    }
}
