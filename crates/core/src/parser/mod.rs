//! Recursive-descent parser producing one [`Statement`] per sentence.
//!
//! The grammar is small but ambiguous in places (keywords double as key
//! names, `and` is both a joiner and a key), so the parser pulls tokens
//! lazily with unbounded lookahead and decides each production by peeking.
//! It must never peek past a closing `that`/`there`: the text after one is
//! free prose and is skipped by the lexer, not tokenized.
use crate::ast::{Operation, Statement};
use crate::error::ReadError;
use crate::lexer::{Keyword, Lexer, Mark, NumeralKind, Spanned, Token};
use crate::numeral::{negate, Numerals};
use serde_json::Number;
use std::collections::VecDeque;

mod statements;
mod values;

/// How many levels a key may sit below the document root, counting each
/// key segment and each enclosing composite.
pub const MAX_DEPTH: usize = 128;

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    lexer: Lexer<'a>,
    lookahead: VecDeque<Spanned>,
    numerals: Numerals,
    /// End of the most recently consumed token.
    last_end: Mark,
    /// Levels opened by the keys and composites being parsed.
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, numerals: Numerals) -> Self {
        Parser {
            lexer: Lexer::new(src),
            lookahead: VecDeque::new(),
            numerals,
            last_end: Mark {
                offset: 0,
                line: 1,
                column: 1,
            },
            depth: 0,
        }
    }

    /// The token `n` positions ahead. Past the end this is always `Eof`.
    fn peek(&mut self, n: usize) -> Result<&Spanned, ReadError> {
        while self.lookahead.len() <= n {
            if matches!(self.lookahead.back(), Some(t) if t.token == Token::Eof) {
                break;
            }
            let next = self.lexer.next_token()?;
            self.lookahead.push_back(next);
        }
        Ok(&self.lookahead[n.min(self.lookahead.len() - 1)])
    }

    fn advance(&mut self) -> Result<Spanned, ReadError> {
        self.peek(0)?;
        let token = match self.lookahead.pop_front() {
            Some(t) if t.token == Token::Eof => {
                self.lookahead.push_front(t.clone());
                t
            }
            Some(t) => t,
            None => return Err(self.lexer.error(self.last_end, "", "unexpected end of input")),
        };
        self.last_end = token.end;
        Ok(token)
    }

    fn keyword_at(&mut self, n: usize) -> Result<Option<Keyword>, ReadError> {
        Ok(match self.peek(n)?.token {
            Token::Keyword(k) => Some(k),
            _ => None,
        })
    }

    fn is_keyword(&mut self, n: usize, keyword: Keyword) -> Result<bool, ReadError> {
        Ok(self.keyword_at(n)? == Some(keyword))
    }

    fn is_closer(&mut self, n: usize) -> Result<bool, ReadError> {
        Ok(matches!(
            self.keyword_at(n)?,
            Some(Keyword::That | Keyword::There)
        ))
    }

    fn is_verb(&mut self, n: usize) -> Result<bool, ReadError> {
        Ok(self.keyword_at(n)?.is_some_and(Keyword::is_verb))
    }

    fn at_eof(&mut self) -> Result<bool, ReadError> {
        Ok(self.peek(0)?.token == Token::Eof)
    }

    /// Whether the token `n` ahead can start a value.
    fn starts_value(&mut self, n: usize) -> Result<bool, ReadError> {
        Ok(matches!(
            self.peek(n)?.token,
            Token::Str(_)
                | Token::Bool(_)
                | Token::Numeral(_)
                | Token::Minus
                | Token::Keyword(Keyword::Have | Keyword::Havent)
        ))
    }

    /// Consume joiners: `also`, `and also`, `but also`, and a bare `and`.
    /// When `and_may_name_key` is set, an `and` followed by a verb is left
    /// alone because it is the key of the next statement. Returns how many
    /// joiners were consumed.
    fn skip_joiners(&mut self, and_may_name_key: bool) -> Result<usize, ReadError> {
        let mut skipped = 0;
        loop {
            match self.keyword_at(0)? {
                Some(Keyword::Also) => {
                    self.advance()?;
                }
                Some(Keyword::And | Keyword::But) if self.is_keyword(1, Keyword::Also)? => {
                    self.advance()?;
                    self.advance()?;
                }
                Some(Keyword::And) if !(and_may_name_key && self.is_verb(1)?) => {
                    self.advance()?;
                }
                _ => return Ok(skipped),
            }
            skipped += 1;
        }
    }

    // -- Nesting ------------------------------------------------

    /// Run `f` with `levels` more levels open.
    fn nested<T>(
        &mut self,
        levels: usize,
        f: impl FnOnce(&mut Self) -> Result<T, ReadError>,
    ) -> Result<T, ReadError> {
        self.depth += levels;
        let out = f(self);
        self.depth -= levels;
        out
    }

    /// Fail at `token` if `levels` more levels would pass [`MAX_DEPTH`].
    fn check_depth(&self, levels: usize, token: &Spanned) -> Result<(), ReadError> {
        if self.depth + levels > MAX_DEPTH {
            return Err(self.err_at(
                token,
                format!("nested more than {} levels deep", MAX_DEPTH),
            ));
        }
        Ok(())
    }

    // -- Errors -------------------------------------------------

    fn err_at(&self, token: &Spanned, message: impl Into<String>) -> ReadError {
        let found = match token.token {
            Token::Eof => "end of input",
            _ => token.text.as_str(),
        };
        self.lexer.error(token.start, found, message)
    }

    /// Error at the next token: "expected X, found Y".
    fn expected(&mut self, what: &str) -> ReadError {
        match self.peek(0) {
            Ok(token) => {
                let token = token.clone();
                let found = match token.token {
                    Token::Eof => "end of input".to_owned(),
                    _ => format!("'{}'", token.text),
                };
                self.err_at(&token, format!("expected {}, found {}", what, found))
            }
            Err(e) => e,
        }
    }

    // -- Numerals -----------------------------------------------

    fn decode_numeral(&self, token: &Spanned, kind: NumeralKind) -> Result<Number, ReadError> {
        let decode = match kind {
            NumeralKind::Decimal => self.numerals.int,
            NumeralKind::Float => self.numerals.float,
            NumeralKind::Roman => self.numerals.roman,
            NumeralKind::Based(_) | NumeralKind::Unary => self.numerals.based,
        };
        decode(&token.text).map_err(|message| self.err_at(token, message))
    }

    /// A numeral with an optional leading minus.
    fn parse_number(&mut self) -> Result<Number, ReadError> {
        let minus = if self.peek(0)?.token == Token::Minus {
            Some(self.advance()?)
        } else {
            None
        };
        let token = self.advance()?;
        let Token::Numeral(kind) = token.token else {
            return Err(self.err_at(&token, "expected a number"));
        };
        let number = self.decode_numeral(&token, kind)?;
        match minus {
            None => Ok(number),
            Some(minus) => negate(&number).ok_or_else(|| {
                self.err_at(
                    &minus,
                    format!("-{} is out of range", token.text),
                )
            }),
        }
    }

    // -- Document -----------------------------------------------

    /// `also` joiners between statements surface as [`Operation::Separator`].
    fn parse_document(&mut self) -> Result<Vec<Statement>, ReadError> {
        let mut statements = Vec::new();
        loop {
            for _ in 0..self.skip_joiners(true)? {
                statements.push(Statement::new(Operation::Separator));
            }
            if self.at_eof()? {
                return Ok(statements);
            }
            statements.push(self.parse_statement()?);
        }
    }
}

/// Parse a whole document into statements, joiners included.
pub fn parse(src: &str, numerals: Numerals) -> Result<Vec<Statement>, ReadError> {
    let mut p = Parser::new(src, numerals);
    p.parse_document()
}
