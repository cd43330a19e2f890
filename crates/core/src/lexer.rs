//! Lexer: keywords, names, strings and numerals.
//!
//! Tokens are produced on demand rather than all at once, because the text
//! following a closing `that`/`there` is free prose up to the end of the
//! line (or the next `also`) and is skipped with [`Lexer::skip_tail`]
//! instead of being tokenized.

use crate::error::{syntax_error, ReadError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    And,
    But,
    Also,
    Is,
    Isnt,
    Of,
    That,
    There,
    Have,
    Havent,
    Can,
    Cant,
    Return,
    Skip,
    Stay,
    To,
    /// Ignorable article in front of a key: a, an, the, de, du, le, la, des, les, um.
    Prefix,
}

impl Keyword {
    /// Look up an already lowercased spelling.
    pub fn lookup(lower: &str) -> Option<Keyword> {
        let keyword = match lower {
            "and" => Keyword::And,
            "but" => Keyword::But,
            "also" => Keyword::Also,
            "is" | "are" | "'s" | "'re" | "do" | "does" | "be" => Keyword::Is,
            "isn't" | "aren't" | "'sn't" | "'ren't" => Keyword::Isnt,
            "of" => Keyword::Of,
            "that" | "this" | "these" | "those" => Keyword::That,
            "there" => Keyword::There,
            "have" | "has" | "'ve" => Keyword::Have,
            "haven't" | "hasn't" | "'ven't" => Keyword::Havent,
            "can" => Keyword::Can,
            "cannot" | "can't" => Keyword::Cant,
            "return" => Keyword::Return,
            "skip" => Keyword::Skip,
            "stay" => Keyword::Stay,
            "to" => Keyword::To,
            "a" | "an" | "the" | "de" | "du" | "le" | "la" | "des" | "les" | "um" => {
                Keyword::Prefix
            }
            _ => return None,
        };
        Some(keyword)
    }

    /// Whether the keyword may be used as a key name. `also` never can;
    /// `haven't` is a null atom, which names a key through its own rule.
    pub fn names_a_key(self) -> bool {
        !matches!(self, Keyword::Also | Keyword::Havent)
    }

    /// Keywords that continue a statement after its key.
    pub fn is_verb(self) -> bool {
        matches!(
            self,
            Keyword::Is | Keyword::Of | Keyword::Have | Keyword::Can | Keyword::Cant
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumeralKind {
    /// Plain decimal digits.
    Decimal,
    /// Decimal with a `.` or an exponent.
    Float,
    /// `0b`, `0o`, `0d`, `0z`, `0x`, `0v` with their radix.
    Based(u32),
    /// `0u`
    Unary,
    /// `0r`
    Roman,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier that is not a keyword.
    Name(String),
    Keyword(Keyword),
    /// Already decoded: `truen't` is `Bool(false)`.
    Bool(bool),
    /// String literal content with escapes resolved.
    Str(String),
    /// Numeral literal; the text lives in [`Spanned::text`] and is decoded by the parser.
    Numeral(NumeralKind),
    Minus,
    Eof,
}

/// A position in the source. `offset` counts chars; line and column are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    /// The token as written.
    pub text: String,
    pub start: Mark,
    pub end: Mark,
}

fn is_word_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || c == '\''
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '\''
}

/// Keyword or boolean for a lowercased word.
fn keyword_token(lower: &str) -> Option<Token> {
    match lower {
        "true" | "falsen't" => Some(Token::Bool(true)),
        "false" | "truen't" => Some(Token::Bool(false)),
        _ => Keyword::lookup(lower).map(Token::Keyword),
    }
}

/// `_` separators must sit between two digits.
fn separators_ok(digits: &str, is_digit: impl Fn(char) -> bool) -> bool {
    let chars: Vec<char> = digits.chars().collect();
    chars.iter().enumerate().all(|(i, c)| {
        *c != '_'
            || (i > 0
                && chars.get(i + 1).is_some_and(|n| is_digit(*n))
                && is_digit(chars[i - 1]))
    })
}

pub struct Lexer<'a> {
    src: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    /// Second half of a split contraction (`age's` lexes as `age` + `'s`).
    pending: Option<Spanned>,
}

impl<'a> Lexer<'a> {
    pub fn new(src: &'a str) -> Self {
        Lexer {
            src,
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            pending: None,
        }
    }

    pub fn error(&self, at: Mark, found: &str, message: impl Into<String>) -> ReadError {
        syntax_error(self.src, at.line, at.column, found, message)
    }

    fn mark(&self) -> Mark {
        Mark {
            offset: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn peek_char(&self, n: usize) -> Option<char> {
        self.chars.get(self.pos + n).copied()
    }

    fn digit_at(&self, n: usize) -> bool {
        self.peek_char(n).is_some_and(|c| c.is_ascii_digit())
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_char(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn text_since(&self, start: Mark) -> String {
        self.chars[start.offset..self.pos].iter().collect()
    }

    /// Move back to `mark`, dropping anything buffered.
    pub fn rewind(&mut self, mark: Mark) {
        self.pos = mark.offset;
        self.line = mark.line;
        self.column = mark.column;
        self.pending = None;
    }

    /// Skip the free text after a closing `that`/`there`: everything up to
    /// the end of the line or the next `also`, whichever comes first.
    pub fn skip_tail(&mut self) {
        self.pending = None;
        while let Some(c) = self.peek_char(0) {
            if c == '\n' || self.at_also() {
                break;
            }
            self.bump();
        }
    }

    fn at_also(&self) -> bool {
        let boundary_before = self.pos == 0 || !is_word_char(self.chars[self.pos - 1]);
        boundary_before
            && "also"
                .chars()
                .enumerate()
                .all(|(i, want)| self.peek_char(i).map(|c| c.to_ascii_lowercase()) == Some(want))
            && !self.peek_char(4).is_some_and(is_word_char)
    }

    /// Whitespace and `...` comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.peek_char(0) {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('.') if self.peek_char(1) == Some('.') && self.peek_char(2) == Some('.') => {
                    while self.peek_char(0).is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                _ => return,
            }
        }
    }

    pub fn next_token(&mut self) -> Result<Spanned, ReadError> {
        if let Some(token) = self.pending.take() {
            return Ok(token);
        }
        self.skip_trivia();
        let start = self.mark();

        let Some(c) = self.peek_char(0) else {
            return Ok(Spanned {
                token: Token::Eof,
                text: String::new(),
                start,
                end: start,
            });
        };
        if c == '"' {
            return self.lex_string(start);
        }
        if c.is_ascii_digit() || (c == '.' && self.digit_at(1)) {
            return self.lex_numeral(start);
        }
        if c == '-' && (self.digit_at(1) || (self.peek_char(1) == Some('.') && self.digit_at(2))) {
            self.bump();
            return Ok(Spanned {
                token: Token::Minus,
                text: "-".to_owned(),
                start,
                end: self.mark(),
            });
        }
        if is_word_start(c) {
            return self.lex_word(start);
        }
        Err(self.error(start, &c.to_string(), format!("unexpected character '{}'", c)))
    }

    fn lex_word(&mut self, start: Mark) -> Result<Spanned, ReadError> {
        while self.peek_char(0).is_some_and(is_word_char) {
            self.bump();
        }
        let text = self.text_since(start);
        let end = self.mark();

        if let Some(token) = keyword_token(&text.to_ascii_lowercase()) {
            return Ok(Spanned {
                token,
                text,
                start,
                end,
            });
        }

        let split = match text.find('\'') {
            None => {
                return Ok(Spanned {
                    token: Token::Name(text.clone()),
                    text,
                    start,
                    end,
                })
            }
            Some(0) => {
                return Err(self.error(start, &text, format!("unknown contraction '{}'", text)))
            }
            Some(split) => split,
        };

        // Word characters are ASCII, so the byte index is also the char count.
        let middle = Mark {
            offset: start.offset + split,
            line: start.line,
            column: start.column + split as u32,
        };
        let (head, tail) = text.split_at(split);
        let tail_token = match keyword_token(&tail.to_ascii_lowercase()) {
            Some(
                token @ Token::Keyword(
                    Keyword::Is | Keyword::Isnt | Keyword::Have | Keyword::Havent,
                ),
            ) => token,
            _ => {
                return Err(self.error(middle, tail, format!("unknown contraction '{}'", tail)))
            }
        };
        let head_token = keyword_token(&head.to_ascii_lowercase())
            .unwrap_or_else(|| Token::Name(head.to_owned()));

        self.pending = Some(Spanned {
            token: tail_token,
            text: tail.to_owned(),
            start: middle,
            end,
        });
        Ok(Spanned {
            token: head_token,
            text: head.to_owned(),
            start,
            end: middle,
        })
    }

    fn lex_string(&mut self, start: Mark) -> Result<Spanned, ReadError> {
        self.bump(); // opening quote
        let mut content = String::new();
        loop {
            let at = self.mark();
            let Some(c) = self.bump() else {
                return Err(self.error(start, "\"", "unterminated string literal"));
            };
            match c {
                '"' => break,
                '\\' => {
                    if let Some(decoded) = self.lex_escape(at)? {
                        content.push(decoded);
                    }
                }
                other => content.push(other),
            }
        }
        Ok(Spanned {
            token: Token::Str(content),
            text: self.text_since(start),
            start,
            end: self.mark(),
        })
    }

    /// Decode the escape after a backslash at `at`. A backslash-newline is a
    /// line continuation and yields nothing.
    fn lex_escape(&mut self, at: Mark) -> Result<Option<char>, ReadError> {
        let Some(c) = self.bump() else {
            return Err(self.error(at, "\\", "unterminated escape in string"));
        };
        let decoded = match c {
            '\n' => return Ok(None),
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            '/' => '/',
            'a' => '\u{07}',
            'b' => '\u{08}',
            'f' => '\u{0c}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\u{0b}',
            '0' => '\0',
            'x' => self.lex_code_point(at, 2)?,
            'U' => self.lex_code_point(at, 8)?,
            'u' => {
                let high = self.lex_hex(at, 4)?;
                if !(0xD800..0xDC00).contains(&high) {
                    return self.code_point(at, high).map(Some);
                }
                if self.peek_char(0) != Some('\\') || self.peek_char(1) != Some('u') {
                    return Err(self.error(at, "\\u", "unpaired surrogate in string escape"));
                }
                self.bump();
                self.bump();
                let low = self.lex_hex(at, 4)?;
                if !(0xDC00..0xE000).contains(&low) {
                    return Err(self.error(at, "\\u", "unpaired surrogate in string escape"));
                }
                self.code_point(at, 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))?
            }
            other => {
                return Err(self.error(
                    at,
                    &format!("\\{}", other),
                    format!("unknown escape '\\{}' in string", other),
                ))
            }
        };
        Ok(Some(decoded))
    }

    fn lex_hex(&mut self, at: Mark, digits: usize) -> Result<u32, ReadError> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let digit = self.peek_char(0).and_then(|c| c.to_digit(16)).ok_or_else(|| {
                self.error(
                    at,
                    "\\",
                    format!("expected {} hex digits in string escape", digits),
                )
            })?;
            self.bump();
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn lex_code_point(&mut self, at: Mark, digits: usize) -> Result<char, ReadError> {
        let value = self.lex_hex(at, digits)?;
        self.code_point(at, value)
    }

    fn code_point(&self, at: Mark, value: u32) -> Result<char, ReadError> {
        char::from_u32(value).ok_or_else(|| {
            self.error(
                at,
                "\\",
                format!("escape U+{:04X} is not a valid character", value),
            )
        })
    }

    fn eat_while(&mut self, accept: impl Fn(char) -> bool) {
        while self.peek_char(0).is_some_and(&accept) {
            self.bump();
        }
    }

    fn lex_numeral(&mut self, start: Mark) -> Result<Spanned, ReadError> {
        if self.peek_char(0) == Some('0') {
            if let Some(prefix) = self.peek_char(1).map(|c| c.to_ascii_lowercase()) {
                if "bodzxvur".contains(prefix) {
                    return self.lex_prefixed(start, prefix);
                }
            }
        }

        let is_dec = |c: char| c.is_ascii_digit() || c == '_';
        self.eat_while(is_dec);
        let has_int_part = self.pos > start.offset;
        let mut float = false;

        if self.peek_char(0) == Some('.') {
            match self.peek_char(1) {
                Some(d) if d.is_ascii_digit() => {
                    self.bump();
                    self.eat_while(is_dec);
                    float = true;
                }
                // `1...` is the number followed by a comment.
                Some('.') => {}
                _ if has_int_part => {
                    self.bump();
                    float = true;
                }
                _ => {}
            }
        }

        if matches!(self.peek_char(0), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_char(1), Some('+' | '-')));
            if self.peek_char(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..=sign {
                    self.bump();
                }
                self.eat_while(is_dec);
                float = true;
            }
        }

        let text = self.text_since(start);
        if !separators_ok(&text, |c| c.is_ascii_digit()) {
            return Err(self.error(
                start,
                &text,
                format!("misplaced '_' separator in numeral '{}'", text),
            ));
        }
        self.reject_glued_word(start, &text)?;

        let kind = if float {
            NumeralKind::Float
        } else {
            NumeralKind::Decimal
        };
        Ok(Spanned {
            token: Token::Numeral(kind),
            text,
            start,
            end: self.mark(),
        })
    }

    fn lex_prefixed(&mut self, start: Mark, prefix: char) -> Result<Spanned, ReadError> {
        self.bump();
        self.bump();
        self.eat_while(|c| c.is_ascii_alphanumeric() || c == '_');
        let text = self.text_since(start);
        let body = &text[2..];

        let kind = match prefix {
            'u' => NumeralKind::Unary,
            'r' => NumeralKind::Roman,
            'b' => NumeralKind::Based(2),
            'o' => NumeralKind::Based(8),
            'd' => NumeralKind::Based(10),
            'z' => NumeralKind::Based(12),
            'x' => NumeralKind::Based(16),
            _ => NumeralKind::Based(20),
        };
        let valid = !body.is_empty()
            && match kind {
                NumeralKind::Unary => body.chars().all(|c| c == '1'),
                NumeralKind::Roman => body.chars().all(|c| "IVXLCDMivxlcdm".contains(c)),
                NumeralKind::Based(radix) => {
                    separators_ok(body, |c| c.is_digit(radix))
                        && body.chars().all(|c| c == '_' || c.is_digit(radix))
                }
                NumeralKind::Decimal | NumeralKind::Float => false,
            };
        if !valid {
            return Err(self.error(start, &text, format!("malformed numeral '{}'", text)));
        }
        self.reject_glued_word(start, &text)?;

        Ok(Spanned {
            token: Token::Numeral(kind),
            text,
            start,
            end: self.mark(),
        })
    }

    /// `12abc` is an error rather than a number followed by a name.
    fn reject_glued_word(&self, start: Mark, text: &str) -> Result<(), ReadError> {
        match self.peek_char(0) {
            Some(c) if c.is_ascii_alphanumeric() || c == '_' => Err(self.error(
                start,
                &format!("{}{}", text, c),
                format!("unexpected character '{}' after numeral '{}'", c, text),
            )),
            _ => Ok(()),
        }
    }
}
