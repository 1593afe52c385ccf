//! Parser for ASCII property lists.
//!
//! Grammar accepted:
//! - bare strings: `[A-Za-z0-9_$+/:.-]+`
//! - quoted strings with `\" \\ \n \t \r \' \Uxxxx` escapes
//! - dictionaries `{ key = value; ... }`
//! - arrays `( value, value, )` (trailing comma optional)
//! - data `<0fbd 7777>`
//! - `/* block */` and `// line` comments anywhere whitespace is allowed
//!
//! Errors carry 1-based line/column positions so an operator can fix the
//! document by hand. Nothing is repaired or guessed.

use crate::errors::{GraftError, GraftResult};

use super::{Dict, Value};

/// Parse a complete property-list document.
pub fn parse(text: &str) -> GraftResult<Value> {
    let mut p = Parser::new(text);
    p.skip_trivia()?;
    let value = p.value()?;
    p.skip_trivia()?;
    if let Some(c) = p.peek() {
        return Err(p.error(format!("unexpected trailing character {c:?}")));
    }
    Ok(value)
}

pub(crate) fn is_bare_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '+' | '/' | ':' | '.' | '-')
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    col: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Self {
            src,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut it = self.src[self.pos..].chars();
        it.next();
        it.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> GraftError {
        GraftError::malformed(format!("line {}, column {}", self.line, self.col), message)
    }

    fn expect(&mut self, want: char) -> GraftResult<()> {
        match self.peek() {
            Some(c) if c == want => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected {want:?}, found {c:?}"))),
            None => Err(self.error(format!("expected {want:?}, found end of document"))),
        }
    }

    fn skip_trivia(&mut self) -> GraftResult<()> {
        loop {
            match (self.peek(), self.peek2()) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) => {
                    while let Some(c) = self.bump() {
                        if c == '\n' {
                            break;
                        }
                    }
                }
                (Some('/'), Some('*')) => {
                    let (line, col) = (self.line, self.col);
                    self.bump();
                    self.bump();
                    loop {
                        match self.bump() {
                            Some('*') if self.peek() == Some('/') => {
                                self.bump();
                                break;
                            }
                            Some(_) => {}
                            None => {
                                return Err(GraftError::malformed(
                                    format!("line {line}, column {col}"),
                                    "unterminated comment",
                                ))
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn value(&mut self) -> GraftResult<Value> {
        match self.peek() {
            Some('{') => self.dict(),
            Some('(') => self.array(),
            Some('<') => self.data(),
            Some('"') | Some('\'') => self.quoted().map(Value::String),
            Some(c) if is_bare_char(c) => Ok(Value::String(self.bare())),
            Some(c) => Err(self.error(format!("unexpected character {c:?}"))),
            None => Err(self.error("unexpected end of document")),
        }
    }

    fn key(&mut self) -> GraftResult<String> {
        match self.peek() {
            Some('"') | Some('\'') => self.quoted(),
            Some(c) if is_bare_char(c) => Ok(self.bare()),
            Some(c) => Err(self.error(format!("expected dictionary key, found {c:?}"))),
            None => Err(self.error("expected dictionary key, found end of document")),
        }
    }

    fn dict(&mut self) -> GraftResult<Value> {
        self.expect('{')?;
        let mut dict = Dict::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some('}') {
                self.bump();
                return Ok(Value::Dict(dict));
            }
            let (line, col) = (self.line, self.col);
            let key = self.key()?;
            self.skip_trivia()?;
            self.expect('=')?;
            self.skip_trivia()?;
            let value = self.value()?;
            self.skip_trivia()?;
            self.expect(';')?;
            if dict.insert(key.clone(), value).is_some() {
                return Err(GraftError::malformed(
                    format!("line {line}, column {col}"),
                    format!("duplicate key {key:?}"),
                ));
            }
        }
    }

    fn array(&mut self) -> GraftResult<Value> {
        self.expect('(')?;
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.peek() == Some(')') {
                self.bump();
                return Ok(Value::Array(items));
            }
            items.push(self.value()?);
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') => {}
                Some(c) => return Err(self.error(format!("expected ',' or ')', found {c:?}"))),
                None => return Err(self.error("unterminated array")),
            }
        }
    }

    fn data(&mut self) -> GraftResult<Value> {
        self.expect('<')?;
        let mut digits = String::new();
        loop {
            match self.bump() {
                Some('>') => break,
                Some(c) if c.is_ascii_hexdigit() => digits.push(c),
                Some(c) if c.is_whitespace() => {}
                Some(c) => return Err(self.error(format!("invalid character {c:?} in data"))),
                None => return Err(self.error("unterminated data")),
            }
        }
        hex::decode(&digits)
            .map(Value::Data)
            .map_err(|e| self.error(format!("invalid data: {e}")))
    }

    fn bare(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_bare_char(c)) {
            self.bump();
        }
        self.src[start..self.pos].to_string()
    }

    fn quoted(&mut self) -> GraftResult<String> {
        let (line, col) = (self.line, self.col);
        let quote = self.bump().unwrap_or('"');
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('U') => out.push(self.unicode_escape()?),
                    Some(c) => out.push(c),
                    None => break,
                },
                Some(c) => out.push(c),
                None => break,
            }
        }
        Err(GraftError::malformed(
            format!("line {line}, column {col}"),
            "unterminated string",
        ))
    }

    fn unicode_escape(&mut self) -> GraftResult<char> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .bump()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("invalid \\U escape"))?;
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.error("invalid \\U code point"))
    }
}
