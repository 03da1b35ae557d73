//! Parser for the restricted path grammar.
//!
//! ```text
//! path       := '$' segment*
//! segment    := '.' name | '.*' | '[' selector ']'
//! selector   := quoted | index | '*' | '?(' or_expr ')'
//! or_expr    := and_expr ('||' and_expr)*
//! and_expr   := primary ('&&' primary)*
//! primary    := '(' or_expr ')' | '@' field+ '==' literal
//! field      := '.' name | '[' quoted ']'
//! literal    := quoted | number | 'true' | 'false' | 'null'
//! ```
//!
//! `name` is `[A-Za-z0-9_-]+`; any other key needs the bracket-quoted form.

use serde_json::{Number, Value};

use super::PathError;

/// One step of a parsed path expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Map key access
    Field(String),
    /// List element access
    Index(usize),
    /// Every value of a map or every element of a list
    Wildcard,
    /// List elements matching a boolean expression
    Filter(FilterExpr),
}

/// Boolean filter expression evaluated against one list element (`@`).
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    /// `@.a.b == literal`
    Equals {
        /// Field chain below `@`
        field: Vec<String>,
        /// Literal compared against
        literal: Value,
    },
    /// Both sides match
    And(Box<FilterExpr>, Box<FilterExpr>),
    /// Either side matches
    Or(Box<FilterExpr>, Box<FilterExpr>),
}

pub(super) fn parse(path: &str) -> Result<Vec<Segment>, PathError> {
    let mut parser = Parser {
        path,
        chars: path.char_indices().collect(),
        pos: 0,
    };
    parser.parse_path()
}

struct Parser<'a> {
    path: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl Parser<'_> {
    fn parse_path(&mut self) -> Result<Vec<Segment>, PathError> {
        self.skip_whitespace();
        if !self.eat('$') {
            return Err(self.error("path must start with '$'"));
        }

        let mut segments = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('.') => {
                    self.pos += 1;
                    match self.peek() {
                        Some('.') => return Err(self.error("recursive descent '..' is not supported")),
                        Some('*') => {
                            self.pos += 1;
                            segments.push(Segment::Wildcard);
                        }
                        _ => segments.push(Segment::Field(self.parse_name()?)),
                    }
                }
                Some('[') => {
                    self.pos += 1;
                    segments.push(self.parse_bracket()?);
                }
                Some(c) => return Err(self.error(format!("unexpected character '{c}'"))),
            }
        }
        Ok(segments)
    }

    fn parse_bracket(&mut self) -> Result<Segment, PathError> {
        self.skip_whitespace();
        let segment = match self.peek() {
            Some('\'' | '"') => Segment::Field(self.parse_quoted()?),
            Some('*') => {
                self.pos += 1;
                Segment::Wildcard
            }
            Some('?') => {
                self.pos += 1;
                self.skip_whitespace();
                self.expect('(')?;
                let expr = self.parse_or()?;
                self.skip_whitespace();
                self.expect(')')?;
                Segment::Filter(expr)
            }
            Some(c) if c.is_ascii_digit() => Segment::Index(self.parse_index()?),
            Some('-') => return Err(self.error("negative indexes are not supported")),
            Some(c) => return Err(self.error(format!("unexpected character '{c}' in brackets"))),
            None => return Err(self.error("unterminated '['")),
        };
        self.skip_whitespace();
        self.expect(']')?;
        Ok(segment)
    }

    fn parse_or(&mut self) -> Result<FilterExpr, PathError> {
        let mut expr = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if self.eat_str("||") {
                let rhs = self.parse_and()?;
                expr = FilterExpr::Or(Box::new(expr), Box::new(rhs));
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_and(&mut self) -> Result<FilterExpr, PathError> {
        let mut expr = self.parse_primary()?;
        loop {
            self.skip_whitespace();
            if self.eat_str("&&") {
                let rhs = self.parse_primary()?;
                expr = FilterExpr::And(Box::new(expr), Box::new(rhs));
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<FilterExpr, PathError> {
        self.skip_whitespace();
        if self.eat('(') {
            let expr = self.parse_or()?;
            self.skip_whitespace();
            self.expect(')')?;
            return Ok(expr);
        }

        if !self.eat('@') {
            return Err(self.error("filter clause must start with '@'"));
        }
        let mut field = Vec::new();
        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    field.push(self.parse_name()?);
                }
                Some('[') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    field.push(self.parse_quoted()?);
                    self.skip_whitespace();
                    self.expect(']')?;
                }
                _ => break,
            }
        }
        if field.is_empty() {
            return Err(self.error("filter clause must name a field of '@'"));
        }

        self.skip_whitespace();
        if !self.eat_str("==") {
            return Err(self.error("only '==' comparisons are supported in filters"));
        }
        self.skip_whitespace();
        let literal = self.parse_literal()?;
        Ok(FilterExpr::Equals {
            field,
            literal,
        })
    }

    fn parse_literal(&mut self) -> Result<Value, PathError> {
        match self.peek() {
            Some('\'' | '"') => Ok(Value::String(self.parse_quoted()?)),
            Some(c) if c == '-' || c.is_ascii_digit() => self.parse_number(),
            Some(_) => {
                if self.eat_keyword("true") {
                    Ok(Value::Bool(true))
                } else if self.eat_keyword("false") {
                    Ok(Value::Bool(false))
                } else if self.eat_keyword("null") {
                    Ok(Value::Null)
                } else {
                    Err(self.error("expected a string, number, boolean or null literal"))
                }
            }
            None => Err(self.error("expected a literal")),
        }
    }

    fn parse_number(&mut self) -> Result<Value, PathError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
        {
            self.pos += 1;
        }
        let text = self.slice(start, self.pos);
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Value::Number(i.into()));
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error_at(start, format!("invalid number '{text}'")))
    }

    fn parse_index(&mut self) -> Result<usize, PathError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
        let text = self.slice(start, self.pos);
        text.parse::<usize>().map_err(|_| self.error_at(start, format!("invalid index '{text}'")))
    }

    fn parse_name(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.error("expected a field name (use ['...'] for special characters)"));
        }
        Ok(self.slice(start, self.pos).to_string())
    }

    fn parse_quoted(&mut self) -> Result<String, PathError> {
        let start = self.pos;
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.error("expected a quoted string")),
        };
        self.pos += 1;

        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error_at(start, "unterminated string")),
                Some('\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(c) => {
                            out.push(c);
                            self.pos += 1;
                        }
                        None => return Err(self.error_at(start, "unterminated string")),
                    }
                }
                Some(c) if c == quote => {
                    self.pos += 1;
                    return Ok(out);
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_str(&mut self, expected: &str) -> bool {
        let matches = expected
            .chars()
            .enumerate()
            .all(|(i, c)| self.chars.get(self.pos + i).map(|(_, ch)| *ch) == Some(c));
        if matches {
            self.pos += expected.chars().count();
        }
        matches
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        let end = self.pos + keyword.chars().count();
        let boundary = self.chars.get(end).is_none_or(|(_, c)| !c.is_ascii_alphanumeric());
        boundary && self.eat_str(keyword)
    }

    fn expect(&mut self, expected: char) -> Result<(), PathError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.error(format!("expected '{expected}'")))
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn byte_offset(&self, pos: usize) -> usize {
        self.chars.get(pos).map_or(self.path.len(), |(offset, _)| *offset)
    }

    fn slice(&self, start: usize, end: usize) -> &str {
        &self.path[self.byte_offset(start)..self.byte_offset(end)]
    }

    fn error(&self, message: impl Into<String>) -> PathError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, pos: usize, message: impl Into<String>) -> PathError {
        PathError::Syntax {
            path: self.path.to_string(),
            position: self.byte_offset(pos),
            message: message.into(),
        }
    }
}
