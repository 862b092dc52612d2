//! Literal recognition for EDN text.
//!
//! The lexer walks the input left to right and hands back one token at a
//! time, consuming the token together with any whitespace (commas included)
//! that follows it. Matchers are tried in a fixed order: brackets first, then
//! strings, characters, `nil`/`true`/`false`, floats, integers, symbols,
//! keywords, comments and finally tags.

use crate::edn::EdnValue;
use crate::error::{EdnError, EdnResult};
use crate::primitives::named_character;

/// The four collection kinds a bracket can open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    List,
    Vector,
    Map,
    Set,
}

impl CollectionKind {
    pub fn name(self) -> &'static str {
        match self {
            CollectionKind::List => "list",
            CollectionKind::Vector => "vector",
            CollectionKind::Map => "map",
            CollectionKind::Set => "set",
        }
    }

    /// Whether `closer` ends a collection of this kind.
    pub fn closed_by(self, closer: char) -> bool {
        matches!(
            (self, closer),
            (CollectionKind::List, ')')
                | (CollectionKind::Vector, ']')
                | (CollectionKind::Map, '}')
                | (CollectionKind::Set, '}')
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Open(CollectionKind),
    Close(char),
    Literal(EdnValue),
    Tag(String),
    Comment,
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b',')
}

fn is_delimiter(b: u8) -> bool {
    is_whitespace(b) || matches!(b, b'(' | b')' | b'[' | b']' | b'{' | b'}' | b'"' | b';')
}

/// Characters allowed after the first one in a symbol segment.
fn is_body_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b".*+!-_?$%&=<>:#".contains(&b)
}

fn is_start_char(b: u8) -> bool {
    b.is_ascii_alphabetic() || b"*!_?$%&=<>".contains(&b)
}

/// Scan one symbol segment starting at `at`, returning its end.
fn scan_segment(bytes: &[u8], at: usize) -> Option<usize> {
    let first = *bytes.get(at)?;
    let mut end = if is_start_char(first) {
        at + 1
    } else if matches!(first, b'.' | b'+' | b'-') {
        match bytes.get(at + 1) {
            // `-5` is a number, not a symbol
            Some(b) if b.is_ascii_digit() => return None,
            Some(&b) if is_body_char(b) => at + 2,
            _ => return Some(at + 1),
        }
    } else {
        return None;
    };
    while bytes.get(end).is_some_and(|&b| is_body_char(b)) {
        end += 1;
    }
    Some(end)
}

/// Scan `segment` or `namespace/segment`, returning its end.
fn scan_symbol(bytes: &[u8], at: usize) -> Option<usize> {
    if bytes.get(at) == Some(&b'/') {
        let lone = !bytes
            .get(at + 1)
            .is_some_and(|&b| is_body_char(b) || b == b'/');
        return lone.then_some(at + 1);
    }
    let end = scan_segment(bytes, at)?;
    if bytes.get(end) == Some(&b'/') {
        scan_segment(bytes, end + 1)
    } else {
        Some(end)
    }
}

/// Scan `0` or a digit run without a leading zero, after an optional sign.
fn scan_integer_part(bytes: &[u8], at: usize) -> Option<usize> {
    let mut end = at;
    if matches!(bytes.get(end), Some(b'+' | b'-')) {
        end += 1;
    }
    match bytes.get(end) {
        Some(b'0') => Some(end + 1),
        Some(b'1'..=b'9') => {
            end += 1;
            while bytes.get(end).is_some_and(|b| b.is_ascii_digit()) {
                end += 1;
            }
            Some(end)
        }
        _ => None,
    }
}

fn scan_digits(bytes: &[u8], at: usize) -> Option<usize> {
    let count = bytes[at.min(bytes.len())..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    (count > 0).then_some(at + count)
}

fn scan_exponent(bytes: &[u8], at: usize) -> Option<usize> {
    match bytes.get(at) {
        Some(b'e' | b'E') => scan_integer_part(bytes, at + 1),
        _ => None,
    }
}

fn at_boundary(bytes: &[u8], at: usize) -> bool {
    bytes.get(at).map_or(true, |&b| is_delimiter(b))
}

#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Self { input, position: 0 };
        lexer.skip_whitespace();
        lexer
    }

    #[cfg(test)]
    fn position(&self) -> usize {
        self.position
    }

    fn rest(&self) -> &'a str {
        let input = self.input;
        &input[self.position..]
    }

    fn skip_whitespace(&mut self) {
        let bytes = self.input.as_bytes();
        while bytes.get(self.position).is_some_and(|&b| is_whitespace(b)) {
            self.position += 1;
        }
    }

    /// Consume `len` bytes plus trailing whitespace, yielding `token`.
    fn consume(&mut self, len: usize, token: Token) -> EdnResult<Option<Token>> {
        self.position += len;
        self.skip_whitespace();
        Ok(Some(token))
    }

    /// Recognize the next token, or `None` once the input is exhausted.
    pub fn next_token(&mut self) -> EdnResult<Option<Token>> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let Some(&first) = bytes.first() else {
            return Ok(None);
        };

        match first {
            b'#' if bytes.get(1) == Some(&b'{') => {
                return self.consume(2, Token::Open(CollectionKind::Set))
            }
            b'(' => return self.consume(1, Token::Open(CollectionKind::List)),
            b'[' => return self.consume(1, Token::Open(CollectionKind::Vector)),
            b'{' => return self.consume(1, Token::Open(CollectionKind::Map)),
            b')' | b']' | b'}' => return self.consume(1, Token::Close(first as char)),
            b'"' => return self.read_string(bytes),
            b'\\' => return self.read_character(bytes),
            _ => {}
        }

        for (word, value) in [
            ("nil", EdnValue::Nil),
            ("true", EdnValue::Bool(true)),
            ("false", EdnValue::Bool(false)),
        ] {
            let len = word.len();
            let bounded = !bytes
                .get(len)
                .is_some_and(|&b| is_body_char(b) || b == b'/');
            if rest.starts_with(word) && bounded {
                return self.consume(len, Token::Literal(value));
            }
        }

        if let Some(token) = self.read_number(bytes)? {
            return Ok(Some(token));
        }

        if let Some(end) = scan_symbol(bytes, 0) {
            let name = rest[..end].to_string();
            return self.consume(end, Token::Literal(EdnValue::Symbol(name)));
        }

        if first == b':' {
            if let Some(end) = scan_symbol(bytes, 1) {
                let name = rest[1..end].to_string();
                return self.consume(end, Token::Literal(EdnValue::Keyword(name)));
            }
        }

        if first == b';' {
            let end = rest.find('\n').map_or(rest.len(), |newline| newline + 1);
            return self.consume(end, Token::Comment);
        }

        if first == b'#' && bytes.get(1).is_some_and(|b| b.is_ascii_alphabetic()) {
            if let Some(end) = scan_symbol(bytes, 1) {
                let tag = rest[1..end].to_string();
                return self.consume(end, Token::Tag(tag));
            }
        }

        Err(EdnError::unrecognized(rest))
    }

    fn read_string(&mut self, bytes: &[u8]) -> EdnResult<Option<Token>> {
        let mut end = 1;
        loop {
            match bytes.get(end) {
                None => return Err(EdnError::unterminated_string(self.rest())),
                Some(b'"') => break,
                // Escapes only matter for finding the closing quote
                Some(b'\\') => end += 2,
                Some(_) => end += 1,
            }
        }
        let content = self.rest()[1..end].to_string();
        self.consume(end + 1, Token::Literal(EdnValue::String(content)))
    }

    fn read_character(&mut self, bytes: &[u8]) -> EdnResult<Option<Token>> {
        let len = bytes[1..]
            .iter()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count();
        if len == 0 {
            return Err(EdnError::unrecognized(self.rest()));
        }
        let name = &self.rest()[1..1 + len];
        if name == "c" {
            return Err(EdnError::UnsupportedCharacter);
        }
        let c = named_character(name).ok_or_else(|| EdnError::InvalidCharacter {
            name: name.to_string(),
        })?;
        self.consume(1 + len, Token::Literal(EdnValue::Character(c)))
    }

    fn read_number(&mut self, bytes: &[u8]) -> EdnResult<Option<Token>> {
        let Some(int_end) = scan_integer_part(bytes, 0) else {
            return Ok(None);
        };
        let rest = self.rest();

        let fraction_end = match bytes.get(int_end) {
            Some(b'.') => scan_digits(bytes, int_end + 1),
            _ => None,
        };
        let float_end = match fraction_end {
            Some(end) => Some(scan_exponent(bytes, end).unwrap_or(end)),
            None => scan_exponent(bytes, int_end),
        };

        if let Some(end) = float_end {
            let suffixed = bytes.get(end) == Some(&b'M');
            let len = end + usize::from(suffixed);
            if at_boundary(bytes, len) {
                let text = &rest[..end];
                let value = text
                    .parse::<f64>()
                    .map_err(|_| EdnError::invalid_number(&rest[..len]))?;
                return self.consume(len, Token::Literal(EdnValue::Float(value)));
            }
        }

        let suffixed = bytes.get(int_end) == Some(&b'N');
        let len = int_end + usize::from(suffixed);
        if !at_boundary(bytes, len) {
            return Ok(None);
        }
        let value = rest[..int_end]
            .parse::<i64>()
            .map_err(|_| EdnError::invalid_number(&rest[..len]))?;
        self.consume(len, Token::Literal(EdnValue::Integer(value)))
    }
}
