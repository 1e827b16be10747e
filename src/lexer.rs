use crate::ast::{Keyword, Token, TokenKind};
use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::iter::FusedIterator;
use tracing::trace;

static GUID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9A-Fa-f]{8}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{4}-[0-9A-Fa-f]{12}\b",
    )
    .expect("guid pattern")
});

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[0-9]{4}-[0-9]{2}-[0-9]{2}(T[0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]+)?)?(Z|[+-][0-9]{2}:[0-9]{2})?)?",
    )
    .expect("date-time pattern")
});

static TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{2}:[0-9]{2}(:[0-9]{2}(\.[0-9]+)?)?").expect("time pattern"));

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?").expect("number pattern"));

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*").expect("identifier pattern"));

/// Lazy tokenizer over a query string.
///
/// The lexer is an [`Iterator`] of `Result<Token>`. It stops after the first
/// error. Cloning it, or calling [`crate::tokenize`] again on the same text,
/// replays the identical sequence.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            position: 0,
            failed: false,
        }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.position..]
    }

    fn current_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.position += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    /// Emits a token spanning the next `len` bytes.
    fn emit(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.position;
        self.position += len;
        let token = Token::new(kind, &self.input[start..self.position], start, self.position);
        trace!(kind = ?token.kind, lexeme = %token.lexeme, start, "token");
        token
    }

    fn error_here(&self) -> Error {
        let text: String = self
            .rest()
            .chars()
            .take_while(|c| !c.is_whitespace())
            .collect();
        Error::Tokenizing {
            text,
            offset: self.position,
        }
    }

    /// Length of the string literal starting at the current quote, or `None`
    /// when it is never closed.
    fn string_len(&self) -> Option<usize> {
        let mut chars = self.rest().char_indices().skip(1).peekable();
        while let Some((idx, ch)) = chars.next() {
            if ch == '\'' {
                if matches!(chars.peek(), Some((_, '\''))) {
                    chars.next();
                } else {
                    return Some(idx + 1);
                }
            }
        }
        None
    }

    fn read_word(&mut self) -> Option<Token> {
        let len = IDENTIFIER.find(self.rest())?.end();
        let word = &self.rest()[..len];

        let kind = if let Some(keyword) = Keyword::from_word(word) {
            TokenKind::Keyword(keyword)
        } else if word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false") {
            TokenKind::Boolean
        } else if word == "null" {
            TokenKind::Null
        } else if word == "NaN" || word == "INF" {
            TokenKind::Number
        } else {
            TokenKind::Identifier
        };
        Some(self.emit(kind, len))
    }

    /// Literals that start with a digit: date/time shapes win over plain numbers.
    fn read_numeric(&mut self) -> Option<Token> {
        let rest = self.rest();
        if let Some(m) = DATE_TIME.captures(rest) {
            let kind = if m.get(1).is_some() {
                TokenKind::DateTime
            } else {
                TokenKind::Date
            };
            let len = m.get(0).map_or(0, |m| m.end());
            return Some(self.emit(kind, len));
        }
        if let Some(m) = TIME.find(rest) {
            return Some(self.emit(TokenKind::Time, m.end()));
        }
        let len = NUMBER.find(rest)?.end();
        Some(self.emit(TokenKind::Number, len))
    }

    /// Returns the next token, `Ok(None)` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_whitespace();

        let Some(ch) = self.current_char() else {
            return Ok(None);
        };

        let punctuation = match ch {
            '(' => Some(TokenKind::LParen),
            ')' => Some(TokenKind::RParen),
            ',' => Some(TokenKind::Comma),
            '/' => Some(TokenKind::Slash),
            ':' => Some(TokenKind::Colon),
            '-' => Some(TokenKind::Minus),
            _ => None,
        };
        if let Some(kind) = punctuation {
            return Ok(Some(self.emit(kind, 1)));
        }

        if ch == '\'' {
            let len = self.string_len().ok_or_else(|| self.error_here())?;
            return Ok(Some(self.emit(TokenKind::String, len)));
        }

        // GUIDs may start with a letter or a digit, so they go first.
        if ch.is_ascii_alphanumeric()
            && let Some(m) = GUID.find(self.rest())
        {
            return Ok(Some(self.emit(TokenKind::Guid, m.end())));
        }

        let token = if ch.is_ascii_digit() {
            self.read_numeric()
        } else if ch.is_ascii_alphabetic() || ch == '_' {
            self.read_word()
        } else {
            None
        };

        token.map(Some).ok_or_else(|| self.error_here())
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.next_token() {
            Ok(token) => token.map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Lexer<'_> {}
