use serde::Serialize;
use std::fmt;

/// Reserved words of the filter grammar.
///
/// Matching is case-sensitive: `and` is a keyword, `And` is an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Keyword {
    And,
    Or,
    Not,
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    In,
    Any,
    All,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl Keyword {
    pub fn from_word(word: &str) -> Option<Self> {
        let keyword = match word {
            "and" => Keyword::And,
            "or" => Keyword::Or,
            "not" => Keyword::Not,
            "eq" => Keyword::Eq,
            "ne" => Keyword::Ne,
            "gt" => Keyword::Gt,
            "ge" => Keyword::Ge,
            "lt" => Keyword::Lt,
            "le" => Keyword::Le,
            "in" => Keyword::In,
            "any" => Keyword::Any,
            "all" => Keyword::All,
            "add" => Keyword::Add,
            "sub" => Keyword::Sub,
            "mul" => Keyword::Mul,
            "div" => Keyword::Div,
            "mod" => Keyword::Mod,
            _ => return None,
        };
        Some(keyword)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Keyword::And => "and",
            Keyword::Or => "or",
            Keyword::Not => "not",
            Keyword::Eq => "eq",
            Keyword::Ne => "ne",
            Keyword::Gt => "gt",
            Keyword::Ge => "ge",
            Keyword::Lt => "lt",
            Keyword::Le => "le",
            Keyword::In => "in",
            Keyword::Any => "any",
            Keyword::All => "all",
            Keyword::Add => "add",
            Keyword::Sub => "sub",
            Keyword::Mul => "mul",
            Keyword::Div => "div",
            Keyword::Mod => "mod",
        }
    }
}

/// What a [`Token`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    // Names
    /// Field, function or enum type name
    ///
    /// # Examples
    /// ```text
    /// status
    /// my.namespace.Status
    /// _internal
    /// ```
    Identifier,

    /// Reserved word
    Keyword(Keyword),

    // Literals
    /// Single-quoted string, `''` escapes a quote
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// 'g''day'
    /// ```
    String,

    /// Integer, decimal or exponent form, plus `NaN` and `INF`
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 3.14
    /// 1e-10
    /// ```
    Number,

    /// `YYYY-MM-DD`
    Date,

    /// `YYYY-MM-DDTHH:MM[:SS[.fff]][Z|±HH:MM]`
    DateTime,

    /// `HH:MM[:SS[.fff]]`
    Time,

    /// `8-4-4-4-12` hexadecimal groups
    Guid,

    /// `true` or `false`, any letter case
    Boolean,

    /// `null`
    Null,

    // Punctuation
    /// Unary minus
    Minus,
    LParen,
    RParen,
    Comma,
    /// Path separator
    Slash,
    /// Lambda variable separator
    Colon,
}

/// A lexical unit with its source position.
///
/// `start` and `end` are byte offsets into the tokenized text, `end` being
/// exclusive. `lexeme` is the exact source slice, quotes included for strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, start: usize, end: usize) -> Self {
        Token {
            kind,
            lexeme: lexeme.into(),
            start,
            end,
        }
    }

    /// True when `next` starts exactly where this token ends.
    pub fn is_adjacent_to(&self, next: &Token) -> bool {
        self.end == next.start
    }

    /// Decoded contents of a string token, without quotes and with `''`
    /// collapsed to `'`.
    pub fn string_value(&self) -> Option<String> {
        if self.kind != TokenKind::String {
            return None;
        }
        let inner = self
            .lexeme
            .strip_prefix('\'')
            .and_then(|s| s.strip_suffix('\''))?;
        Some(inner.replace("''", "'"))
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' (offset {})", self.lexeme, self.start)
    }
}
