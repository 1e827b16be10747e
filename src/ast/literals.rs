use serde::Serialize;
use std::fmt;

/// The kind of a literal node.
///
/// Literal nodes keep their source text; typed decoding lives in
/// [`crate::validate::decode_literal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralKind {
    /// `'text'`, stored unquoted
    String,
    /// `42`, `3.14`, `1e-10`, `NaN`, `INF`
    Number,
    /// `true` / `false`, stored in lower case
    Boolean,
    Null,
    /// `2023-01-01`
    Date,
    /// `2023-01-01T10:00:00Z`
    DateTime,
    /// `10:30:00`
    Time,
    /// `duration'P1DT2H'`, stored without the prefix and quotes
    Duration,
    /// `8-4-4-4-12` hexadecimal
    Guid,
    /// `binary'<base64url>'`, stored without the prefix and quotes
    Binary,
}

impl LiteralKind {
    pub fn as_str(self) -> &'static str {
        match self {
            LiteralKind::String => "string",
            LiteralKind::Number => "number",
            LiteralKind::Boolean => "boolean",
            LiteralKind::Null => "null",
            LiteralKind::Date => "date",
            LiteralKind::DateTime => "datetime",
            LiteralKind::Time => "time",
            LiteralKind::Duration => "duration",
            LiteralKind::Guid => "guid",
            LiteralKind::Binary => "binary",
        }
    }

    /// Kinds written as `prefix'value'` in query text.
    pub fn from_prefix(prefix: &str) -> Option<Self> {
        if prefix.eq_ignore_ascii_case("duration") {
            Some(LiteralKind::Duration)
        } else if prefix.eq_ignore_ascii_case("binary") {
            Some(LiteralKind::Binary)
        } else {
            None
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
