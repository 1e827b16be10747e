//! Error taxonomy shared by the lexer, the parser and every validating backend.

use crate::ast::Token;
use thiserror::Error;

/// Every failure the library can report.
///
/// Syntax errors come from [`tokenize`](crate::tokenize) and
/// [`parse`](crate::parse); the remaining kinds are raised by backends while
/// they walk an AST and travel through the visitor untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// No lexical rule matches the input at `offset`.
    #[error("Failed to tokenize at offset {offset}: '{text}'")]
    Tokenizing { text: String, offset: usize },

    /// The parser found a token that does not fit the grammar.
    #[error("Failed to parse at {token}")]
    Parsing { token: Token },

    /// The token sequence ended in the middle of a production.
    #[error("Failed to parse: unexpected end of input")]
    UnexpectedEndOfInput,

    #[error("Unknown function: '{function}'")]
    UnknownFunction { function: String },

    #[error("Function '{function}' is not implemented yet.")]
    UnsupportedFunction { function: String },

    #[error("{}", argument_count_message(.function, .min, .max, .given))]
    ArgumentCount {
        function: String,
        min: usize,
        max: usize,
        given: usize,
    },

    #[error("{}", argument_type_message(.function, .expected, .actual))]
    ArgumentType {
        function: Option<String>,
        expected: Option<String>,
        actual: Option<String>,
    },

    #[error("Invalid field: {field}")]
    InvalidField { field: String },

    #[error("Invalid enum type '{enum_type}' for field '{field}'")]
    EnumType { enum_type: String, field: String },

    #[error(
        "Invalid enum value '{value}' for type '{enum_type}'. Valid values are: {}",
        .valid_values.join(", ")
    )]
    InvalidEnumValue {
        value: String,
        enum_type: String,
        valid_values: Vec<String>,
    },

    #[error(
        "Field '{field}' is an enum and must be compared with an enum value using the syntax: EnumType'value'"
    )]
    EnumComparison { field: String },

    /// An operator was applied to a value it makes no sense for, e.g. `10 gt null`.
    #[error("Cannot apply '{operation}' to '{value}'")]
    Type { operation: String, value: String },

    /// A well-formed literal holds an impossible value, e.g. `2023-02-30`.
    #[error("Invalid value: {value}")]
    Value { value: String },

    /// The query is valid but this backend cannot translate the construct.
    #[error("Unsupported operation: {construct}")]
    Unsupported { construct: String },
}

pub type Result<T> = std::result::Result<T, Error>;

fn argument_count_message(function: &str, min: &usize, max: &usize, given: &usize) -> String {
    if min == max {
        format!("Function '{function}' takes {min} arguments. {given} given.")
    } else {
        format!("Function '{function}' takes between {min} and {max} arguments. {given} given.")
    }
}

fn argument_type_message(
    function: &Option<String>,
    expected: &Option<String>,
    actual: &Option<String>,
) -> String {
    let mut message = match function {
        Some(name) => format!("Unsupported or invalid type for function or operator '{name}'"),
        None => "Invalid argument type for function or operator.".to_string(),
    };
    if let Some(expected) = expected {
        message.push_str(&format!(" Expected {expected}"));
        if let Some(actual) = actual {
            message.push_str(&format!(", got {actual}"));
        }
    }
    message
}

impl Error {
    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
        }
    }

    pub fn type_error(operation: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Type {
            operation: operation.into(),
            value: value.into(),
        }
    }

    pub fn value(value: impl Into<String>) -> Self {
        Self::Value {
            value: value.into(),
        }
    }

    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self::Unsupported {
            construct: construct.into(),
        }
    }

    /// Raised while turning text into an AST.
    pub fn is_syntax_error(&self) -> bool {
        matches!(
            self,
            Self::Tokenizing { .. } | Self::Parsing { .. } | Self::UnexpectedEndOfInput
        )
    }

    /// Raised while checking a function call against a catalog.
    pub fn is_function_call_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownFunction { .. }
                | Self::UnsupportedFunction { .. }
                | Self::ArgumentCount { .. }
                | Self::ArgumentType { .. }
        )
    }
}
