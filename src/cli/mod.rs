//! CLI support for odata-filter
//!
//! Provides programmatic access to the `odata-filter` commands for embedding
//! in other tools.

mod check;
mod inspect;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use inspect::{ast_json, format_query, token_table};

use std::io;
use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    /// Tokenizing, parsing or validation failure
    #[error("{}: {}", error_label(.0), .0)]
    Filter(#[from] crate::Error),
    /// Malformed schema file or AST serialization failure
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// No query given and nothing piped to stdin
    #[error("No query provided. Pass it as an argument or pipe it to stdin.")]
    NoInput,
}

fn error_label(error: &crate::Error) -> &'static str {
    if error.is_syntax_error() {
        "Syntax error"
    } else {
        "Validation error"
    }
}
