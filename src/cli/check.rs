//! Check filter queries, optionally against a schema

use super::CliError;
use crate::{FunctionCatalog, Schema, ValueType, parse, print, validate};
use std::fs;
use tracing::debug;

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The filter query to check
    pub query: String,
    /// Path to a JSON schema file
    pub schema: Option<String>,
    /// Only validate syntax, don't check against the schema
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    /// The query parsed; carries its canonical text
    SyntaxValid(String),
    /// The query parsed and passed schema validation
    Valid { canonical: String, ty: ValueType },
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let expr = parse(&options.query)?;
    let canonical = print(&expr);

    let schema_path = match &options.schema {
        Some(path) if !options.syntax_only => path,
        _ => return Ok(CheckResult::SyntaxValid(canonical)),
    };

    debug!(path = %schema_path, "loading schema");
    let schema = Schema::from_json(&fs::read_to_string(schema_path)?)?;
    let ty = validate(&expr, &schema, &FunctionCatalog::odata())?;
    Ok(CheckResult::Valid { canonical, ty })
}
