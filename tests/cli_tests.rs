// tests/cli_tests.rs

#![cfg(feature = "cli")]

use odata_filter::cli::{
    CheckOptions, CheckResult, CliError, ast_json, execute_check, format_query, token_table,
};
use odata_filter::{Error, ValueType};
use std::fs;
use std::path::PathBuf;

const SCHEMA: &str = r#"{
    "fields": {
        "id": "integer",
        "name": "string",
        "status": { "enum": "TestStatus" }
    },
    "enums": { "TestStatus": ["enabled", "disabled"] }
}"#;

fn write_schema(name: &str, contents: &str) -> PathBuf {
    let file = format!("odata-filter-{}-{name}.json", std::process::id());
    let path = std::env::temp_dir().join(file);
    fs::write(&path, contents).unwrap();
    path
}

fn options(query: &str, schema: Option<&PathBuf>) -> CheckOptions {
    CheckOptions {
        query: query.to_string(),
        schema: schema.map(|p| p.to_string_lossy().into_owned()),
        syntax_only: false,
    }
}

// ============================================================================
// check
// ============================================================================

#[test]
fn test_check_without_schema_is_syntax_only() {
    let result = execute_check(&options("(a  eq 1)", None)).unwrap();
    assert_eq!(result, CheckResult::SyntaxValid("a eq 1".to_string()));
}

#[test]
fn test_check_with_schema() {
    let path = write_schema("valid", SCHEMA);
    let result = execute_check(&options("status eq TestStatus'enabled' and id gt 1", Some(&path)));
    assert_eq!(
        result.unwrap(),
        CheckResult::Valid {
            canonical: "status eq TestStatus'enabled' and id gt 1".to_string(),
            ty: ValueType::Boolean,
        }
    );
}

#[test]
fn test_check_reports_validation_error() {
    let path = write_schema("invalid", SCHEMA);
    let err = execute_check(&options("status eq 'enabled'", Some(&path))).unwrap_err();
    assert!(matches!(err, CliError::Filter(Error::EnumComparison { .. })));
    assert!(err.to_string().starts_with("Validation error: Field 'status' is an enum"));
}

#[test]
fn test_syntax_only_skips_schema() {
    let path = write_schema("skipped", SCHEMA);
    let mut opts = options("unknown_field eq 1", Some(&path));
    opts.syntax_only = true;
    assert_eq!(
        execute_check(&opts).unwrap(),
        CheckResult::SyntaxValid("unknown_field eq 1".to_string())
    );
}

#[test]
fn test_check_reports_syntax_error() {
    let err = execute_check(&options("status eq", None)).unwrap_err();
    assert_eq!(err.to_string(), "Syntax error: Failed to parse: unexpected end of input");
}

#[test]
fn test_malformed_schema_file() {
    let path = write_schema("malformed", "{ \"fields\": ");
    let err = execute_check(&options("a eq 1", Some(&path))).unwrap_err();
    assert!(matches!(err, CliError::Json(_)));
}

#[test]
fn test_missing_schema_file() {
    let path = std::env::temp_dir().join("odata-filter-does-not-exist.json");
    let err = execute_check(&options("a eq 1", Some(&path))).unwrap_err();
    assert!(matches!(err, CliError::Io(_)));
}

// ============================================================================
// tokens, ast, fmt
// ============================================================================

#[test]
fn test_token_table_lists_every_token() {
    let table = token_table("status eq TestStatus'enabled'").unwrap();
    assert_eq!(table.lines().count(), 4);
    assert!(table.lines().last().unwrap().ends_with("'enabled'"));
}

#[test]
fn test_token_table_reports_lexer_error() {
    assert!(matches!(
        token_table("a eq @"),
        Err(Error::Tokenizing { offset: 5, .. })
    ));
}

#[test]
fn test_ast_json() {
    let json = ast_json("status in (TestStatus'enabled')", true).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["node"], "compare");
    assert_eq!(value["comparator"], "in");
    assert_eq!(value["right"]["node"], "list");
    assert_eq!(value["right"]["items"][0]["node"], "enum_literal");
    assert_eq!(value["right"]["items"][0]["type_name"], "TestStatus");
}

#[test]
fn test_format_query() {
    assert_eq!(
        format_query("not(a eq 1)and b").unwrap(),
        "not (a eq 1) and b"
    );
}
