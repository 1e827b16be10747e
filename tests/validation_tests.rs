// tests/validation_tests.rs

use odata_filter::{
    Error, Expr, FunctionCatalog, FunctionSignature, ParamType, Schema, SchemaValidator,
    ValueType, Visitor, parse, validate,
};
use test_case::test_case;

fn schema() -> Schema {
    Schema::new()
        .field("id", ValueType::Number)
        .field("name", ValueType::String)
        .field("created_at", ValueType::Datetime)
        .field("birthday", ValueType::Date)
        .field("timeout", ValueType::Duration)
        .field("active", ValueType::Boolean)
        .field("status", ValueType::Enum("TestStatus".into()))
        .field("previous_status", ValueType::Enum("TestStatus".into()))
        .field("resource_type", ValueType::Enum("TestType".into()))
        .field("author", ValueType::Entity)
        .field("author/name", ValueType::String)
        .field("tags", ValueType::Collection(Box::new(ValueType::String)))
        .field("statuses", ValueType::Collection(Box::new(ValueType::Enum("TestStatus".into()))))
        .enumeration("TestStatus", ["enabled", "disabled"])
        .enumeration("TestType", ["collection", "tool"])
}

fn check(query: &str) -> Result<ValueType, Error> {
    validate(&parse(query).unwrap(), &schema(), &FunctionCatalog::odata())
}

// ============================================================================
// Valid filters
// ============================================================================

#[test_case("status eq TestStatus'enabled'" ; "enum equality")]
#[test_case("status ne TestStatus'disabled' and resource_type eq TestType'tool'" ; "two enums")]
#[test_case("status in (TestStatus'enabled', TestStatus'disabled')" ; "enum list")]
#[test_case("status eq null" ; "enum against null")]
#[test_case("status eq previous_status" ; "enum against same enum field")]
#[test_case("TestStatus'enabled' eq status" ; "enum literal on the left")]
#[test_case("status in statuses" ; "enum field in enum collection")]
#[test_case("TestStatus'enabled' in statuses" ; "enum literal in enum collection")]
#[test_case("author/name eq 'Bob' and id gt 5" ; "nested path")]
#[test_case("startswith(name, 'B') and length(name) lt 10" ; "string functions")]
#[test_case("substring(name, 1) eq 'ob'" ; "optional argument omitted")]
#[test_case("year(created_at) eq 2023 and birthday lt 2000-01-01" ; "date functions")]
#[test_case("created_at gt 2023-01-01T00:00Z sub duration'P1D'" ; "datetime arithmetic")]
#[test_case("timeout lt duration'PT30M'" ; "duration comparison")]
#[test_case("tags/any(t: contains(t, 'x'))" ; "lambda with call")]
#[test_case("'x' in tags" ; "in collection field")]
#[test_case("not active or id in (1, 2, 3)" ; "not and in")]
#[test_case("name eq null" ; "equality with null")]
fn test_valid_filter(query: &str) {
    assert_eq!(check(query), Ok(ValueType::Boolean));
}

// ============================================================================
// Enums
// ============================================================================

#[test]
fn test_invalid_enum_value() {
    let err = check("status eq TestStatus'invalid'").unwrap_err();
    assert_eq!(
        err,
        Error::InvalidEnumValue {
            value: "invalid".to_string(),
            enum_type: "TestStatus".to_string(),
            valid_values: vec!["enabled".to_string(), "disabled".to_string()],
        }
    );
    assert_eq!(
        err.to_string(),
        "Invalid enum value 'invalid' for type 'TestStatus'. Valid values are: enabled, disabled"
    );
}

#[test]
fn test_wrong_enum_type() {
    assert_eq!(
        check("status eq WrongEnum'enabled'"),
        Err(Error::EnumType {
            enum_type: "WrongEnum".to_string(),
            field: "status".to_string(),
        })
    );
}

#[test]
fn test_bare_string_against_enum() {
    let err = check("status eq 'enabled'").unwrap_err();
    assert_eq!(
        err,
        Error::EnumComparison {
            field: "status".to_string(),
        }
    );
    assert!(err.to_string().contains("EnumType'value'"));
}

#[test]
fn test_enum_checked_inside_list() {
    assert!(matches!(
        check("status in (TestStatus'enabled', TestStatus'gone')"),
        Err(Error::InvalidEnumValue { ref value, .. }) if value == "gone"
    ));
    assert!(matches!(
        check("status in (TestStatus'enabled', 'disabled')"),
        Err(Error::EnumComparison { .. })
    ));
}

#[test]
fn test_enum_against_other_enum_field() {
    assert_eq!(
        check("status eq resource_type"),
        Err(Error::EnumComparison {
            field: "status".to_string(),
        })
    );
}

#[test_case("name eq TestStatus'enabled'", "name" ; "string field")]
#[test_case("id eq TestStatus'enabled'", "id" ; "number field")]
#[test_case("TestStatus'enabled' eq name", "name" ; "literal on the left")]
#[test_case("TestStatus'enabled' in tags", "tags" ; "string collection")]
fn test_enum_literal_against_non_enum_field(query: &str, field: &str) {
    assert_eq!(
        check(query),
        Err(Error::EnumType {
            enum_type: "TestStatus".to_string(),
            field: field.to_string(),
        })
    );
}

#[test]
fn test_enum_in_requires_list_or_collection() {
    assert_eq!(
        check("status in TestStatus'enabled'"),
        Err(Error::type_error("in", "TestStatus'enabled'"))
    );
    assert_eq!(
        check("status in tags"),
        Err(Error::EnumComparison {
            field: "status".to_string(),
        })
    );
    assert_eq!(check("status in name"), Err(Error::type_error("in", "name")));
}

#[test]
fn test_standalone_enum_literal_of_unknown_type() {
    assert_eq!(check("name eq Unknown'x'"), Err(Error::value("Unknown'x'")));
}

// ============================================================================
// Functions
// ============================================================================

#[test_case("startswith(name)" ; "too few")]
#[test_case("startswith(name, 'a', 'b')" ; "too many")]
fn test_exact_arity(query: &str) {
    let err = check(query).unwrap_err();
    let Error::ArgumentCount { function, min, max, .. } = &err else {
        panic!("expected argument count error, got {err:?}");
    };
    assert_eq!(function, "startswith");
    assert_eq!((min, max), (&2, &2));
    assert!(err.is_function_call_error());
}

#[test]
fn test_arity_messages() {
    assert_eq!(
        check("startswith(name)").unwrap_err().to_string(),
        "Function 'startswith' takes 2 arguments. 1 given."
    );
    assert_eq!(
        check("substring(name, 1, 2, 3) eq 'x'").unwrap_err().to_string(),
        "Function 'substring' takes between 2 and 3 arguments. 4 given."
    );
}

#[test]
fn test_unknown_function() {
    let expr = parse("foo(a,b) eq true").unwrap();
    assert_eq!(
        validate(&expr, &schema(), &FunctionCatalog::odata()),
        Err(Error::UnknownFunction {
            function: "foo".to_string(),
        })
    );
}

#[test]
fn test_unknown_function_reported_before_fields() {
    // `a` and `b` are not in the schema either.
    assert!(matches!(
        check("foo(a, b) eq true"),
        Err(Error::UnknownFunction { .. })
    ));
}

#[test]
fn test_unsupported_function() {
    assert_eq!(
        check("matchespattern(name, '^A')"),
        Err(Error::UnsupportedFunction {
            function: "matchespattern".to_string(),
        })
    );
}

#[test]
fn test_argument_type() {
    assert_eq!(
        check("contains(id, 'x')"),
        Err(Error::ArgumentType {
            function: Some("contains".to_string()),
            expected: Some("string".to_string()),
            actual: Some("number".to_string()),
        })
    );
}

#[test]
fn test_custom_catalog() {
    let mut functions = FunctionCatalog::empty();
    functions.register(FunctionSignature::new(
        "startswith",
        vec![ParamType::String, ParamType::String],
        ValueType::Boolean,
    ));
    let schema = schema();

    let ok = parse("startswith(name, 'a')").unwrap();
    assert_eq!(validate(&ok, &schema, &functions), Ok(ValueType::Boolean));

    let missing = parse("contains(name, 'a')").unwrap();
    assert!(matches!(
        validate(&missing, &schema, &functions),
        Err(Error::UnknownFunction { .. })
    ));
}

// ============================================================================
// Fields, types and values
// ============================================================================

#[test]
fn test_invalid_field() {
    assert_eq!(check("nope eq 1"), Err(Error::invalid_field("nope")));
    assert_eq!(
        check("author/nope/deeper eq 1"),
        Err(Error::invalid_field("author/nope"))
    );
}

#[test_case("id gt null", "gt" ; "ordering against null")]
#[test_case("status lt null", "lt" ; "enum ordering against null")]
fn test_ordering_against_null(query: &str, operation: &str) {
    assert_eq!(check(query), Err(Error::type_error(operation, "null")));
}

#[test]
fn test_type_errors() {
    assert_eq!(check("-active"), Err(Error::type_error("-", "active")));
    assert_eq!(check("not name"), Err(Error::type_error("not", "name")));
    assert_eq!(check("active and id"), Err(Error::type_error("and", "id")));
    assert_eq!(check("name add 1 eq 2"), Err(Error::type_error("add", "name")));
    assert_eq!(check("id eq 'x'"), Err(Error::type_error("eq", "'x'")));
    assert_eq!(check("id in ('a', 'b')"), Err(Error::type_error("in", "id")));
    assert_eq!(check("name"), Err(Error::type_error("filter", "name")));
}

#[test_case("birthday eq 2023-02-30", "2023-02-30" ; "impossible date")]
#[test_case("created_at eq 2023-01-01T24:00", "2023-01-01T24:00" ; "impossible time")]
#[test_case("timeout eq duration'P'", "P" ; "empty duration")]
#[test_case("name eq binary'@@'", "@@" ; "bad base64")]
fn test_invalid_literal_values(query: &str, value: &str) {
    let err = check(query).unwrap_err();
    assert_eq!(err, Error::value(value));
    assert!(!err.is_syntax_error());
}

// ============================================================================
// Lambda scopes
// ============================================================================

#[test]
fn test_lambda_scope_ends_with_predicate() {
    assert_eq!(
        check("tags/any(t: t eq 'a') or t eq 'b'"),
        Err(Error::invalid_field("t"))
    );
}

#[test]
fn test_validator_is_reusable() {
    let schema = schema();
    let functions = FunctionCatalog::odata();
    let mut validator = SchemaValidator::new(&schema, &functions);

    let bad = parse("tags/any(t: t eq 1)").unwrap();
    assert!(validator.validate(&bad).is_err());

    let good = parse("name eq 'x'").unwrap();
    assert_eq!(validator.validate(&good), Ok(ValueType::Boolean));

    // The visitor entry point yields the type of any node, not just filters.
    let literal = Expr::number("1");
    assert_eq!(validator.visit(&literal), Ok(ValueType::Number));
}
