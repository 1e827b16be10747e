// tests/parser_tests.rs

use odata_filter::parser::MAX_DEPTH;
use odata_filter::{
    BinaryOperator, BoolOperator, Comparator, Error, Expr, Keyword, LambdaOperator, LiteralKind,
    Parser, TokenKind, UnaryOperator, parse, parse_tokens, tokenize,
};

fn cmp(name: &str, comparator: Comparator, value: &str) -> Expr {
    Expr::compare(comparator, Expr::identifier(name), Expr::number(value))
}

// ============================================================================
// Precedence and associativity
// ============================================================================

#[test]
fn test_and_binds_tighter_than_or() {
    let expr = parse("a eq 1 or b eq 2 and c eq 3").unwrap();
    let and = Expr::bool_op(
        BoolOperator::And,
        vec![cmp("b", Comparator::Eq, "2"), cmp("c", Comparator::Eq, "3")],
    )
    .unwrap();
    assert_eq!(
        expr,
        Expr::bool_op(BoolOperator::Or, vec![cmp("a", Comparator::Eq, "1"), and]).unwrap()
    );
}

#[test]
fn test_and_chain_is_flattened() {
    let expr = parse("a eq 1 and b eq 2 and c eq 3").unwrap();
    assert_eq!(
        expr,
        Expr::BoolOp {
            op: BoolOperator::And,
            operands: vec![
                cmp("a", Comparator::Eq, "1"),
                cmp("b", Comparator::Eq, "2"),
                cmp("c", Comparator::Eq, "3"),
            ],
        }
    );
}

#[test]
fn test_parenthesised_chain_stays_nested() {
    let expr = parse("(a eq 1 and b eq 2) and c eq 3").unwrap();
    let Expr::BoolOp { operands, .. } = expr else {
        panic!("expected BoolOp");
    };
    assert_eq!(operands.len(), 2);
    assert!(matches!(operands[0], Expr::BoolOp { op: BoolOperator::And, .. }));
}

#[test]
fn test_arithmetic_precedence() {
    // Should be: Add(a, Mul(b, 2))
    let expr = parse("a add b mul 2 gt 10").unwrap();
    let Expr::Compare { left, .. } = expr else {
        panic!("expected Compare");
    };
    assert_eq!(
        *left,
        Expr::bin_op(
            BinaryOperator::Add,
            Expr::identifier("a"),
            Expr::bin_op(BinaryOperator::Mul, Expr::identifier("b"), Expr::number("2")),
        )
    );
}

#[test]
fn test_arithmetic_is_left_associative() {
    let expr = parse("a sub b sub c eq 0").unwrap();
    let Expr::Compare { left, .. } = expr else {
        panic!("expected Compare");
    };
    assert_eq!(
        *left,
        Expr::bin_op(
            BinaryOperator::Sub,
            Expr::bin_op(BinaryOperator::Sub, Expr::identifier("a"), Expr::identifier("b")),
            Expr::identifier("c"),
        )
    );
}

#[test]
fn test_not_and_negate() {
    assert_eq!(
        parse("not a").unwrap(),
        Expr::unary(UnaryOperator::Not, Expr::identifier("a"))
    );
    assert_eq!(
        parse("-a eq -1").unwrap(),
        Expr::compare(
            Comparator::Eq,
            Expr::unary(UnaryOperator::Negate, Expr::identifier("a")),
            Expr::unary(UnaryOperator::Negate, Expr::number("1")),
        )
    );
}

#[test]
fn test_not_binds_looser_than_comparison() {
    assert_eq!(
        parse("not a eq 1").unwrap(),
        Expr::unary(UnaryOperator::Not, cmp("a", Comparator::Eq, "1"))
    );
}

#[test]
fn test_chained_comparison_is_rejected() {
    let err = parse("a eq 1 eq 2").unwrap_err();
    let Error::Parsing { token } = err else {
        panic!("expected parsing error, got {err:?}");
    };
    assert_eq!(token.lexeme, "eq");
    assert_eq!(token.start, 7);
}

// ============================================================================
// Paths, calls and lambdas
// ============================================================================

#[test]
fn test_attribute_path() {
    assert_eq!(
        parse("a/b/c eq 1").unwrap(),
        Expr::compare(
            Comparator::Eq,
            Expr::attribute(Expr::attribute(Expr::identifier("a"), "b"), "c"),
            Expr::number("1"),
        )
    );
}

#[test]
fn test_function_call() {
    assert_eq!(
        parse("contains(name, 'Bob')").unwrap(),
        Expr::call("contains", vec![Expr::identifier("name"), Expr::string("Bob")])
    );
    assert_eq!(
        parse("now() gt 2023-01-01T00:00Z").unwrap(),
        Expr::compare(
            Comparator::Gt,
            Expr::call("now", vec![]),
            Expr::literal(LiteralKind::DateTime, "2023-01-01T00:00Z"),
        )
    );
}

#[test]
fn test_unknown_function_still_parses() {
    let expr = parse("foo(a,b) eq true").unwrap();
    assert_eq!(
        expr,
        Expr::compare(
            Comparator::Eq,
            Expr::call("foo", vec![Expr::identifier("a"), Expr::identifier("b")]),
            Expr::literal(LiteralKind::Boolean, "true"),
        )
    );
}

#[test]
fn test_collection_lambda() {
    assert_eq!(
        parse("author/books/any(b: b/title eq 'X')").unwrap(),
        Expr::CollectionLambda {
            operator: LambdaOperator::Any,
            collection: Box::new(Expr::attribute(Expr::identifier("author"), "books")),
            lambda_var: "b".to_string(),
            predicate: Box::new(Expr::compare(
                Comparator::Eq,
                Expr::attribute(Expr::identifier("b"), "title"),
                Expr::string("X"),
            )),
        }
    );
}

#[test]
fn test_lambda_requires_variable() {
    assert!(matches!(
        parse("tags/all(t eq 'x')"),
        Err(Error::Parsing { .. })
    ));
}

// ============================================================================
// Enum and prefixed literals
// ============================================================================

#[test]
fn test_enum_literal_fusion() {
    assert_eq!(
        parse("status eq TestStatus'enabled'").unwrap(),
        Expr::compare(
            Comparator::Eq,
            Expr::identifier("status"),
            Expr::enum_literal("TestStatus", "enabled"),
        )
    );
}

#[test]
fn test_enum_literal_requires_adjacency() {
    // With a space the identifier and the string are two separate operands.
    let err = parse("status eq TestStatus 'enabled'").unwrap_err();
    let Error::Parsing { token } = err else {
        panic!("expected parsing error, got {err:?}");
    };
    assert_eq!(token.kind, TokenKind::String);
}

#[test]
fn test_namespaced_enum_literal() {
    assert_eq!(
        parse("my.namespace.Status eq my.namespace.Status'pending'").unwrap(),
        Expr::compare(
            Comparator::Eq,
            Expr::identifier("my.namespace.Status"),
            Expr::enum_literal("my.namespace.Status", "pending"),
        )
    );
}

#[test]
fn test_duration_and_binary_prefixes() {
    assert_eq!(
        parse("d eq duration'P1DT2H'").unwrap(),
        Expr::compare(
            Comparator::Eq,
            Expr::identifier("d"),
            Expr::literal(LiteralKind::Duration, "P1DT2H"),
        )
    );
    assert_eq!(
        parse("b eq Binary'aGVsbG8'").unwrap(),
        Expr::compare(
            Comparator::Eq,
            Expr::identifier("b"),
            Expr::literal(LiteralKind::Binary, "aGVsbG8"),
        )
    );
}

// ============================================================================
// Lists and `in`
// ============================================================================

#[test]
fn test_in_list() {
    assert_eq!(
        parse("status in (TestStatus'enabled', TestStatus'disabled')").unwrap(),
        Expr::compare(
            Comparator::In,
            Expr::identifier("status"),
            Expr::List {
                items: vec![
                    Expr::enum_literal("TestStatus", "enabled"),
                    Expr::enum_literal("TestStatus", "disabled"),
                ],
            },
        )
    );
}

#[test]
fn test_in_single_and_empty_list() {
    assert_eq!(
        parse("a in (1)").unwrap(),
        Expr::compare(
            Comparator::In,
            Expr::identifier("a"),
            Expr::List {
                items: vec![Expr::number("1")],
            },
        )
    );
    assert_eq!(
        parse("a in ()").unwrap(),
        Expr::compare(Comparator::In, Expr::identifier("a"), Expr::List { items: vec![] })
    );
}

#[test]
fn test_in_collection_path() {
    assert_eq!(
        parse("'x' in tags").unwrap(),
        Expr::compare(Comparator::In, Expr::string("x"), Expr::identifier("tags"))
    );
}

#[test]
fn test_trailing_comma_is_rejected() {
    assert!(matches!(parse("a in (1, 2,)"), Err(Error::Parsing { .. })));
}

#[test]
fn test_in_list_is_the_whole_right_operand() {
    let err = parse("a in (b) add 1").unwrap_err();
    let Error::Parsing { token } = err else {
        panic!("expected a parsing error, got {err:?}");
    };
    assert_eq!(token.kind, TokenKind::Keyword(Keyword::Add));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_truncated_input() {
    assert_eq!(parse("status eq"), Err(Error::UnexpectedEndOfInput));
    assert_eq!(parse("(a eq 1"), Err(Error::UnexpectedEndOfInput));
    assert_eq!(parse(""), Err(Error::UnexpectedEndOfInput));
}

#[test]
fn test_leftover_token() {
    let err = parse("a eq 1)").unwrap_err();
    assert!(matches!(err, Error::Parsing { ref token } if token.kind == TokenKind::RParen));
    assert_eq!(err.to_string(), "Failed to parse at ')' (offset 6)");
}

#[test]
fn test_lexer_error_surfaces_from_parse() {
    assert_eq!(
        parse("status eq @bad"),
        Err(Error::Tokenizing {
            text: "@bad".to_string(),
            offset: 10,
        })
    );
}

#[test]
fn test_nesting_within_limit() {
    let depth = MAX_DEPTH / 2;
    let query = format!("{}a eq 1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(parse(&query).unwrap(), cmp("a", Comparator::Eq, "1"));
}

#[test]
fn test_deep_nesting_is_rejected() {
    let groups = format!("{}a eq 1{}", "(".repeat(500), ")".repeat(500));
    let nots = format!("{}a", "not ".repeat(500));
    let negations = format!("{}a eq 1", "-".repeat(500));

    for query in [groups, nots, negations] {
        assert!(
            matches!(parse(&query), Err(Error::Parsing { .. })),
            "accepted {} levels of nesting",
            query.len()
        );
    }
}

#[test]
fn test_parse_tokens_accepts_any_token_source() {
    let tokens: Vec<_> = tokenize("a eq 1").collect();
    assert_eq!(parse_tokens(tokens).unwrap(), cmp("a", Comparator::Eq, "1"));

    let mut parser = Parser::new(tokenize("a eq 1 and")).unwrap();
    assert_eq!(parser.parse(), Err(Error::UnexpectedEndOfInput));
}
