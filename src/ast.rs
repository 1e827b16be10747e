//! # OData `$filter` - Abstract Syntax Tree
//!
//! This module defines the tokens and the syntax tree of the OData `$filter`
//! expression language.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer, with byte offsets
//! - **[expressions]** - Expression nodes (references, literals, operations)
//! - **[operators]** - Unary, arithmetic, logical, comparison and lambda operators
//! - **[literals]** - Literal kinds
//!
//! ## Quick Start
//!
//! ```text
//! status eq TestStatus'enabled' and items/any(i: i/price gt 100)
//! ```
//!
//! parses to
//!
//! ```text
//! BoolOp(And, [
//!     Compare(Eq, Identifier(status), EnumLiteral(TestStatus, enabled)),
//!     CollectionLambda(Any, Identifier(items), i,
//!         Compare(Gt, Attribute(Identifier(i), price), Literal(Number, 100))),
//! ])
//! ```
//!
//! ## Precedence
//!
//! From loosest to tightest: `or`, `and`, `not`, comparison
//! (`eq ne gt ge lt le in`), `add sub`, `mul div mod`, unary `-`, primary.
//! `and`/`or` chains become one n-ary [`Expr::BoolOp`]; a comparison takes
//! exactly one comparator.
//!
//! ## Enum Literals
//!
//! The lexer has no rule for `Type'value'`. It emits an identifier and a
//! string; the parser fuses the two into [`Expr::EnumLiteral`] only when the
//! string starts at the very offset the identifier ends. The enum is never
//! resolved here: that is a backend job (see [`crate::validate`]).
pub mod expressions;
pub mod literals;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use literals::LiteralKind;
pub use operators::{BinaryOperator, BoolOperator, Comparator, LambdaOperator, UnaryOperator};
pub use tokens::{Keyword, Token, TokenKind};
