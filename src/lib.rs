//! Parser for OData v4 `$filter` expressions.
//!
//! Query text goes through the [`Lexer`] and [`Parser`] into an [`Expr`]
//! tree. Backends walk the tree with a [`Visitor`]: the bundled [`Printer`]
//! turns it back into canonical text and [`SchemaValidator`] checks it
//! against a [`Schema`] and a [`FunctionCatalog`].
//!
//! ```
//! use odata_filter::{Comparator, Expr, parse, print};
//!
//! let ast = parse("name eq 'Bob'").unwrap();
//! assert_eq!(
//!     ast,
//!     Expr::compare(Comparator::Eq, Expr::identifier("name"), Expr::string("Bob"))
//! );
//! assert_eq!(print(&ast), "name eq 'Bob'");
//! ```

pub mod ast;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod schema;
pub mod validate;
pub mod validator;
pub mod visitor;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{
    BinaryOperator, BoolOperator, Comparator, Expr, Keyword, LambdaOperator, LiteralKind, Token,
    TokenKind, UnaryOperator,
};
pub use error::{Error, Result};
pub use functions::{FunctionCatalog, FunctionSignature, ParamType};
pub use lexer::Lexer;
pub use parser::Parser;
pub use printer::{Printer, print};
pub use schema::{Schema, SchemaResolver, ValueType};
pub use validator::{SchemaValidator, validate};
pub use visitor::{Visited, Visitor};

/// Lazily tokenizes `input`; each call starts a fresh pass.
pub fn tokenize(input: &str) -> Lexer<'_> {
    Lexer::new(input)
}

/// Parses filter text into an AST.
pub fn parse(input: &str) -> Result<Expr> {
    parse_tokens(tokenize(input))
}

/// Parses an already tokenized query.
pub fn parse_tokens<I>(tokens: I) -> Result<Expr>
where
    I: IntoIterator<Item = Result<Token>>,
{
    Parser::new(tokens)?.parse()
}
