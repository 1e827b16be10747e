//! Canonical query text.
//!
//! [`print`] rebuilds query text from an AST with normalised whitespace and
//! only the parentheses the grammar needs. Parsing its output yields a tree
//! equal to the input tree: enum type names and values are kept verbatim and
//! `and`/`or` operand order is preserved.
//!
//! # Examples
//!
//! ```
//! use odata_filter::{parse, print};
//!
//! let ast = parse("(a  eq 1)and b/c ne   'it''s'").unwrap();
//! assert_eq!(print(&ast), "a eq 1 and b/c ne 'it''s'");
//! ```

use crate::ast::{
    BinaryOperator, BoolOperator, Comparator, Expr, LambdaOperator, LiteralKind, UnaryOperator,
};
use crate::visitor::{Visited, Visitor};
use std::convert::Infallible;

const OR: u8 = 1;
const AND: u8 = 2;
const NOT: u8 = 3;
const COMPARE: u8 = 4;
const ADDITIVE: u8 = 5;
const MULTIPLICATIVE: u8 = 6;
const NEGATE: u8 = 7;
const PRIMARY: u8 = 8;

/// Binding strength of the production that yields `expr`.
fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::BoolOp {
            op: BoolOperator::Or,
            ..
        } => OR,
        Expr::BoolOp {
            op: BoolOperator::And,
            ..
        } => AND,
        Expr::UnaryOp {
            op: UnaryOperator::Not,
            ..
        } => NOT,
        Expr::Compare { .. } => COMPARE,
        Expr::BinOp { op, .. } if op.is_additive() => ADDITIVE,
        Expr::BinOp { .. } => MULTIPLICATIVE,
        Expr::UnaryOp {
            op: UnaryOperator::Negate,
            ..
        } => NEGATE,
        _ => PRIMARY,
    }
}

/// Wraps the text in parentheses when `wrap` holds.
fn group(visited: Visited<'_, String>, wrap: impl Fn(u8) -> bool) -> String {
    if wrap(precedence(visited.node)) {
        format!("({})", visited.output)
    } else {
        visited.output
    }
}

pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Visitor producing canonical query text.
#[derive(Debug, Default, Clone, Copy)]
pub struct Printer;

impl Visitor for Printer {
    type Output = String;
    type Error = Infallible;

    fn visit_identifier(&mut self, name: &str) -> Result<String, Infallible> {
        Ok(name.to_string())
    }

    fn visit_literal(&mut self, kind: LiteralKind, value: &str) -> Result<String, Infallible> {
        Ok(match kind {
            LiteralKind::String => quote(value),
            LiteralKind::Duration | LiteralKind::Binary => format!("{kind}{}", quote(value)),
            _ => value.to_string(),
        })
    }

    fn visit_enum_literal(&mut self, type_name: &str, value: &str) -> Result<String, Infallible> {
        Ok(format!("{type_name}{}", quote(value)))
    }

    fn visit_attribute(&mut self, base: &Expr, name: &str) -> Result<String, Infallible> {
        Ok(format!("{}/{name}", self.visit(base)?))
    }

    fn visit_collection_lambda(
        &mut self,
        operator: LambdaOperator,
        collection: &Expr,
        lambda_var: &str,
        predicate: &Expr,
    ) -> Result<String, Infallible> {
        Ok(format!(
            "{}/{operator}({lambda_var}: {})",
            self.visit(collection)?,
            self.visit(predicate)?
        ))
    }

    fn fold_unary_op(
        &mut self,
        op: UnaryOperator,
        operand: Visited<'_, String>,
    ) -> Result<String, Infallible> {
        Ok(match op {
            UnaryOperator::Not => format!("not {}", group(operand, |p| p < NEGATE)),
            UnaryOperator::Negate => format!("-{}", group(operand, |p| p < NEGATE)),
        })
    }

    fn fold_bin_op(
        &mut self,
        op: BinaryOperator,
        left: Visited<'_, String>,
        right: Visited<'_, String>,
    ) -> Result<String, Infallible> {
        let level = if op.is_additive() {
            ADDITIVE
        } else {
            MULTIPLICATIVE
        };
        Ok(format!(
            "{} {op} {}",
            group(left, |p| p < level),
            group(right, |p| p <= level)
        ))
    }

    fn fold_bool_op(
        &mut self,
        op: BoolOperator,
        operands: Vec<Visited<'_, String>>,
    ) -> Result<String, Infallible> {
        let level = match op {
            BoolOperator::Or => OR,
            BoolOperator::And => AND,
        };
        let parts: Vec<String> = operands
            .into_iter()
            .map(|operand| group(operand, |p| p <= level))
            .collect();
        Ok(parts.join(&format!(" {op} ")))
    }

    fn fold_compare(
        &mut self,
        comparator: Comparator,
        left: Visited<'_, String>,
        right: Visited<'_, String>,
    ) -> Result<String, Infallible> {
        Ok(format!(
            "{} {comparator} {}",
            group(left, |p| p <= COMPARE),
            group(right, |p| p <= COMPARE)
        ))
    }

    fn fold_list(&mut self, items: Vec<Visited<'_, String>>) -> Result<String, Infallible> {
        let items: Vec<String> = items.into_iter().map(|item| item.output).collect();
        Ok(format!("({})", items.join(", ")))
    }

    fn fold_call(
        &mut self,
        function_name: &str,
        args: Vec<Visited<'_, String>>,
    ) -> Result<String, Infallible> {
        let args: Vec<String> = args.into_iter().map(|arg| arg.output).collect();
        Ok(format!("{function_name}({})", args.join(", ")))
    }
}

/// Canonical text of `expr`.
pub fn print(expr: &Expr) -> String {
    match Printer.visit(expr) {
        Ok(text) => text,
        Err(never) => match never {},
    }
}
