//! Generic AST traversal.
//!
//! A backend implements [`Visitor`] once and gets [`Visitor::visit`], which
//! routes each node to the handler for its variant. The trait is generic over
//! what handlers produce (`Output`) and what they fail with (`Error`); the
//! dispatcher adds no work of its own and passes handler errors through
//! untouched.
//!
//! Every variant has a required handler, so a backend that forgets one does
//! not compile:
//!
//! - leaves (`visit_identifier`, `visit_literal`, `visit_enum_literal`);
//! - scope-sensitive nodes (`visit_attribute`, `visit_collection_lambda`),
//!   whose handlers always drive their own recursion;
//! - composites (`fold_unary_op`, `fold_bin_op`, `fold_bool_op`,
//!   `fold_compare`, `fold_list`, `fold_call`). Their provided `visit_*`
//!   method visits the children first and hands each child together with its
//!   result to the `fold_*` handler. Override the `visit_*` method to take
//!   control of the recursion instead.
//!
//! A construct a backend cannot translate is reported by the backend itself,
//! e.g. with [`Error::unsupported`](crate::Error::unsupported), which is
//! distinct from every invalid-input error.

use crate::ast::{
    BinaryOperator, BoolOperator, Comparator, Expr, LambdaOperator, LiteralKind, UnaryOperator,
};

/// A child node paired with the result of visiting it.
#[derive(Debug, Clone, Copy)]
pub struct Visited<'a, T> {
    pub node: &'a Expr,
    pub output: T,
}

pub trait Visitor {
    type Output;
    type Error;

    fn visit(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::Identifier { name } => self.visit_identifier(name),
            Expr::Attribute { base, name } => self.visit_attribute(base, name),
            Expr::Literal { kind, value } => self.visit_literal(*kind, value),
            Expr::EnumLiteral { type_name, value } => self.visit_enum_literal(type_name, value),
            Expr::UnaryOp { op, operand } => self.visit_unary_op(*op, operand),
            Expr::BinOp { op, left, right } => self.visit_bin_op(*op, left, right),
            Expr::BoolOp { op, operands } => self.visit_bool_op(*op, operands),
            Expr::Compare {
                comparator,
                left,
                right,
            } => self.visit_compare(*comparator, left, right),
            Expr::List { items } => self.visit_list(items),
            Expr::Call {
                function_name,
                args,
            } => self.visit_call(function_name, args),
            Expr::CollectionLambda {
                operator,
                collection,
                lambda_var,
                predicate,
            } => self.visit_collection_lambda(*operator, collection, lambda_var, predicate),
        }
    }

    /// Visits each node in order, stopping at the first error.
    fn visit_all<'a>(
        &mut self,
        nodes: &'a [Expr],
    ) -> Result<Vec<Visited<'a, Self::Output>>, Self::Error> {
        nodes
            .iter()
            .map(|node| {
                Ok(Visited {
                    node,
                    output: self.visit(node)?,
                })
            })
            .collect()
    }

    // Leaves
    fn visit_identifier(&mut self, name: &str) -> Result<Self::Output, Self::Error>;

    fn visit_literal(
        &mut self,
        kind: LiteralKind,
        value: &str,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_enum_literal(
        &mut self,
        type_name: &str,
        value: &str,
    ) -> Result<Self::Output, Self::Error>;

    // Scope-sensitive nodes
    fn visit_attribute(&mut self, base: &Expr, name: &str) -> Result<Self::Output, Self::Error>;

    fn visit_collection_lambda(
        &mut self,
        operator: LambdaOperator,
        collection: &Expr,
        lambda_var: &str,
        predicate: &Expr,
    ) -> Result<Self::Output, Self::Error>;

    // Composites: children first, then fold
    fn visit_unary_op(
        &mut self,
        op: UnaryOperator,
        operand: &Expr,
    ) -> Result<Self::Output, Self::Error> {
        let output = self.visit(operand)?;
        self.fold_unary_op(
            op,
            Visited {
                node: operand,
                output,
            },
        )
    }

    fn visit_bin_op(
        &mut self,
        op: BinaryOperator,
        left: &Expr,
        right: &Expr,
    ) -> Result<Self::Output, Self::Error> {
        let left_output = self.visit(left)?;
        let right_output = self.visit(right)?;
        self.fold_bin_op(
            op,
            Visited {
                node: left,
                output: left_output,
            },
            Visited {
                node: right,
                output: right_output,
            },
        )
    }

    fn visit_bool_op(
        &mut self,
        op: BoolOperator,
        operands: &[Expr],
    ) -> Result<Self::Output, Self::Error> {
        let operands = self.visit_all(operands)?;
        self.fold_bool_op(op, operands)
    }

    fn visit_compare(
        &mut self,
        comparator: Comparator,
        left: &Expr,
        right: &Expr,
    ) -> Result<Self::Output, Self::Error> {
        let left_output = self.visit(left)?;
        let right_output = self.visit(right)?;
        self.fold_compare(
            comparator,
            Visited {
                node: left,
                output: left_output,
            },
            Visited {
                node: right,
                output: right_output,
            },
        )
    }

    fn visit_list(&mut self, items: &[Expr]) -> Result<Self::Output, Self::Error> {
        let items = self.visit_all(items)?;
        self.fold_list(items)
    }

    fn visit_call(
        &mut self,
        function_name: &str,
        args: &[Expr],
    ) -> Result<Self::Output, Self::Error> {
        let args = self.visit_all(args)?;
        self.fold_call(function_name, args)
    }

    fn fold_unary_op(
        &mut self,
        op: UnaryOperator,
        operand: Visited<'_, Self::Output>,
    ) -> Result<Self::Output, Self::Error>;

    fn fold_bin_op(
        &mut self,
        op: BinaryOperator,
        left: Visited<'_, Self::Output>,
        right: Visited<'_, Self::Output>,
    ) -> Result<Self::Output, Self::Error>;

    fn fold_bool_op(
        &mut self,
        op: BoolOperator,
        operands: Vec<Visited<'_, Self::Output>>,
    ) -> Result<Self::Output, Self::Error>;

    fn fold_compare(
        &mut self,
        comparator: Comparator,
        left: Visited<'_, Self::Output>,
        right: Visited<'_, Self::Output>,
    ) -> Result<Self::Output, Self::Error>;

    fn fold_list(
        &mut self,
        items: Vec<Visited<'_, Self::Output>>,
    ) -> Result<Self::Output, Self::Error>;

    fn fold_call(
        &mut self,
        function_name: &str,
        args: Vec<Visited<'_, Self::Output>>,
    ) -> Result<Self::Output, Self::Error>;
}
