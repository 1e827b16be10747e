use crate::ast::{
    BinaryOperator, BoolOperator, Comparator, LambdaOperator, LiteralKind, UnaryOperator,
};
use serde::Serialize;

/// Abstract Syntax Tree node of a filter expression.
///
/// Nodes are plain owned values: once the parser returns a tree nothing
/// mutates it, so a tree can be shared read-only between traversals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Expr {
    // References
    /// Bare field reference
    ///
    /// # Example
    /// ```text
    /// status
    /// ```
    Identifier { name: String },

    /// One navigation step through a relation
    ///
    /// `base` is an `Identifier` or another `Attribute`.
    ///
    /// # Example
    /// ```text
    /// author/address/city
    /// ```
    Attribute { base: Box<Expr>, name: String },

    // Literals
    /// Literal value in its source form
    Literal { kind: LiteralKind, value: String },

    /// Unresolved `TypeName'value'` pair
    ///
    /// # Example
    /// ```text
    /// TestStatus'enabled'
    /// ```
    EnumLiteral { type_name: String, value: String },

    // Operations
    /// `not x` or `-x`
    UnaryOp {
        op: UnaryOperator,
        operand: Box<Expr>,
    },

    /// Arithmetic: `add`, `sub`, `mul`, `div`, `mod`
    BinOp {
        op: BinaryOperator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Flattened `and` / `or` chain with at least two operands
    BoolOp {
        op: BoolOperator,
        operands: Vec<Expr>,
    },

    /// Comparison
    ///
    /// # Examples
    /// ```text
    /// price gt 100
    /// status in (TestStatus'enabled', TestStatus'disabled')
    /// ```
    Compare {
        comparator: Comparator,
        left: Box<Expr>,
        right: Box<Expr>,
    },

    /// Parenthesised list, mostly the right-hand side of `in`
    List { items: Vec<Expr> },

    /// Function call, unchecked against any catalog
    ///
    /// # Example
    /// ```text
    /// startswith(name, 'A')
    /// ```
    Call {
        function_name: String,
        args: Vec<Expr>,
    },

    /// `any` / `all` over a collection-valued path
    ///
    /// `lambda_var` is only visible inside `predicate`.
    ///
    /// # Example
    /// ```text
    /// items/any(i: i/price gt 100)
    /// ```
    CollectionLambda {
        operator: LambdaOperator,
        collection: Box<Expr>,
        lambda_var: String,
        predicate: Box<Expr>,
    },
}

impl Expr {
    pub fn identifier(name: impl Into<String>) -> Self {
        Expr::Identifier { name: name.into() }
    }

    pub fn attribute(base: Expr, name: impl Into<String>) -> Self {
        Expr::Attribute {
            base: Box::new(base),
            name: name.into(),
        }
    }

    pub fn literal(kind: LiteralKind, value: impl Into<String>) -> Self {
        Expr::Literal {
            kind,
            value: value.into(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Expr::literal(LiteralKind::String, value)
    }

    pub fn number(value: impl Into<String>) -> Self {
        Expr::literal(LiteralKind::Number, value)
    }

    pub fn null() -> Self {
        Expr::literal(LiteralKind::Null, "null")
    }

    pub fn enum_literal(type_name: impl Into<String>, value: impl Into<String>) -> Self {
        Expr::EnumLiteral {
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    pub fn unary(op: UnaryOperator, operand: Expr) -> Self {
        Expr::UnaryOp {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn bin_op(op: BinaryOperator, left: Expr, right: Expr) -> Self {
        Expr::BinOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn compare(comparator: Comparator, left: Expr, right: Expr) -> Self {
        Expr::Compare {
            comparator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Builds a `BoolOp`, or returns the single operand when there is only one.
    ///
    /// Returns `None` for an empty operand list.
    pub fn bool_op(op: BoolOperator, mut operands: Vec<Expr>) -> Option<Self> {
        match operands.len() {
            0 => None,
            1 => operands.pop(),
            _ => Some(Expr::BoolOp { op, operands }),
        }
    }

    pub fn call(function_name: impl Into<String>, args: Vec<Expr>) -> Self {
        Expr::Call {
            function_name: function_name.into(),
            args,
        }
    }

    /// Segments of an `Identifier`/`Attribute` chain, root first.
    ///
    /// `None` for every other node.
    pub fn path_segments(&self) -> Option<Vec<&str>> {
        match self {
            Expr::Identifier { name } => Some(vec![name.as_str()]),
            Expr::Attribute { base, name } => {
                let mut segments = base.path_segments()?;
                segments.push(name.as_str());
                Some(segments)
            }
            _ => None,
        }
    }
}
