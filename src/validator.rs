//! Schema-aware checking of a parsed filter.
//!
//! [`SchemaValidator`] is a [`Visitor`] that computes the static type of each
//! node and rejects anything a query backend would fail on later: unknown
//! fields, unknown or misused functions, enum mismatches and operators
//! applied to operands of the wrong type.
//!
//! ```
//! use odata_filter::{Error, FunctionCatalog, Schema, ValueType, parse, validate};
//!
//! let schema = Schema::new()
//!     .field("name", ValueType::String)
//!     .field("status", ValueType::Enum("TestStatus".into()))
//!     .enumeration("TestStatus", ["enabled", "disabled"]);
//! let functions = FunctionCatalog::odata();
//!
//! let ok = parse("startswith(name, 'a') and status eq TestStatus'enabled'").unwrap();
//! assert_eq!(validate(&ok, &schema, &functions), Ok(ValueType::Boolean));
//!
//! let bad = parse("status eq 'enabled'").unwrap();
//! assert!(matches!(
//!     validate(&bad, &schema, &functions),
//!     Err(Error::EnumComparison { .. })
//! ));
//! ```

use crate::ast::{
    BinaryOperator, BoolOperator, Comparator, Expr, LambdaOperator, LiteralKind, UnaryOperator,
};
use crate::error::{Error, Result};
use crate::functions::{FunctionCatalog, FunctionSignature};
use crate::printer::print;
use crate::schema::{SchemaResolver, ValueType};
use crate::validate as rules;
use crate::visitor::{Visited, Visitor};
use tracing::{debug, trace};

/// A lambda variable in scope and the collection it ranges over.
#[derive(Debug, Clone)]
struct LambdaScope {
    var: String,
    collection: Vec<String>,
    element: ValueType,
}

pub struct SchemaValidator<'a> {
    schema: &'a dyn SchemaResolver,
    functions: &'a FunctionCatalog,
    scopes: Vec<LambdaScope>,
}

impl<'a> SchemaValidator<'a> {
    pub fn new(schema: &'a dyn SchemaResolver, functions: &'a FunctionCatalog) -> Self {
        SchemaValidator {
            schema,
            functions,
            scopes: Vec::new(),
        }
    }

    /// Checks a whole filter, which must be boolean.
    pub fn validate(&mut self, expr: &Expr) -> Result<ValueType> {
        let ty = self.visit(expr)?;
        if !is_boolean(&ty) {
            return Err(Error::type_error("filter", print(expr)));
        }
        Ok(ty)
    }

    /// Resolves a path, rewriting a leading lambda variable to the path of
    /// the collection it ranges over.
    fn resolve_segments(&self, segments: &[&str]) -> Result<(Vec<String>, ValueType)> {
        let Some((root, rest)) = segments.split_first() else {
            return Err(Error::invalid_field(""));
        };

        if let Some(scope) = self.scopes.iter().rev().find(|s| s.var == *root) {
            let mut path = scope.collection.clone();
            if rest.is_empty() {
                return Ok((path, scope.element.clone()));
            }
            path.extend(rest.iter().map(|s| s.to_string()));
            let ty = rules::resolve_path(self.schema, &path)?;
            return Ok((path, ty));
        }

        let path: Vec<String> = segments.iter().map(|s| s.to_string()).collect();
        let ty = rules::resolve_path(self.schema, &path)?;
        Ok((path, ty))
    }

    fn resolve_expr(&self, expr: &Expr) -> Result<(Vec<String>, ValueType)> {
        let segments = expr
            .path_segments()
            .ok_or_else(|| Error::invalid_field(print(expr)))?;
        self.resolve_segments(&segments)
    }

    /// Enum type of `expr` when it is a path to an enum field.
    fn enum_field(&self, expr: &Expr) -> Result<Option<String>> {
        if expr.path_segments().is_none() {
            return Ok(None);
        }
        match self.resolve_expr(expr)?.1 {
            ValueType::Enum(type_name) => Ok(Some(type_name)),
            _ => Ok(None),
        }
    }

    /// Checks the operand compared against an enum field.
    fn check_enum_operand(
        &self,
        comparator: Comparator,
        field: &Expr,
        enum_type: &str,
        other: &Expr,
    ) -> Result<()> {
        if comparator == Comparator::In {
            return self.check_enum_membership(field, enum_type, other);
        }

        let field_text = print(field);
        match other {
            Expr::EnumLiteral { type_name, value } => {
                rules::check_enum_literal(self.schema, &field_text, enum_type, type_name, value)
            }
            Expr::Literal {
                kind: LiteralKind::Null,
                ..
            } => rules::check_ordering(comparator, &ValueType::Null, "null"),
            _ if other.path_segments().is_some() => match self.resolve_expr(other)?.1 {
                ValueType::Enum(ref other_type) if other_type == enum_type => Ok(()),
                ValueType::Any => Ok(()),
                _ => Err(Error::EnumComparison { field: field_text }),
            },
            _ => Err(Error::EnumComparison { field: field_text }),
        }
    }

    /// `field in other` for an enum field: a list of members, or a
    /// collection of the same enum.
    fn check_enum_membership(&self, field: &Expr, enum_type: &str, other: &Expr) -> Result<()> {
        match other {
            Expr::List { items } => items.iter().try_for_each(|item| {
                self.check_enum_operand(Comparator::Eq, field, enum_type, item)
            }),
            _ if other.path_segments().is_some() => match self.resolve_expr(other)?.1 {
                ValueType::Collection(element) => match *element {
                    ValueType::Enum(ref element_type) if element_type == enum_type => Ok(()),
                    ValueType::Any => Ok(()),
                    _ => Err(Error::EnumComparison {
                        field: print(field),
                    }),
                },
                ValueType::Any => Ok(()),
                _ => Err(Error::type_error("in", print(other))),
            },
            _ => Err(Error::type_error("in", print(other))),
        }
    }

    /// An enum literal compared with a non-enum field. The literal must be
    /// valid on its own and then match the field's declared type. For `in`
    /// the field is a collection and its element type counts.
    fn check_enum_literal_field(
        &self,
        comparator: Comparator,
        literal: &Expr,
        field: &Expr,
    ) -> Result<()> {
        let Expr::EnumLiteral { type_name, value } = literal else {
            return Ok(());
        };
        if field.path_segments().is_none() {
            return Ok(());
        }
        rules::check_enum_member(self.schema, type_name, value)?;

        let ty = self.resolve_expr(field)?.1;
        let declared = match (comparator, &ty) {
            (Comparator::In, ValueType::Collection(element)) => element.as_ref(),
            _ => &ty,
        };
        match declared {
            ValueType::Enum(declared_type) if declared_type == type_name => Ok(()),
            ValueType::Any => Ok(()),
            _ => Err(Error::EnumType {
                enum_type: type_name.clone(),
                field: print(field),
            }),
        }
    }
}

/// Argument types of a call whose name and arity were already accepted.
fn check_arguments(
    signature: &FunctionSignature,
    args: &[Visited<'_, ValueType>],
) -> Result<ValueType> {
    for (index, arg) in args.iter().enumerate() {
        rules::check_argument(signature, index, &arg.output)?;
    }
    Ok(signature.returns.clone())
}

fn is_boolean(ty: &ValueType) -> bool {
    matches!(ty, ValueType::Boolean | ValueType::Any)
}

/// Text naming the operand that failed a check.
fn operand_text(visited: &Visited<'_, ValueType>) -> String {
    print(visited.node)
}

impl Visitor for SchemaValidator<'_> {
    type Output = ValueType;
    type Error = Error;

    fn visit_identifier(&mut self, name: &str) -> Result<ValueType> {
        Ok(self.resolve_segments(&[name])?.1)
    }

    fn visit_literal(&mut self, kind: LiteralKind, value: &str) -> Result<ValueType> {
        rules::decode_literal(kind, value)?;
        Ok(rules::literal_type(kind))
    }

    fn visit_enum_literal(&mut self, type_name: &str, value: &str) -> Result<ValueType> {
        rules::check_enum_member(self.schema, type_name, value)?;
        Ok(ValueType::Enum(type_name.to_string()))
    }

    fn visit_attribute(&mut self, base: &Expr, name: &str) -> Result<ValueType> {
        let Some(mut segments) = base.path_segments() else {
            return Err(Error::invalid_field(format!("{}/{name}", print(base))));
        };
        segments.push(name);
        Ok(self.resolve_segments(&segments)?.1)
    }

    fn visit_collection_lambda(
        &mut self,
        operator: LambdaOperator,
        collection: &Expr,
        lambda_var: &str,
        predicate: &Expr,
    ) -> Result<ValueType> {
        let (path, ty) = self.resolve_expr(collection)?;
        let ValueType::Collection(element) = ty else {
            return Err(Error::type_error(operator.as_str(), print(collection)));
        };

        trace!(var = lambda_var, collection = %path.join("/"), "entering lambda scope");
        self.scopes.push(LambdaScope {
            var: lambda_var.to_string(),
            collection: path,
            element: *element,
        });
        let result = self.visit(predicate);
        self.scopes.pop();

        if !is_boolean(&result?) {
            return Err(Error::type_error(operator.as_str(), print(predicate)));
        }
        Ok(ValueType::Boolean)
    }

    fn visit_compare(
        &mut self,
        comparator: Comparator,
        left: &Expr,
        right: &Expr,
    ) -> Result<ValueType> {
        // The right side of `in` is a collection, never the enum field itself.
        let sides: &[(&Expr, &Expr)] = if comparator == Comparator::In {
            &[(left, right)]
        } else {
            &[(left, right), (right, left)]
        };
        for &(field, other) in sides {
            if let Some(enum_type) = self.enum_field(field)? {
                debug!(field = %print(field), enum_type = %enum_type, "checking enum comparison");
                self.check_enum_operand(comparator, field, &enum_type, other)?;
                return Ok(ValueType::Boolean);
            }
        }
        self.check_enum_literal_field(comparator, left, right)?;
        self.check_enum_literal_field(comparator, right, left)?;

        let left_type = self.visit(left)?;
        let right_type = self.visit(right)?;
        self.fold_compare(
            comparator,
            Visited {
                node: left,
                output: left_type,
            },
            Visited {
                node: right,
                output: right_type,
            },
        )
    }

    fn visit_call(&mut self, function_name: &str, args: &[Expr]) -> Result<ValueType> {
        // Name and arity are reported before anything about the arguments.
        let functions = self.functions;
        let signature = rules::check_function(functions, function_name, args.len())?;
        let args = self.visit_all(args)?;
        check_arguments(signature, &args)
    }

    fn fold_unary_op(
        &mut self,
        op: UnaryOperator,
        operand: Visited<'_, ValueType>,
    ) -> Result<ValueType> {
        let accepted = match op {
            UnaryOperator::Not => is_boolean(&operand.output),
            UnaryOperator::Negate => matches!(
                operand.output,
                ValueType::Number | ValueType::Duration | ValueType::Any
            ),
        };
        if !accepted {
            let operation = match op {
                UnaryOperator::Not => "not",
                UnaryOperator::Negate => "-",
            };
            return Err(Error::type_error(operation, operand_text(&operand)));
        }
        Ok(operand.output)
    }

    fn fold_bin_op(
        &mut self,
        op: BinaryOperator,
        left: Visited<'_, ValueType>,
        right: Visited<'_, ValueType>,
    ) -> Result<ValueType> {
        use ValueType::*;

        let result = match (&left.output, &right.output) {
            (Any, _) | (_, Any) => Some(Any),
            (Number, Number) => Some(Number),
            (Duration, Duration) if op.is_additive() => Some(Duration),
            (Date | Datetime, Duration) if op.is_additive() => Some(left.output.clone()),
            (Date, Date) | (Datetime, Datetime) if op == BinaryOperator::Sub => Some(Duration),
            (Duration, Number) if matches!(op, BinaryOperator::Mul | BinaryOperator::Div) => {
                Some(Duration)
            }
            _ => None,
        };

        result.ok_or_else(|| {
            let offending = if matches!(left.output, Number | Date | Datetime | Duration) {
                &right
            } else {
                &left
            };
            Error::type_error(op.as_str(), operand_text(offending))
        })
    }

    fn fold_bool_op(
        &mut self,
        op: BoolOperator,
        operands: Vec<Visited<'_, ValueType>>,
    ) -> Result<ValueType> {
        if let Some(operand) = operands.iter().find(|o| !is_boolean(&o.output)) {
            return Err(Error::type_error(op.as_str(), operand_text(operand)));
        }
        Ok(ValueType::Boolean)
    }

    fn fold_compare(
        &mut self,
        comparator: Comparator,
        left: Visited<'_, ValueType>,
        right: Visited<'_, ValueType>,
    ) -> Result<ValueType> {
        rules::check_ordering(comparator, &left.output, &operand_text(&left))?;
        rules::check_ordering(comparator, &right.output, &operand_text(&right))?;

        if comparator == Comparator::In {
            let element = match &right.output {
                ValueType::Collection(element) => element.as_ref(),
                ValueType::Any => &ValueType::Any,
                _ => return Err(Error::type_error("in", operand_text(&right))),
            };
            if !rules::comparable(&left.output, element) {
                return Err(Error::type_error("in", operand_text(&left)));
            }
            return Ok(ValueType::Boolean);
        }

        if !rules::comparable(&left.output, &right.output) {
            // Blame the literal side when there is one.
            let offending = match left.node {
                Expr::Literal { .. } => &left,
                _ => &right,
            };
            return Err(Error::type_error(comparator.as_str(), operand_text(offending)));
        }
        Ok(ValueType::Boolean)
    }

    fn fold_list(&mut self, items: Vec<Visited<'_, ValueType>>) -> Result<ValueType> {
        let mut element = ValueType::Any;
        for item in &items {
            if matches!(item.output, ValueType::Null | ValueType::Any) {
                continue;
            }
            if element.is_any() {
                element = item.output.clone();
            } else if !rules::comparable(&element, &item.output) {
                return Err(Error::type_error("in", operand_text(item)));
            }
        }
        Ok(ValueType::Collection(Box::new(element)))
    }

    fn fold_call(
        &mut self,
        function_name: &str,
        args: Vec<Visited<'_, ValueType>>,
    ) -> Result<ValueType> {
        let signature = rules::check_function(self.functions, function_name, args.len())?;
        check_arguments(signature, &args)
    }
}

/// Checks `expr` against `schema` and `functions`, returning its type.
pub fn validate(
    expr: &Expr,
    schema: &dyn SchemaResolver,
    functions: &FunctionCatalog,
) -> Result<ValueType> {
    SchemaValidator::new(schema, functions).validate(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::schema::Schema;

    fn schema() -> Schema {
        Schema::new()
            .field("price", ValueType::Number)
            .field("tags", ValueType::Collection(Box::new(ValueType::String)))
            .field("items", ValueType::Collection(Box::new(ValueType::Entity)))
            .field("items/qty", ValueType::Number)
    }

    fn check(query: &str) -> Result<ValueType> {
        validate(&parse(query).unwrap(), &schema(), &FunctionCatalog::odata())
    }

    #[test]
    fn test_lambda_variable_resolves_through_collection() {
        assert_eq!(check("items/any(i: i/qty gt 2)"), Ok(ValueType::Boolean));
        assert_eq!(check("tags/all(t: t ne 'x')"), Ok(ValueType::Boolean));
        assert_eq!(
            check("items/any(i: i/missing gt 2)"),
            Err(Error::invalid_field("items/missing"))
        );
    }

    #[test]
    fn test_lambda_variable_out_of_scope() {
        assert_eq!(
            check("tags/any(t: t eq 'x') and t eq 'y'"),
            Err(Error::invalid_field("t"))
        );
    }

    #[test]
    fn test_lambda_over_non_collection() {
        assert_eq!(check("price/any(p: p gt 1)"), Err(Error::type_error("any", "price")));
    }

    #[test]
    fn test_non_boolean_filter() {
        assert_eq!(check("price add 1"), Err(Error::type_error("filter", "price add 1")));
    }

    #[test]
    fn test_arithmetic_operands() {
        assert_eq!(check("price mul 2 gt 10"), Ok(ValueType::Boolean));
        assert_eq!(check("price add 'x' gt 1"), Err(Error::type_error("add", "'x'")));
        assert_eq!(check("-true eq 1"), Err(Error::type_error("-", "true")));
    }

    #[test]
    fn test_call_arity_reported_before_arguments() {
        assert!(matches!(
            check("length('a' add 1, 2) gt 1"),
            Err(Error::ArgumentCount { ref function, .. }) if function == "length"
        ));
        assert!(matches!(check("length(price) gt 1"), Err(Error::ArgumentType { .. })));
        assert_eq!(check("length('abc') gt 1"), Ok(ValueType::Boolean));
    }

    #[test]
    fn test_fold_call_checks_visited_arguments() {
        let schema = schema();
        let catalog = FunctionCatalog::odata();
        let mut validator = SchemaValidator::new(&schema, &catalog);
        let arg = Expr::identifier("price");

        let args = vec![Visited {
            node: &arg,
            output: ValueType::Number,
        }];
        assert!(matches!(validator.fold_call("length", args), Err(Error::ArgumentType { .. })));

        let args = vec![Visited {
            node: &arg,
            output: ValueType::String,
        }];
        assert_eq!(validator.fold_call("length", args), Ok(ValueType::Number));
    }
}
