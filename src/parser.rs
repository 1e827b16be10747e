use crate::{
    ast::{
        BinaryOperator, BoolOperator, Comparator, Expr, Keyword, LambdaOperator, LiteralKind,
        Token, TokenKind, UnaryOperator,
    },
    error::{Error, Result},
};
use tracing::{debug, trace};

/// Deepest nesting of groups, `not` and unary minus the parser accepts.
pub const MAX_DEPTH: usize = 64;

/// Recursive-descent parser over any token sequence.
///
/// The parser pulls tokens lazily and keeps at most one token of lookahead
/// beyond the current one. Lexer errors surface unchanged. Nesting deeper
/// than [`MAX_DEPTH`] is a parsing error on the token that crosses it.
pub struct Parser<I>
where
    I: Iterator<Item = Result<Token>>,
{
    tokens: I,
    current: Option<Token>,
    lookahead: Option<Token>,
    depth: usize,
}

impl<I> Parser<I>
where
    I: Iterator<Item = Result<Token>>,
{
    pub fn new<T>(tokens: T) -> Result<Self>
    where
        T: IntoIterator<IntoIter = I>,
    {
        let mut tokens = tokens.into_iter();
        let current = tokens.next().transpose()?;
        Ok(Parser {
            tokens,
            current,
            lookahead: None,
            depth: 0,
        })
    }

    /// Moves to the next token and hands back the one just left.
    fn advance(&mut self) -> Result<Option<Token>> {
        let next = match self.lookahead.take() {
            Some(token) => Some(token),
            None => self.tokens.next().transpose()?,
        };
        Ok(std::mem::replace(&mut self.current, next))
    }

    /// The token after the current one.
    fn peek(&mut self) -> Result<Option<&Token>> {
        if self.lookahead.is_none() {
            self.lookahead = self.tokens.next().transpose()?;
        }
        Ok(self.lookahead.as_ref())
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.as_ref().is_some_and(|t| t.kind == kind)
    }

    fn check_keyword(&self, keyword: Keyword) -> bool {
        self.check(TokenKind::Keyword(keyword))
    }

    /// Error for whatever sits at the current position.
    fn unexpected(&self) -> Error {
        match &self.current {
            Some(token) => Error::Parsing {
                token: token.clone(),
            },
            None => Error::UnexpectedEndOfInput,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if !self.check(kind) {
            return Err(self.unexpected());
        }
        self.advance()?.ok_or(Error::UnexpectedEndOfInput)
    }

    /// Runs `parse` one nesting level deeper.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_DEPTH {
            return Err(self.unexpected());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    /// Parses the whole token sequence into one expression.
    pub fn parse(&mut self) -> Result<Expr> {
        let expr = self.parse_expression()?;
        if self.current.is_some() {
            return Err(self.unexpected());
        }
        Ok(expr)
    }

    pub fn parse_expression(&mut self) -> Result<Expr> {
        self.nested(Self::parse_or)
    }

    fn parse_or(&mut self) -> Result<Expr> {
        self.parse_bool_chain(BoolOperator::Or)
    }

    fn parse_and(&mut self) -> Result<Expr> {
        self.parse_bool_chain(BoolOperator::And)
    }

    /// `operand (op operand)*`, flattened into a single `BoolOp`.
    fn parse_bool_chain(&mut self, op: BoolOperator) -> Result<Expr> {
        let (keyword, operand): (Keyword, fn(&mut Self) -> Result<Expr>) = match op {
            BoolOperator::Or => (Keyword::Or, Self::parse_and),
            BoolOperator::And => (Keyword::And, Self::parse_not),
        };

        let first = operand(self)?;
        if !self.check_keyword(keyword) {
            return Ok(first);
        }

        let mut operands = vec![first];
        while self.check_keyword(keyword) {
            self.advance()?;
            operands.push(operand(self)?);
        }
        trace!(op = %op, count = operands.len(), "flattened boolean chain");
        Ok(Expr::BoolOp { op, operands })
    }

    fn parse_not(&mut self) -> Result<Expr> {
        if self.check_keyword(Keyword::Not) {
            self.advance()?;
            let operand = self.nested(Self::parse_not)?; // Right-associative
            return Ok(Expr::unary(UnaryOperator::Not, operand));
        }
        self.parse_comparison()
    }

    fn comparator(&self) -> Option<Comparator> {
        let TokenKind::Keyword(keyword) = self.current.as_ref()?.kind else {
            return None;
        };
        match keyword {
            Keyword::Eq => Some(Comparator::Eq),
            Keyword::Ne => Some(Comparator::Ne),
            Keyword::Gt => Some(Comparator::Gt),
            Keyword::Ge => Some(Comparator::Ge),
            Keyword::Lt => Some(Comparator::Lt),
            Keyword::Le => Some(Comparator::Le),
            Keyword::In => Some(Comparator::In),
            _ => None,
        }
    }

    /// Non-associative: a second comparator at the same level is rejected.
    ///
    /// A `(` right after `in` always opens a list, so the list is the whole
    /// right operand and `a in (b) add 1` fails on `add`.
    fn parse_comparison(&mut self) -> Result<Expr> {
        let left = self.parse_additive()?;

        let Some(comparator) = self.comparator() else {
            return Ok(left);
        };
        self.advance()?;

        let right = if comparator == Comparator::In && self.check(TokenKind::LParen) {
            self.advance()?;
            Expr::List {
                items: self.parse_list_items()?,
            }
        } else {
            self.parse_additive()?
        };

        if self.comparator().is_some() {
            return Err(self.unexpected());
        }
        Ok(Expr::compare(comparator, left, right))
    }

    fn parse_additive(&mut self) -> Result<Expr> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = if self.check_keyword(Keyword::Add) {
                BinaryOperator::Add
            } else if self.check_keyword(Keyword::Sub) {
                BinaryOperator::Sub
            } else {
                break;
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;
            left = Expr::bin_op(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr> {
        let mut left = self.parse_unary()?;

        loop {
            let op = if self.check_keyword(Keyword::Mul) {
                BinaryOperator::Mul
            } else if self.check_keyword(Keyword::Div) {
                BinaryOperator::Div
            } else if self.check_keyword(Keyword::Mod) {
                BinaryOperator::Mod
            } else {
                break;
            };

            self.advance()?;
            let right = self.parse_unary()?;
            left = Expr::bin_op(op, left, right);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr> {
        if self.check(TokenKind::Minus) {
            self.advance()?;
            let operand = self.nested(Self::parse_unary)?;
            return Ok(Expr::unary(UnaryOperator::Negate, operand));
        }
        self.parse_primary()
    }

    /// Parse primary expressions: literals, paths, calls, lambdas, groups
    fn parse_primary(&mut self) -> Result<Expr> {
        let Some(kind) = self.current.as_ref().map(|t| t.kind) else {
            return Err(Error::UnexpectedEndOfInput);
        };

        let literal_kind = match kind {
            TokenKind::String => Some(LiteralKind::String),
            TokenKind::Number => Some(LiteralKind::Number),
            TokenKind::Boolean => Some(LiteralKind::Boolean),
            TokenKind::Null => Some(LiteralKind::Null),
            TokenKind::Date => Some(LiteralKind::Date),
            TokenKind::DateTime => Some(LiteralKind::DateTime),
            TokenKind::Time => Some(LiteralKind::Time),
            TokenKind::Guid => Some(LiteralKind::Guid),
            _ => None,
        };
        if let Some(kind) = literal_kind {
            let token = self.advance()?.ok_or(Error::UnexpectedEndOfInput)?;
            return Ok(literal_from_token(kind, token));
        }

        match kind {
            TokenKind::LParen => {
                self.advance()?;
                self.parse_group()
            }
            TokenKind::Identifier => self.parse_identifier(),
            _ => Err(self.unexpected()),
        }
    }

    /// After `(`: a grouped expression, or a list when commas follow.
    fn parse_group(&mut self) -> Result<Expr> {
        let first = self.parse_expression()?;
        if self.check(TokenKind::RParen) {
            self.advance()?;
            return Ok(first);
        }

        let mut items = vec![first];
        while self.check(TokenKind::Comma) {
            self.advance()?;
            items.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(Expr::List { items })
    }

    /// After `(`: comma-separated expressions up to and including `)`.
    fn parse_list_items(&mut self) -> Result<Vec<Expr>> {
        let mut items = vec![];
        if self.check(TokenKind::RParen) {
            self.advance()?;
            return Ok(items);
        }

        loop {
            items.push(self.parse_expression()?);
            if !self.check(TokenKind::Comma) {
                break;
            }
            self.advance()?;
        }

        self.expect(TokenKind::RParen)?;
        Ok(items)
    }

    /// An identifier starts an enum literal, a call, or a path.
    fn parse_identifier(&mut self) -> Result<Expr> {
        let ident = self.expect(TokenKind::Identifier)?;

        // Enum literal fusion: identifier immediately followed by a string.
        if let Some(next) = &self.current
            && next.kind == TokenKind::String
            && ident.is_adjacent_to(next)
        {
            let token = self.advance()?.ok_or(Error::UnexpectedEndOfInput)?;
            let value = token.string_value().unwrap_or_default();
            if let Some(kind) = LiteralKind::from_prefix(&ident.lexeme) {
                return Ok(Expr::literal(kind, value));
            }
            debug!(type_name = %ident.lexeme, value = %value, "fused enum literal");
            return Ok(Expr::EnumLiteral {
                type_name: ident.lexeme,
                value,
            });
        }

        if self.check(TokenKind::LParen) {
            self.advance()?;
            let args = self.parse_list_items()?;
            return Ok(Expr::Call {
                function_name: ident.lexeme,
                args,
            });
        }

        self.parse_path(Expr::Identifier { name: ident.lexeme })
    }

    /// `('/' identifier)*`, optionally ending in `'/' any|all (var: predicate)`.
    fn parse_path(&mut self, mut expr: Expr) -> Result<Expr> {
        while self.check(TokenKind::Slash) {
            let operator = match self.peek()?.map(|t| t.kind) {
                Some(TokenKind::Identifier) => None,
                Some(TokenKind::Keyword(Keyword::Any)) => Some(LambdaOperator::Any),
                Some(TokenKind::Keyword(Keyword::All)) => Some(LambdaOperator::All),
                _ => {
                    self.advance()?;
                    return Err(self.unexpected());
                }
            };
            self.advance()?; // consume '/'

            match operator {
                None => {
                    let name = self.expect(TokenKind::Identifier)?.lexeme;
                    expr = Expr::Attribute {
                        base: Box::new(expr),
                        name,
                    };
                }
                Some(operator) => {
                    self.advance()?; // consume any/all
                    return self.parse_lambda(operator, expr);
                }
            }
        }
        Ok(expr)
    }

    fn parse_lambda(&mut self, operator: LambdaOperator, collection: Expr) -> Result<Expr> {
        self.expect(TokenKind::LParen)?;
        let lambda_var = self.expect(TokenKind::Identifier)?.lexeme;
        self.expect(TokenKind::Colon)?;
        let predicate = self.parse_expression()?;
        self.expect(TokenKind::RParen)?;

        Ok(Expr::CollectionLambda {
            operator,
            collection: Box::new(collection),
            lambda_var,
            predicate: Box::new(predicate),
        })
    }
}

fn literal_from_token(kind: LiteralKind, token: Token) -> Expr {
    let value = match kind {
        LiteralKind::String => token.string_value().unwrap_or_default(),
        LiteralKind::Boolean => token.lexeme.to_ascii_lowercase(),
        _ => token.lexeme,
    };
    Expr::Literal { kind, value }
}
