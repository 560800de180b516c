//! Expressions are parsed in two stages. The first reorders the infix tokens
//! into postfix (reverse Polish) form with a shunting-yard pass; the second
//! folds the postfix sequence into a tree, computing each node's type.

use super::{Error, Parser, Result};
use crate::{
    ast::{BinaryOperator, Expr, ExprKind},
    lexer::{extract, TokenSource},
    token::{Span, Token, TokenKind},
    types::Type,
};

#[derive(Copy, Clone, Debug)]
enum Rpn {
    Operand(Token),
    Operator(BinaryOperator, Span),
}

/// Entries of the operator stack. Opening parentheses share it with operators.
#[derive(Copy, Clone)]
enum Pending {
    Operator(BinaryOperator, Span),
    LParen(Span),
}

impl<S: TokenSource> Parser<'_, '_, S> {
    /// Parses a typed expression ending right before one of `terminators`,
    /// which is left for the caller to consume.
    ///
    /// An empty expression is a [`ExprKind::Void`] node.
    pub(super) fn parse_expr(&mut self, terminators: &[TokenKind]) -> Result<Expr> {
        let rpn = self.expr_to_rpn(terminators)?;
        let end = self.peek().span();
        self.reduce_rpn(rpn, end)
    }

    fn expr_to_rpn(&mut self, terminators: &[TokenKind]) -> Result<Vec<Rpn>> {
        let mut output = Vec::with_capacity(8);
        let mut pending = Vec::with_capacity(8);
        // Operands and operators must alternate. Parentheses keep the
        // expectation as is.
        let mut expect_operand = true;
        loop {
            let token = self.peek();
            if terminators.contains(&token.kind) {
                break;
            }
            match (expect_operand, token.kind) {
                (_, TokenKind::String) => {
                    return Err(token.span().wrap(Error::UnsupportedStringLiteral));
                }
                (
                    true,
                    TokenKind::Integer
                    | TokenKind::Float
                    | TokenKind::True
                    | TokenKind::False
                    | TokenKind::Identifier,
                ) => {
                    output.push(Rpn::Operand(token));
                    expect_operand = false;
                }
                (true, TokenKind::LParen) => pending.push(Pending::LParen(token.span())),
                (false, TokenKind::RParen) => loop {
                    match pending.pop() {
                        Some(Pending::Operator(op, span)) => output.push(Rpn::Operator(op, span)),
                        Some(Pending::LParen(_)) => break,
                        None => return Err(token.span().wrap(Error::MismatchedParentheses)),
                    }
                },
                (false, kind) => {
                    let Some(op) = binary_operator(kind) else {
                        let error = Error::UnexpectedTokenInExpr { token: kind };
                        return Err(Self::unexpected(token, error));
                    };
                    // Left associative: equal precedence pops too.
                    while let Some(&Pending::Operator(top, span)) = pending.last() {
                        if top.precedence() < op.precedence() {
                            break;
                        }
                        pending.pop();
                        output.push(Rpn::Operator(top, span));
                    }
                    pending.push(Pending::Operator(op, token.span()));
                    expect_operand = true;
                }
                (true, kind) => {
                    let error = Error::UnexpectedTokenInExpr { token: kind };
                    return Err(Self::unexpected(token, error));
                }
            }
            self.advance();
        }

        // A dangling operator, or parentheses with nothing inside.
        if expect_operand && !(output.is_empty() && pending.is_empty()) {
            let token = self.peek();
            let error = Error::UnexpectedTokenInExpr { token: token.kind };
            return Err(Self::unexpected(token, error));
        }

        while let Some(entry) = pending.pop() {
            match entry {
                Pending::Operator(op, span) => output.push(Rpn::Operator(op, span)),
                Pending::LParen(span) => return Err(span.wrap(Error::MismatchedParentheses)),
            }
        }
        log::trace!("postfix expression: {output:?}");
        Ok(output)
    }

    fn reduce_rpn(&mut self, rpn: Vec<Rpn>, end: Span) -> Result<Expr> {
        let mut values: Vec<Expr> = Vec::with_capacity(rpn.len() / 2 + 1);
        for item in rpn {
            match item {
                Rpn::Operand(token) => values.push(self.operand(token)?),
                Rpn::Operator(op, span) => {
                    // The right operand was pushed last.
                    let rhs = values.pop().expect("operator without right operand");
                    let lhs = values.pop().expect("operator without left operand");
                    values.push(binary(op, span, lhs, rhs)?);
                }
            }
        }
        let expr = values.pop().unwrap_or_else(|| Expr::void(end));
        assert!(values.is_empty(), "internal error: expression reduced to more than one value");
        Ok(expr)
    }

    /// Builds the leaf node for a literal or variable token.
    pub(super) fn operand(&mut self, token: Token) -> Result<Expr> {
        let span = token.span();
        let (kind, ty) = match token.kind {
            TokenKind::Integer => {
                let Ok(value) = extract::int(token, self.src) else {
                    return Err(span.wrap(Error::ParseInt));
                };
                (ExprKind::Integer(value), Type::Int)
            }
            TokenKind::Float => {
                // Out of range literals parse to infinity.
                let value = match extract::float(token, self.src) {
                    Ok(value) if value.is_finite() => value,
                    _ => return Err(span.wrap(Error::ParseFloat)),
                };
                (ExprKind::Float(value), Type::Float)
            }
            TokenKind::True => (ExprKind::Boolean(true), Type::Bool),
            TokenKind::False => (ExprKind::Boolean(false), Type::Bool),
            TokenKind::Identifier => {
                let name = self.idents.intern(extract::ident(token, self.src));
                let Some(info) = self.symbols.lookup(name) else {
                    return Err(span.wrap(Error::UndeclaredVariable(name)));
                };
                (ExprKind::Ident(name), info.ty)
            }
            other => unreachable!("{other:?} is not an operand"),
        };
        Ok(Expr { kind, ty, span })
    }
}

fn binary_operator(kind: TokenKind) -> Option<BinaryOperator> {
    let op = match kind {
        TokenKind::Plus => BinaryOperator::Add,
        TokenKind::Minus => BinaryOperator::Sub,
        TokenKind::Star => BinaryOperator::Mul,
        TokenKind::Slash => BinaryOperator::Div,
        TokenKind::EqEq => BinaryOperator::Eq,
        TokenKind::NotEq => BinaryOperator::Ne,
        TokenKind::And => BinaryOperator::And,
        TokenKind::Or => BinaryOperator::Or,
        _ => return None,
    };
    Some(op)
}

/// Type-checks and combines two operands. Errors point at the operator.
fn binary(op: BinaryOperator, op_span: Span, lhs: Expr, rhs: Expr) -> Result<Expr> {
    if lhs.ty != rhs.ty {
        let error = Error::OperandTypeMismatch {
            op,
            lhs: lhs.ty,
            rhs: rhs.ty,
        };
        return Err(op_span.wrap(error));
    }
    let ty = if op.is_arithmetic() {
        if lhs.ty == Type::Bool {
            return Err(op_span.wrap(Error::BoolOperandInArithmetic { op }));
        }
        lhs.ty
    } else {
        if op.is_logical() && lhs.ty != Type::Bool {
            return Err(op_span.wrap(Error::NonBoolLogicalOperand { op, ty: lhs.ty }));
        }
        Type::Bool
    };
    let span = lhs.span.to(rhs.span);
    Ok(Expr {
        kind: ExprKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        },
        ty,
        span,
    })
}
