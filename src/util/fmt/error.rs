#![allow(clippy::items_after_statements)]

use crate::{lexer, parser, token::Spanned, util::fmt::Show};

impl Show for Spanned<parser::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &super::Context<'_>) -> std::fmt::Result {
        let i = ctx.idents;
        let Spanned { span, inner: error } = self;

        if f.alternate() {
            write!(f, "line {}: ", span.line)?;
        }

        use parser::Error::*;
        match error {
            Unexpected { actual, expected } => {
                write!(f, "expected token {expected:?}, but got {actual:?}")
            }
            UnexpectedAny { actual, expected } => {
                write!(f, "expected one of {expected:?}, but got {actual:?}")
            }
            UnexpectedTokenInExpr { token } => {
                write!(f, "unexpected token {token:?} in expression")
            }
            UnexpectedStatement { token } => {
                write!(f, "unexpected token {token:?} at start of statement")
            }
            UnexpectedTopLevel { token } => write!(
                f,
                "unexpected token {token:?} at top level, expected a function definition"
            ),
            MismatchedParentheses => write!(f, "mismatched parentheses"),
            UndeclaredVariable(name) => {
                let name = i.resolve(*name);
                write!(f, "reference to undeclared variable {name}")
            }
            OperandTypeMismatch { op, lhs, rhs } => {
                write!(f, "operand type mismatch for {op:?}: {lhs} and {rhs}")
            }
            BoolOperandInArithmetic { op } => {
                write!(f, "type bool cannot be used in arithmetic operation {op:?}")
            }
            NonBoolLogicalOperand { op, ty } => write!(
                f,
                "logical operation {op:?} requires bool operands, but got {ty}"
            ),
            NonBoolCondition { actual } => {
                write!(f, "condition must be of type bool, but got {actual}")
            }
            RangeBoundNotInt { actual } => {
                write!(f, "range bound must be of type int, but got {actual}")
            }
            VoidBinding(name) => {
                let name = i.resolve(*name);
                write!(f, "cannot bind void to variable {name}")
            }
            Redeclaration(name) => {
                let name = i.resolve(*name);
                write!(f, "redeclaration of {name}")
            }
            Shadowing(name) => {
                let name = i.resolve(*name);
                write!(
                    f,
                    "declaration of {name} would shadow a variable of an enclosing scope"
                )
            }
            ImmutableAssignment(name) => {
                let name = i.resolve(*name);
                write!(f, "cannot assign to immutable variable {name}")
            }
            AssignmentTypeMismatch {
                name,
                expected,
                actual,
            } => {
                let name = i.resolve(*name);
                write!(f, "cannot assign {actual} to variable {name} of type {expected}")
            }
            ReturnTypeMismatch {
                function,
                expected,
                actual,
            } => {
                let function = i.resolve(*function);
                write!(
                    f,
                    "return type mismatch in function {function}: \
                    expected {expected}, but got {actual}"
                )
            }
            MissingReturn { function, ty } => {
                let function = i.resolve(*function);
                write!(f, "missing return in function {function} of non-void type {ty}")
            }
            GlobalVariableNotAllowed => write!(f, "global variables are not allowed"),
            DuplicateFunction(name) => {
                let name = i.resolve(*name);
                write!(f, "function {name} is already defined")
            }
            UnsupportedStringLiteral => write!(f, "string literals are not supported"),
            ParseInt => write!(f, "invalid integer literal"),
            ParseFloat => write!(f, "invalid float literal"),
            Lexer(lexer::Error::UnexpectedChar) => write!(f, "unexpected character"),
            Lexer(lexer::Error::UnclosedString) => write!(f, "unclosed string"),
        }
    }
}
