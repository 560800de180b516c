// program   ::= function*
// function  ::= def ID '(' ')' scope end
// scope     ::= statement*
// statement ::= var ID '=' expr ';'
//             | mut var ID '=' expr ';'
//             | ID '=' expr ';'
//             | for ID in [reverse] bound '..' bound do scope end
//             | if expr then scope (elseif expr then scope)* [else scope] end
//             | return [expr] ';'
// bound     ::= integer | ID
// expr      ::= expr binop expr
//             | '(' expr ')'
//             | ID
//             | integer
//             | float
//             | true
//             | false

// Precedence
//
// * /
// + -
// == !=
// and or

use crate::{token::Span, types::Type, util::intern::Symbol};

/// The global scope: a list of function definitions.
#[derive(Debug, PartialEq, Default)]
pub struct Program {
    pub functions: Vec<Function>,
}

#[derive(Debug, PartialEq)]
pub struct Function {
    pub name: Ident,
    pub return_ty: Type,
    /// Always ends with a [`Stmt::Return`], implicit or not.
    pub body: Scope,
}

#[derive(Debug, PartialEq, Default)]
pub struct Scope {
    pub children: Vec<Stmt>,
}

impl Scope {
    pub fn ends_with_return(&self) -> bool {
        matches!(self.children.last(), Some(Stmt::Return(_)))
    }
}

#[derive(Debug, PartialEq)]
pub enum Stmt {
    DeclVar(DeclVar),
    Assign(Assign),
    ForLoop(ForLoop),
    IfElseChain(IfElseChain),
    Return(Return),
}

#[derive(Debug, PartialEq)]
pub struct DeclVar {
    pub is_mutable: bool,
    pub ty: Type,
    pub ident: Ident,
    pub init: Expr,
}

#[derive(Debug, PartialEq)]
pub struct Assign {
    pub ident: Ident,
    pub value: Expr,
}

#[derive(Debug, PartialEq)]
pub struct ForLoop {
    /// Declaration of the (immutable, int) induction variable, initialized
    /// with the range start.
    pub decl: DeclVar,
    pub range_end: Expr,
    pub is_reverse: bool,
    pub body: Scope,
}

#[derive(Debug, PartialEq)]
pub struct IfElseChain {
    pub if_branch: CondBranch,
    pub elseif_branches: Vec<CondBranch>,
    pub else_branch: Option<Scope>,
}

impl IfElseChain {
    /// The `if` branch followed by every `elseif` branch, in source order.
    pub fn cond_branches(&self) -> impl Iterator<Item = &CondBranch> {
        std::iter::once(&self.if_branch).chain(&self.elseif_branches)
    }
}

#[derive(Debug, PartialEq)]
pub struct CondBranch {
    /// Always typed [`Type::Bool`].
    pub condition: Expr,
    pub body: Scope,
}

#[derive(Debug, PartialEq)]
pub struct Return {
    /// A [`ExprKind::Void`] expression for `return;` and implicit returns.
    pub value: Expr,
    pub span: Span,
}

/// A typed expression. The type is computed once, during parsing.
#[derive(Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub ty: Type,
    pub span: Span,
}

impl Expr {
    pub fn void(span: Span) -> Expr {
        Expr {
            kind: ExprKind::Void,
            ty: Type::Void,
            span,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ExprKind {
    Integer(i32),
    Float(f32),
    Boolean(bool),
    Ident(Symbol),
    Void,
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOperator {
    /// Higher binds tighter.
    pub const fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Mul | BinaryOperator::Div => 4,
            BinaryOperator::Add | BinaryOperator::Sub => 3,
            BinaryOperator::Eq | BinaryOperator::Ne => 2,
            BinaryOperator::And | BinaryOperator::Or => 1,
        }
    }

    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            BinaryOperator::Add | BinaryOperator::Sub | BinaryOperator::Mul | BinaryOperator::Div
        )
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: Symbol,
    pub span: Span,
}
