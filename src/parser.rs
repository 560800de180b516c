use std::collections::HashSet;

use crate::{
    ast::{
        Assign, BinaryOperator, CondBranch, DeclVar, Expr, ExprKind, ForLoop, Function, Ident,
        IfElseChain, Program, Return, Scope, Stmt,
    },
    lexer::{self, extract, Lexer, TokenSource},
    symbols::{DeclError, SymbolTable},
    token::{Span, Spanned, Token, TokenKind},
    types::{Type, VarInfo},
    util::intern::{Interner, Symbol},
};

mod expr;

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Parses and type-checks a whole program, lexing `src` on demand.
pub fn parse_program(src: &str, idents: &mut Interner) -> Result<Program> {
    parse_program_from(src, Lexer::new(src), idents)
}

/// Like [`parse_program`], but pulls tokens from an arbitrary source. Token
/// spans must point into `src`.
pub fn parse_program_from<S: TokenSource>(
    src: &str,
    source: S,
    idents: &mut Interner,
) -> Result<Program> {
    parse(src, source, idents, Parser::parse_program)
}

/// Parses a single expression spanning the whole input. No variable is in
/// scope, so any identifier is reported as undeclared.
pub fn parse_expr(src: &str, idents: &mut Interner) -> Result<Expr> {
    parse(src, Lexer::new(src), idents, |p| {
        let expr = p.parse_expr(&[TokenKind::Eof])?;
        p.consume(TokenKind::Eof)?;
        Ok(expr)
    })
}

fn parse<'src, 'ident, S, T>(
    src: &'src str,
    source: S,
    idents: &'ident mut Interner,
    f: impl FnOnce(&mut Parser<'src, 'ident, S>) -> Result<T>,
) -> Result<T>
where
    S: TokenSource,
{
    let mut p = Parser::new(src, source, idents);
    let result = f(&mut p);
    debug_assert_eq!(p.symbols.depth(), 0, "scope frames leaked");
    result
}

struct Parser<'src, 'ident, S> {
    src: &'src str,
    source: S,
    /// The current token. Never trivia.
    current: Token,
    idents: &'ident mut Interner,
    symbols: SymbolTable,
    /// The function whose body is being parsed, if any.
    function: Option<FunctionState>,
}

/// Parser state that lives for a single function definition.
struct FunctionState {
    name: Ident,
    /// Fixed by the first `return` found in the body.
    return_ty: Option<Type>,
}

#[derive(Copy, Clone)]
enum Reachability {
    Normal,
    /// A `return` was parsed. Only the closing token of the scope matters now;
    /// `depth` counts the dead `for`/`if` blocks opened since.
    Unreachable { depth: usize },
}

impl<S: TokenSource> Parser<'_, '_, S> {
    fn parse_program(&mut self) -> Result<Program> {
        let mut functions = Vec::with_capacity(4);
        let mut defined = HashSet::with_capacity(4);
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Def => {
                    let function = self.parse_function()?;
                    if !defined.insert(function.name.name) {
                        let error = Error::DuplicateFunction(function.name.name);
                        return Err(function.name.span.wrap(error));
                    }
                    functions.push(function);
                }
                TokenKind::Var | TokenKind::Mut => {
                    return Err(token.span().wrap(Error::GlobalVariableNotAllowed));
                }
                TokenKind::Eof => break,
                other => {
                    let error = Error::UnexpectedTopLevel { token: other };
                    return Err(Self::unexpected(token, error));
                }
            }
        }
        Ok(Program { functions })
    }

    fn parse_function(&mut self) -> Result<Function> {
        self.consume(TokenKind::Def)?;
        let name = self.parse_ident()?;
        self.consume(TokenKind::LParen)?;
        // Functions take no parameters.
        self.consume(TokenKind::RParen)?;

        self.function = Some(FunctionState {
            name,
            return_ty: None,
        });
        let body = self.parse_scope(&[TokenKind::End]);
        let state = self.function.take().expect("set above");
        let mut body = body?;
        let end = self.consume(TokenKind::End)?;

        let return_ty = match state.return_ty {
            Some(ty) if !ty.is_void() && !body.ends_with_return() => {
                let error = Error::MissingReturn {
                    function: name.name,
                    ty,
                };
                return Err(end.span().wrap(error));
            }
            Some(ty) => ty,
            None => Type::Void,
        };
        if !body.ends_with_return() {
            body.children.push(Stmt::Return(Return {
                value: Expr::void(end.span()),
                span: end.span(),
            }));
        }

        log::debug!(
            "parsed function {} returning {return_ty}",
            self.idents.resolve(name.name)
        );
        Ok(Function {
            name,
            return_ty,
            body,
        })
    }

    /// Parses statements until one of `terminators` (which must include
    /// [`TokenKind::End`]) is found. Does **NOT** consume the terminator.
    ///
    /// Every name declared in the scope is erased once it has been parsed.
    fn parse_scope(&mut self, terminators: &[TokenKind]) -> Result<Scope> {
        debug_assert!(terminators.contains(&TokenKind::End));
        self.scoped(|p| p.parse_scope_body(terminators))
    }

    fn parse_scope_body(&mut self, terminators: &[TokenKind]) -> Result<Scope> {
        let mut children = Vec::new();
        let mut reachability = Reachability::Normal;
        loop {
            let token = self.peek();
            match reachability {
                Reachability::Normal => {
                    if terminators.contains(&token.kind) {
                        break;
                    }
                    let stmt = match token.kind {
                        TokenKind::Var => {
                            self.advance();
                            self.parse_decl(false)?
                        }
                        TokenKind::Mut => {
                            self.advance();
                            self.consume(TokenKind::Var)?;
                            self.parse_decl(true)?
                        }
                        TokenKind::Identifier => self.parse_assign()?,
                        TokenKind::For => self.parse_for()?,
                        TokenKind::If => self.parse_if()?,
                        TokenKind::Return => {
                            reachability = Reachability::Unreachable { depth: 0 };
                            self.parse_return()?
                        }
                        TokenKind::Eof => {
                            let error = Error::UnexpectedAny {
                                actual: token.kind,
                                expected: Box::from(terminators),
                            };
                            return Err(Self::unexpected(token, error));
                        }
                        other => {
                            let error = Error::UnexpectedStatement { token: other };
                            return Err(Self::unexpected(token, error));
                        }
                    };
                    children.push(stmt);
                }
                Reachability::Unreachable { depth } => {
                    let depth = match token.kind {
                        kind if depth == 0 && terminators.contains(&kind) => break,
                        TokenKind::For | TokenKind::If => depth + 1,
                        TokenKind::End => depth.saturating_sub(1),
                        TokenKind::Eof => {
                            let error = Error::Unexpected {
                                actual: token.kind,
                                expected: TokenKind::End,
                            };
                            return Err(Self::unexpected(token, error));
                        }
                        _ => depth,
                    };
                    log::trace!("line {}: skipping unreachable {:?}", token.line(), token.kind);
                    reachability = Reachability::Unreachable { depth };
                    self.advance();
                }
            }
        }
        Ok(Scope { children })
    }

    /// Parses `ID = expr ;`. The `var` (and `mut`) keywords were consumed by
    /// the caller.
    fn parse_decl(&mut self, is_mutable: bool) -> Result<Stmt> {
        let ident = self.parse_ident()?;
        self.consume(TokenKind::Assign)?;
        let init = self.parse_expr(&[TokenKind::Semicolon])?;
        self.consume(TokenKind::Semicolon)?;

        if init.ty.is_void() {
            return Err(ident.span.wrap(Error::VoidBinding(ident.name)));
        }
        self.declare(ident, VarInfo::new(init.ty, is_mutable))?;
        Ok(Stmt::DeclVar(DeclVar {
            is_mutable,
            ty: init.ty,
            ident,
            init,
        }))
    }

    fn parse_assign(&mut self) -> Result<Stmt> {
        let ident = self.parse_ident()?;
        let Some(info) = self.symbols.lookup(ident.name) else {
            return Err(ident.span.wrap(Error::UndeclaredVariable(ident.name)));
        };
        if !info.is_mutable {
            return Err(ident.span.wrap(Error::ImmutableAssignment(ident.name)));
        }
        self.consume(TokenKind::Assign)?;
        let value = self.parse_expr(&[TokenKind::Semicolon])?;
        self.consume(TokenKind::Semicolon)?;

        if value.ty != info.ty {
            let error = Error::AssignmentTypeMismatch {
                name: ident.name,
                expected: info.ty,
                actual: value.ty,
            };
            return Err(value.span.wrap(error));
        }
        Ok(Stmt::Assign(Assign { ident, value }))
    }

    fn parse_for(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::For)?;
        let ident = self.parse_ident()?;
        self.consume(TokenKind::In)?;
        let is_reverse = self.take(TokenKind::Reverse);
        let start = self.parse_range_bound()?;
        self.consume(TokenKind::DotDot)?;
        let range_end = self.parse_range_bound()?;
        self.consume(TokenKind::Do)?;
        Self::check_range(&start, &range_end, is_reverse);

        // The induction variable gets a frame of its own, enclosing the body.
        let body = self.scoped(|p| {
            p.declare(ident, VarInfo::induction())?;
            p.parse_scope(&[TokenKind::End])
        })?;
        self.consume(TokenKind::End)?;

        let decl = DeclVar {
            is_mutable: false,
            ty: Type::Int,
            ident,
            init: start,
        };
        Ok(Stmt::ForLoop(ForLoop {
            decl,
            range_end,
            is_reverse,
            body,
        }))
    }

    fn parse_range_bound(&mut self) -> Result<Expr> {
        let token = self.peek();
        if !matches!(token.kind, TokenKind::Integer | TokenKind::Identifier) {
            let error = Error::UnexpectedAny {
                actual: token.kind,
                expected: Box::from([TokenKind::Integer, TokenKind::Identifier]),
            };
            return Err(Self::unexpected(token, error));
        }
        let bound = self.operand(token)?;
        self.advance();
        if bound.ty != Type::Int {
            let error = Error::RangeBoundNotInt { actual: bound.ty };
            return Err(token.span().wrap(error));
        }
        Ok(bound)
    }

    /// The loop test is `end != next`, so literal ranges which unit steps
    /// never reach spin until the counter wraps around.
    fn check_range(start: &Expr, end: &Expr, is_reverse: bool) {
        let (ExprKind::Integer(lo), ExprKind::Integer(hi)) = (&start.kind, &end.kind) else {
            return;
        };
        let reachable = if is_reverse { lo > hi } else { lo < hi };
        if !reachable {
            log::warn!(
                "line {}: range {lo}..{hi} is never reached by {} steps, the loop will not terminate",
                start.span.line,
                if is_reverse { "descending" } else { "ascending" },
            );
        }
    }

    fn parse_if(&mut self) -> Result<Stmt> {
        self.consume(TokenKind::If)?;
        let if_branch = self.parse_cond_branch()?;
        let mut elseif_branches = Vec::new();
        while self.take(TokenKind::ElseIf) {
            elseif_branches.push(self.parse_cond_branch()?);
        }
        let else_branch = if self.take(TokenKind::Else) {
            Some(self.parse_scope(&[TokenKind::End])?)
        } else {
            None
        };
        self.consume(TokenKind::End)?;
        Ok(Stmt::IfElseChain(IfElseChain {
            if_branch,
            elseif_branches,
            else_branch,
        }))
    }

    /// Parses `expr then scope`, stopping at the `elseif`, `else` or `end`
    /// that closes the scope.
    fn parse_cond_branch(&mut self) -> Result<CondBranch> {
        let condition = self.parse_expr(&[TokenKind::Then])?;
        if condition.ty != Type::Bool {
            let error = Error::NonBoolCondition {
                actual: condition.ty,
            };
            return Err(condition.span.wrap(error));
        }
        self.consume(TokenKind::Then)?;
        let body = self.parse_scope(&[TokenKind::ElseIf, TokenKind::Else, TokenKind::End])?;
        Ok(CondBranch { condition, body })
    }

    fn parse_return(&mut self) -> Result<Stmt> {
        let token = self.consume(TokenKind::Return)?;
        let value = self.parse_expr(&[TokenKind::Semicolon])?;
        self.consume(TokenKind::Semicolon)?;

        let state = self
            .function
            .as_mut()
            .expect("statements are only parsed inside functions");
        match state.return_ty {
            None => state.return_ty = Some(value.ty),
            Some(expected) if expected != value.ty => {
                let error = Error::ReturnTypeMismatch {
                    function: state.name.name,
                    expected,
                    actual: value.ty,
                };
                return Err(token.span().wrap(error));
            }
            Some(_) => (),
        }
        Ok(Stmt::Return(Return {
            value,
            span: token.span(),
        }))
    }

    fn parse_ident(&mut self) -> Result<Ident> {
        let token = self.consume(TokenKind::Identifier)?;
        Ok(Ident {
            name: self.idents.intern(extract::ident(token, self.src)),
            span: token.span(),
        })
    }

    fn declare(&mut self, ident: Ident, info: VarInfo) -> Result<()> {
        self.symbols.declare(ident.name, info).map_err(|error| {
            let error = match error {
                DeclError::Redeclaration => Error::Redeclaration(ident.name),
                DeclError::Shadowing => Error::Shadowing(ident.name),
            };
            ident.span.wrap(error)
        })
    }

    /// Runs `f` inside a fresh symbol table frame. The frame is popped on
    /// every exit path, errors included.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.symbols.enter_scope();
        let result = f(self);
        self.symbols.exit_scope();
        result
    }
}

impl<'src, 'ident, S: TokenSource> Parser<'src, 'ident, S> {
    fn new(src: &'src str, source: S, idents: &'ident mut Interner) -> Parser<'src, 'ident, S> {
        let mut p = Parser {
            src,
            source,
            current: Token::new(TokenKind::Whitespace, Span::new_of_length(0, 0, 1)),
            idents,
            symbols: SymbolTable::with_capacity(32),
            function: None,
        };
        p.advance();
        p
    }

    /// Returns the current token.
    #[inline]
    fn peek(&self) -> Token {
        self.current
    }

    /// Returns the current token and advances. Skips any trivia.
    fn advance(&mut self) -> Token {
        let c = self.current;
        loop {
            self.current = self.source.next_token();
            if !self.current.kind.is_trivia() {
                break c;
            }
        }
    }

    /// Checks whether the current token matches the given one.
    fn is(&self, expect: TokenKind) -> bool {
        self.peek().kind == expect
    }

    /// Advances if the current token matches the provided one, returning true.
    /// If not, returns false and doesn't advance.
    fn take(&mut self, expect: TokenKind) -> bool {
        if self.is(expect) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Advances if the current token matches the provided one. If not, fails
    /// with an error.
    fn consume(&mut self, expect: TokenKind) -> Result<Token> {
        let c = self.peek();
        if self.is(expect) {
            self.advance();
            Ok(c)
        } else {
            let error = Error::Unexpected {
                actual: c.kind,
                expected: expect,
            };
            Err(Self::unexpected(c, error))
        }
    }

    /// Reports `token` as misplaced. Lexer error tokens are reported as such,
    /// regardless of what was expected.
    fn unexpected(token: Token, error: Error) -> Spanned<Error> {
        let error = match token.kind {
            TokenKind::Error(lexer_error) => Error::Lexer(lexer_error),
            _ => error,
        };
        token.span().wrap(error)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Unexpected {
        actual: TokenKind,
        expected: TokenKind,
    },
    UnexpectedAny {
        actual: TokenKind,
        expected: Box<[TokenKind]>,
    },
    UnexpectedTokenInExpr {
        token: TokenKind,
    },
    UnexpectedStatement {
        token: TokenKind,
    },
    UnexpectedTopLevel {
        token: TokenKind,
    },
    MismatchedParentheses,
    UndeclaredVariable(Symbol),
    OperandTypeMismatch {
        op: BinaryOperator,
        lhs: Type,
        rhs: Type,
    },
    BoolOperandInArithmetic {
        op: BinaryOperator,
    },
    NonBoolLogicalOperand {
        op: BinaryOperator,
        ty: Type,
    },
    NonBoolCondition {
        actual: Type,
    },
    RangeBoundNotInt {
        actual: Type,
    },
    VoidBinding(Symbol),
    Redeclaration(Symbol),
    Shadowing(Symbol),
    ImmutableAssignment(Symbol),
    AssignmentTypeMismatch {
        name: Symbol,
        expected: Type,
        actual: Type,
    },
    ReturnTypeMismatch {
        function: Symbol,
        expected: Type,
        actual: Type,
    },
    MissingReturn {
        function: Symbol,
        ty: Type,
    },
    GlobalVariableNotAllowed,
    DuplicateFunction(Symbol),
    UnsupportedStringLiteral,
    ParseInt,
    ParseFloat,
    Lexer(lexer::Error),
}
