use std::io::Write;

use crate::{ast::*, util::intern::Interner};

const INDENT_WIDTH: usize = 2;

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}

pub fn print_program_string(idents: &Interner, program: &Program) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, idents, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_expr_string(idents: &Interner, expr: &Expr) -> String {
    let mut buf = Vec::with_capacity(512);
    print_expr(&mut buf, idents, 0, expr).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_program(
    w: &mut impl Write,
    idents: &Interner,
    program: &Program,
) -> std::io::Result<()> {
    for function in &program.functions {
        writeln!(
            w,
            "function {} : {}",
            idents.resolve(function.name.name),
            function.return_ty
        )?;
        print_scope(w, idents, 1, &function.body)?;
    }
    Ok(())
}

fn print_scope(w: &mut impl Write, idents: &Interner, i: usize, scope: &Scope) -> std::io::Result<()> {
    for stmt in &scope.children {
        print_stmt(w, idents, i, stmt)?;
    }
    Ok(())
}

fn print_stmt(w: &mut impl Write, idents: &Interner, i: usize, stmt: &Stmt) -> std::io::Result<()> {
    match stmt {
        Stmt::DeclVar(decl) => print_decl(w, idents, i, decl)?,
        Stmt::Assign(Assign { ident, value }) => {
            sp(w, i)?;
            writeln!(w, "assign {}", idents.resolve(ident.name))?;
            print_expr(w, idents, i + 1, value)?;
        }
        Stmt::ForLoop(ForLoop {
            decl,
            range_end,
            is_reverse,
            body,
        }) => {
            sp(w, i)?;
            write!(w, "for {}", idents.resolve(decl.ident.name))?;
            if *is_reverse {
                write!(w, " reverse")?;
            }
            writeln!(w)?;
            sp(w, i + 1)?;
            writeln!(w, "from")?;
            print_expr(w, idents, i + 2, &decl.init)?;
            sp(w, i + 1)?;
            writeln!(w, "to")?;
            print_expr(w, idents, i + 2, range_end)?;
            sp(w, i + 1)?;
            writeln!(w, "do")?;
            print_scope(w, idents, i + 2, body)?;
        }
        Stmt::IfElseChain(chain) => {
            for (idx, branch) in chain.cond_branches().enumerate() {
                sp(w, i)?;
                writeln!(w, "{}", if idx == 0 { "if" } else { "elseif" })?;
                print_expr(w, idents, i + 1, &branch.condition)?;
                sp(w, i + 1)?;
                writeln!(w, "then")?;
                print_scope(w, idents, i + 2, &branch.body)?;
            }
            if let Some(else_branch) = &chain.else_branch {
                sp(w, i)?;
                writeln!(w, "else")?;
                print_scope(w, idents, i + 1, else_branch)?;
            }
        }
        Stmt::Return(Return { value, .. }) => {
            sp(w, i)?;
            writeln!(w, "return")?;
            print_expr(w, idents, i + 1, value)?;
        }
    }
    Ok(())
}

fn print_decl(w: &mut impl Write, idents: &Interner, i: usize, decl: &DeclVar) -> std::io::Result<()> {
    sp(w, i)?;
    if decl.is_mutable {
        write!(w, "mut ")?;
    }
    writeln!(w, "var {}: {}", idents.resolve(decl.ident.name), decl.ty)?;
    print_expr(w, idents, i + 1, &decl.init)
}

pub fn print_expr(
    w: &mut impl Write,
    idents: &Interner,
    i: usize,
    expr: &Expr,
) -> std::io::Result<()> {
    sp(w, i)?;
    let ty = expr.ty;
    match &expr.kind {
        ExprKind::Integer(int) => writeln!(w, "int {int} : {ty}")?,
        ExprKind::Float(float) => writeln!(w, "float {float:?} : {ty}")?,
        ExprKind::Boolean(bool) => writeln!(w, "bool {bool} : {ty}")?,
        ExprKind::Ident(name) => writeln!(w, "ident {} : {ty}", idents.resolve(*name))?,
        ExprKind::Void => writeln!(w, "void")?,
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} : {ty}")?;
            print_expr(w, idents, i + 1, lhs)?;
            print_expr(w, idents, i + 1, rhs)?;
        }
    }
    Ok(())
}
