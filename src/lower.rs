use crate::{
    ast::{
        Assign, BinaryOperator, DeclVar, Expr, ExprKind, ForLoop, Function, IfElseChain, Program,
        Return, Scope, Stmt,
    },
    ir::builder::{BinaryInst, FloatPredicate, IntPredicate, IrBuilder, IrType},
    symbols::SymbolTable,
    types::Type,
    util::intern::{Interner, Symbol},
};

/// Bit pattern of `true` in an `i8` boolean.
const TRUE: i64 = -1;
const FALSE: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("unsupported operation {op:?} on operands of type {ty}")]
    UnsupportedOperation { op: BinaryOperator, ty: Type },
}

/// Emits every function of `program` through `builder`.
///
/// The program must have been produced by the parser, which already rejected
/// ill-typed and ill-scoped input.
pub fn lower_program<B: IrBuilder>(
    builder: &mut B,
    idents: &Interner,
    program: &Program,
) -> Result<(), Error> {
    Lowerer::new(builder, idents).lower_program(program)
}

pub struct Lowerer<'b, 'ident, B: IrBuilder> {
    builder: &'b mut B,
    idents: &'ident Interner,
    slots: SymbolTable<B::Slot>,
    /// Where a scope branches to once its last statement is done. Innermost
    /// last; empty at function level.
    continuations: Vec<B::Block>,
    function: Option<FunctionContext<B>>,
}

struct FunctionContext<B: IrBuilder> {
    handle: B::Function,
    exit: B::Block,
    /// Holds the return value until the exit block loads it. `None` for void
    /// functions.
    exit_slot: Option<B::Slot>,
}

impl<'b, 'ident, B: IrBuilder> Lowerer<'b, 'ident, B> {
    pub fn new(builder: &'b mut B, idents: &'ident Interner) -> Lowerer<'b, 'ident, B> {
        Lowerer {
            builder,
            idents,
            slots: SymbolTable::with_capacity(32),
            continuations: Vec::with_capacity(8),
            function: None,
        }
    }

    pub fn lower_program(mut self, program: &Program) -> Result<(), Error> {
        for function in &program.functions {
            self.lower_function(function)?;
        }
        Ok(())
    }

    fn lower_function(&mut self, function: &Function) -> Result<(), Error> {
        let name = self.idents.resolve(function.name.name);
        log::debug!("lowering function {name}");

        let ret = IrType::of(function.return_ty);
        let handle = self.builder.create_function(name, ret);
        let entry = self.builder.create_block(handle, "entry");
        let exit = self.builder.create_block(handle, "exit");
        self.builder.set_insertion_point(entry);
        let exit_slot = (ret != IrType::Void).then(|| self.builder.alloca(ret, "exit.value"));
        self.function = Some(FunctionContext {
            handle,
            exit,
            exit_slot,
        });

        debug_assert!(self.continuations.is_empty());
        let result = self.lower_scope(&function.body);
        self.function = None;
        result?;

        self.builder.set_insertion_point(exit);
        let value = exit_slot.map(|slot| self.builder.load(slot));
        self.builder.ret(value);
        Ok(())
    }

    /// Lowers the statements of `scope` into the current block, then branches
    /// to the innermost continuation. A `return` ends the scope early.
    fn lower_scope(&mut self, scope: &Scope) -> Result<(), Error> {
        self.scoped(|this| {
            for stmt in &scope.children {
                if let Stmt::Return(ret) = stmt {
                    // Nothing follows a return.
                    return this.lower_return(ret);
                }
                this.lower_stmt(stmt)?;
            }
            if let Some(&after) = this.continuations.last() {
                this.builder.br(after);
            }
            Ok(())
        })
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::DeclVar(decl) => self.lower_decl(decl),
            Stmt::Assign(assign) => self.lower_assign(assign),
            Stmt::ForLoop(for_loop) => self.lower_for(for_loop),
            Stmt::IfElseChain(chain) => self.lower_if(chain),
            Stmt::Return(ret) => self.lower_return(ret),
        }
    }

    fn lower_return(&mut self, ret: &Return) -> Result<(), Error> {
        let context = self.function.as_ref().expect("return outside of a function");
        let (exit, exit_slot) = (context.exit, context.exit_slot);
        let value = self.lower_expr(&ret.value)?;
        if let Some(slot) = exit_slot {
            let value = value.expect("void value returned from non-void function");
            self.builder.store(value, slot);
        }
        self.builder.br(exit);
        Ok(())
    }

    fn lower_decl(&mut self, decl: &DeclVar) -> Result<(), Error> {
        let name = decl.ident.name;
        let slot = self
            .builder
            .alloca(IrType::of(decl.ty), self.idents.resolve(name));
        let value = self.lower_value(&decl.init)?;
        self.builder.store(value, slot);
        if self.slots.declare(name, slot).is_err() {
            panic!("internal error: slot for {} declared twice", self.idents.resolve(name));
        }
        Ok(())
    }

    fn lower_assign(&mut self, assign: &Assign) -> Result<(), Error> {
        let value = self.lower_value(&assign.value)?;
        let slot = self.slot(assign.ident.name);
        self.builder.store(value, slot);
        Ok(())
    }

    /// ```text
    ///        ┌──────────────┐
    ///        │ i = start    │
    ///        └──────┬───────┘
    ///               ▼
    ///        ┌──────────────┐◄──┐
    ///        │ loop.body    │   │ end != i
    ///        └──────┬───────┘   │
    ///               ▼           │
    ///        ┌──────────────┐   │
    ///        │ loop.latch   ├───┘
    ///        │ i = i +/- 1  │
    ///        └──────┬───────┘
    ///               ▼
    ///          loop.after
    /// ```
    fn lower_for(&mut self, for_loop: &ForLoop) -> Result<(), Error> {
        // The induction variable's frame closes at `loop.after`.
        self.scoped(|this| {
            this.lower_decl(&for_loop.decl)?;
            let function = this.current_function();
            let body = this.builder.create_block(function, "loop.body");
            let latch = this.builder.create_block(function, "loop.latch");
            let after = this.builder.create_block(function, "loop.after");
            this.builder.br(body);

            this.builder.set_insertion_point(body);
            this.with_continuation(latch, |this| this.lower_scope(&for_loop.body))?;

            this.builder.set_insertion_point(latch);
            let end = this.lower_value(&for_loop.range_end)?;
            let slot = this.slot(for_loop.decl.ident.name);
            let current = this.builder.load(slot);
            let one = this.builder.const_int(IrType::I32, 1);
            let step = if for_loop.is_reverse {
                BinaryInst::Sub
            } else {
                BinaryInst::Add
            };
            let next = this.builder.binary(step, current, one);
            this.builder.store(next, slot);
            let again = this.builder.icmp(IntPredicate::Ne, end, next);
            this.builder.cond_br(again, body, after);

            this.builder.set_insertion_point(after);
            Ok(())
        })
    }

    fn lower_if(&mut self, chain: &IfElseChain) -> Result<(), Error> {
        let function = self.current_function();
        let header = self.builder.create_block(function, "if.header");
        // The `if` condition is tested in the header; each `elseif` gets a
        // block of its own for its test.
        let mut branches = Vec::with_capacity(1 + chain.elseif_branches.len());
        for (idx, branch) in chain.cond_branches().enumerate() {
            let (test, body) = if idx == 0 {
                (header, self.builder.create_block(function, "if.then"))
            } else {
                let test = self.builder.create_block(function, "elseif.cond");
                (test, self.builder.create_block(function, "elseif.then"))
            };
            branches.push((test, body, branch));
        }
        let else_block = chain
            .else_branch
            .as_ref()
            .map(|_| self.builder.create_block(function, "else"));
        let after = self.builder.create_block(function, "if.after");

        self.builder.br(header);
        for (idx, &(test, body, branch)) in branches.iter().enumerate() {
            let otherwise = branches
                .get(idx + 1)
                .map(|&(next_test, ..)| next_test)
                .or(else_block)
                .unwrap_or(after);
            self.builder.set_insertion_point(test);
            let cond = self.lower_value(&branch.condition)?;
            let taken = self.truthy(cond);
            self.builder.cond_br(taken, body, otherwise);

            self.builder.set_insertion_point(body);
            self.with_continuation(after, |this| this.lower_scope(&branch.body))?;
        }
        if let (Some(block), Some(scope)) = (else_block, &chain.else_branch) {
            self.builder.set_insertion_point(block);
            self.with_continuation(after, |this| this.lower_scope(scope))?;
        }

        self.builder.set_insertion_point(after);
        Ok(())
    }

    /// Returns `None` for [`ExprKind::Void`].
    fn lower_expr(&mut self, expr: &Expr) -> Result<Option<B::Value>, Error> {
        let value = match &expr.kind {
            ExprKind::Integer(int) => self.builder.const_int(IrType::I32, i64::from(*int)),
            ExprKind::Float(float) => self.builder.const_float(*float),
            ExprKind::Boolean(bool) => {
                self.builder
                    .const_int(IrType::I8, if *bool { TRUE } else { FALSE })
            }
            ExprKind::Ident(name) => {
                let slot = self.slot(*name);
                self.builder.load(slot)
            }
            ExprKind::Void => return Ok(None),
            ExprKind::Binary { op, lhs, rhs } => self.lower_binary(*op, lhs, rhs)?,
        };
        Ok(Some(value))
    }

    fn lower_value(&mut self, expr: &Expr) -> Result<B::Value, Error> {
        let value = self.lower_expr(expr)?;
        Ok(value.expect("void expression used as a value"))
    }

    fn lower_binary(&mut self, op: BinaryOperator, lhs: &Expr, rhs: &Expr) -> Result<B::Value, Error> {
        let ty = lhs.ty;
        let l = self.lower_value(lhs)?;
        let r = self.lower_value(rhs)?;

        if op.is_arithmetic() {
            let inst = arithmetic_inst(op, ty).ok_or(Error::UnsupportedOperation { op, ty })?;
            return Ok(self.builder.binary(inst, l, r));
        }
        let bit = match (op, ty) {
            (BinaryOperator::Eq | BinaryOperator::Ne, Type::Int | Type::Bool) => {
                let pred = if op == BinaryOperator::Eq {
                    IntPredicate::Eq
                } else {
                    IntPredicate::Ne
                };
                self.builder.icmp(pred, l, r)
            }
            (BinaryOperator::Eq | BinaryOperator::Ne, Type::Float) => {
                let pred = if op == BinaryOperator::Eq {
                    FloatPredicate::Oeq
                } else {
                    FloatPredicate::One
                };
                self.builder.fcmp(pred, l, r)
            }
            (BinaryOperator::And | BinaryOperator::Or, Type::Bool) => {
                let l = self.truthy(l);
                let r = self.truthy(r);
                let inst = if op == BinaryOperator::And {
                    BinaryInst::And
                } else {
                    BinaryInst::Or
                };
                self.builder.binary(inst, l, r)
            }
            _ => return Err(Error::UnsupportedOperation { op, ty }),
        };
        // Back to the `i8` boolean representation.
        Ok(self.builder.sext(bit, IrType::I8))
    }

    /// Narrows an `i8` boolean to the `i1` branches and logic operate on.
    fn truthy(&mut self, value: B::Value) -> B::Value {
        let t = self.builder.const_int(IrType::I8, TRUE);
        self.builder.icmp(IntPredicate::Eq, value, t)
    }

    fn slot(&self, name: Symbol) -> B::Slot {
        self.slots
            .lookup(name)
            .unwrap_or_else(|| panic!("internal error: no slot for {}", self.idents.resolve(name)))
    }

    fn current_function(&self) -> B::Function {
        self.function
            .as_ref()
            .expect("statement outside of a function")
            .handle
    }

    /// Runs `f` inside a fresh slot frame, popped on every exit path.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.slots.enter_scope();
        let result = f(self);
        self.slots.exit_scope();
        result
    }

    fn with_continuation<T>(&mut self, block: B::Block, f: impl FnOnce(&mut Self) -> T) -> T {
        self.continuations.push(block);
        let result = f(self);
        self.continuations.pop();
        result
    }
}

fn arithmetic_inst(op: BinaryOperator, ty: Type) -> Option<BinaryInst> {
    let inst = match (ty, op) {
        (Type::Int, BinaryOperator::Add) => BinaryInst::Add,
        (Type::Int, BinaryOperator::Sub) => BinaryInst::Sub,
        (Type::Int, BinaryOperator::Mul) => BinaryInst::Mul,
        (Type::Int, BinaryOperator::Div) => BinaryInst::SDiv,
        (Type::Float, BinaryOperator::Add) => BinaryInst::FAdd,
        (Type::Float, BinaryOperator::Sub) => BinaryInst::FSub,
        (Type::Float, BinaryOperator::Mul) => BinaryInst::FMul,
        (Type::Float, BinaryOperator::Div) => BinaryInst::FDiv,
        _ => return None,
    };
    Some(inst)
}

#[cfg(test)]
mod tests {
    use crate::util::test_utils::tree_tests;

    tree_tests!(
        use lower;

        fn test_void_function() {
            let program = "def main() end";
            let ir_ok = "
                ; ModuleID = 'test'

                define void @main() {
                entry:
                  br label %exit
                exit:
                  ret void
                }
            ";
        }

        fn test_return_value_goes_through_exit_slot() {
            let program = "
                def main()
                    var x = 2 * 3;
                    return x;
                end
            ";
            let ir_ok = "
                ; ModuleID = 'test'

                define i32 @main() {
                entry:
                  %exit.value = alloca i32
                  %x = alloca i32
                  %0 = mul i32 2, 3
                  store i32 %0, ptr %x
                  %1 = load i32, ptr %x
                  store i32 %1, ptr %exit.value
                  br label %exit
                exit:
                  %2 = load i32, ptr %exit.value
                  ret i32 %2
                }
            ";
        }

        fn test_float_arithmetic_and_assignment() {
            let program = "
                def f()
                    mut var a = 1.5;
                    a = a / 2.0;
                    return a;
                end
            ";
            let ir_ok = "
                ; ModuleID = 'test'

                define float @f() {
                entry:
                  %exit.value = alloca float
                  %a = alloca float
                  store float 1.5, ptr %a
                  %0 = load float, ptr %a
                  %1 = fdiv float %0, 2.0
                  store float %1, ptr %a
                  %2 = load float, ptr %a
                  store float %2, ptr %exit.value
                  br label %exit
                exit:
                  %3 = load float, ptr %exit.value
                  ret float %3
                }
            ";
        }

        fn test_bool_comparison_and_logic() {
            let program = "
                def f()
                    var b = 1 == 2 or 1.0 != 2.0;
                    return b and true;
                end
            ";
            let ir_ok = "
                ; ModuleID = 'test'

                define i8 @f() {
                entry:
                  %exit.value = alloca i8
                  %b = alloca i8
                  %0 = icmp eq i32 1, 2
                  %1 = sext i1 %0 to i8
                  %2 = fcmp one float 1.0, 2.0
                  %3 = sext i1 %2 to i8
                  %4 = icmp eq i8 %1, -1
                  %5 = icmp eq i8 %3, -1
                  %6 = or i1 %4, %5
                  %7 = sext i1 %6 to i8
                  store i8 %7, ptr %b
                  %8 = load i8, ptr %b
                  %9 = icmp eq i8 %8, -1
                  %10 = icmp eq i8 -1, -1
                  %11 = and i1 %9, %10
                  %12 = sext i1 %11 to i8
                  store i8 %12, ptr %exit.value
                  br label %exit
                exit:
                  %13 = load i8, ptr %exit.value
                  ret i8 %13
                }
            ";
        }

        fn test_for_loop() {
            let program = "
                def f()
                    mut var s = 0;
                    for i in 0..3 do
                        s = s + i;
                    end
                    return s;
                end
            ";
            let ir_ok = "
                ; ModuleID = 'test'

                define i32 @f() {
                entry:
                  %exit.value = alloca i32
                  %s = alloca i32
                  %i = alloca i32
                  store i32 0, ptr %s
                  store i32 0, ptr %i
                  br label %loop.body
                exit:
                  %7 = load i32, ptr %exit.value
                  ret i32 %7
                loop.body:
                  %0 = load i32, ptr %s
                  %1 = load i32, ptr %i
                  %2 = add i32 %0, %1
                  store i32 %2, ptr %s
                  br label %loop.latch
                loop.latch:
                  %3 = load i32, ptr %i
                  %4 = add i32 %3, 1
                  store i32 %4, ptr %i
                  %5 = icmp ne i32 3, %4
                  br i1 %5, label %loop.body, label %loop.after
                loop.after:
                  %6 = load i32, ptr %s
                  store i32 %6, ptr %exit.value
                  br label %exit
                }
            ";
        }

        fn test_reverse_for_loop_steps_down() {
            let program = "
                def f()
                    var hi = 3;
                    for i in reverse hi..0 do
                    end
                end
            ";
            let ir_ok = "
                ; ModuleID = 'test'

                define void @f() {
                entry:
                  %hi = alloca i32
                  %i = alloca i32
                  store i32 3, ptr %hi
                  %0 = load i32, ptr %hi
                  store i32 %0, ptr %i
                  br label %loop.body
                exit:
                  ret void
                loop.body:
                  br label %loop.latch
                loop.latch:
                  %1 = load i32, ptr %i
                  %2 = sub i32 %1, 1
                  store i32 %2, ptr %i
                  %3 = icmp ne i32 0, %2
                  br i1 %3, label %loop.body, label %loop.after
                loop.after:
                  br label %exit
                }
            ";
        }

        fn test_if_elseif_else() {
            let program = "
                def f()
                    var c = true;
                    if c then
                        return 1;
                    elseif false then
                        return 2;
                    else
                    end
                    return 3;
                end
            ";
            let ir_ok = "
                ; ModuleID = 'test'

                define i32 @f() {
                entry:
                  %exit.value = alloca i32
                  %c = alloca i8
                  store i8 -1, ptr %c
                  br label %if.header
                exit:
                  %3 = load i32, ptr %exit.value
                  ret i32 %3
                if.header:
                  %0 = load i8, ptr %c
                  %1 = icmp eq i8 %0, -1
                  br i1 %1, label %if.then, label %elseif.cond
                if.then:
                  store i32 1, ptr %exit.value
                  br label %exit
                elseif.cond:
                  %2 = icmp eq i8 0, -1
                  br i1 %2, label %elseif.then, label %else
                elseif.then:
                  store i32 2, ptr %exit.value
                  br label %exit
                else:
                  br label %if.after
                if.after:
                  store i32 3, ptr %exit.value
                  br label %exit
                }
            ";
        }

        fn test_if_without_else_falls_through_to_after() {
            let program = "
                def f()
                    if true then
                        var x = 1;
                    end
                end
            ";
            let ir_ok = "
                ; ModuleID = 'test'

                define void @f() {
                entry:
                  %x = alloca i32
                  br label %if.header
                exit:
                  ret void
                if.header:
                  %0 = icmp eq i8 -1, -1
                  br i1 %0, label %if.then, label %if.after
                if.then:
                  store i32 1, ptr %x
                  br label %if.after
                if.after:
                  br label %exit
                }
            ";
        }

        fn test_sibling_scopes_reuse_names() {
            let program = "
                def f()
                    for i in 0..2 do
                        var x = i;
                    end
                    for i in 0..2 do
                        var x = 1.0;
                    end
                end
            ";
            let ir_ok = "
                ; ModuleID = 'test'

                define void @f() {
                entry:
                  %i = alloca i32
                  %x = alloca i32
                  %i1 = alloca i32
                  %x1 = alloca float
                  store i32 0, ptr %i
                  br label %loop.body
                exit:
                  ret void
                loop.body:
                  %0 = load i32, ptr %i
                  store i32 %0, ptr %x
                  br label %loop.latch
                loop.latch:
                  %1 = load i32, ptr %i
                  %2 = add i32 %1, 1
                  store i32 %2, ptr %i
                  %3 = icmp ne i32 2, %2
                  br i1 %3, label %loop.body, label %loop.after
                loop.after:
                  store i32 0, ptr %i1
                  br label %loop.body1
                loop.body1:
                  store float 1.0, ptr %x1
                  br label %loop.latch1
                loop.latch1:
                  %4 = load i32, ptr %i1
                  %5 = add i32 %4, 1
                  store i32 %5, ptr %i1
                  %6 = icmp ne i32 2, %5
                  br i1 %6, label %loop.body1, label %loop.after1
                loop.after1:
                  br label %exit
                }
            ";
        }

        fn test_parse_errors_surface() {
            let program = "def f() return 1 end";
            let expected_error = "line 1: unexpected token End in expression";
        }
    );

    mod builder {
        use crate::{
            ast::{BinaryOperator, Expr, ExprKind, Function, Ident, Program, Return, Scope, Stmt},
            ir::{builder::IrType, text::TextBuilder},
            lower::{lower_program, Error},
            parser,
            token::Span,
            types::Type,
            util::intern::Interner,
        };
        use pretty_assertions::assert_eq;

        fn lower(src: &str) -> crate::ir::text::Module {
            let idents = &mut Interner::with_capacity(16);
            let program = parser::parse_program(src, idents).unwrap();
            let mut builder = TextBuilder::new("test");
            lower_program(&mut builder, idents, &program).unwrap();
            let module = builder.finish();
            module.verify().unwrap();
            module
        }

        #[test]
        fn test_elseif_chain_block_shape() {
            let module = lower(
                "def f()
                    var n = 2;
                    if n == 0 then
                    elseif n == 1 then
                    elseif n == 2 then
                    else
                    end
                end",
            );
            let f = module.function("f").unwrap();
            let names: Vec<_> = f.blocks.iter().map(|b| b.name.as_str()).collect();
            assert_eq!(
                names,
                [
                    "entry",
                    "exit",
                    "if.header",
                    "if.then",
                    "elseif.cond",
                    "elseif.then",
                    "elseif.cond1",
                    "elseif.then1",
                    "else",
                    "if.after",
                ]
            );
            assert_eq!(f.successors("if.header"), ["if.then", "elseif.cond"]);
            assert_eq!(f.successors("elseif.cond"), ["elseif.then", "elseif.cond1"]);
            assert_eq!(f.successors("elseif.cond1"), ["elseif.then1", "else"]);
            assert_eq!(
                f.predecessors("if.after"),
                ["if.then", "elseif.then", "elseif.then1", "else"]
            );
        }

        #[test]
        fn test_nested_loops_continue_to_enclosing_latch() {
            let module = lower(
                "def f()
                    for i in 0..2 do
                        for j in 0..2 do
                        end
                    end
                end",
            );
            let f = module.function("f").unwrap();
            // The inner loop exits into a block that closes the outer body.
            assert_eq!(f.successors("loop.after1"), ["loop.latch"]);
            assert_eq!(f.successors("loop.latch1"), ["loop.body1", "loop.after1"]);
            assert_eq!(f.successors("loop.after"), ["exit"]);
            assert_eq!(f.predecessors("exit"), ["loop.after"]);
        }

        #[test]
        fn test_return_inside_loop_skips_latch() {
            let module = lower(
                "def f()
                    for i in 0..10 do
                        if i == 5 then
                            return i;
                        end
                    end
                    return 0;
                end",
            );
            let f = module.function("f").unwrap();
            assert_eq!(f.ret, IrType::I32);
            assert_eq!(f.successors("if.then"), ["exit"]);
            assert_eq!(f.successors("if.after"), ["loop.latch"]);
            assert_eq!(f.predecessors("exit"), ["loop.after", "if.then"]);
        }

        #[test]
        fn test_functions_are_lowered_in_order() {
            let module = lower("def a() end def b() return 1.0; end");
            let names: Vec<_> = module.functions.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, ["a", "b"]);
            assert_eq!(module.functions[1].ret, IrType::F32);
        }

        /// A program the parser would reject: `def f() return lhs <op> rhs; end`.
        fn lower_returned_binary(
            op: BinaryOperator,
            ty: Type,
            lhs: ExprKind,
            rhs: ExprKind,
        ) -> Result<(), Error> {
            let idents = &mut Interner::with_capacity(1);
            let span = Span::new_of_length(0, 1, 1);
            let leaf = |kind| Box::new(Expr { kind, ty, span });
            let value = Expr {
                kind: ExprKind::Binary {
                    op,
                    lhs: leaf(lhs),
                    rhs: leaf(rhs),
                },
                ty: if op.is_arithmetic() { ty } else { Type::Bool },
                span,
            };
            let program = Program {
                functions: vec![Function {
                    name: Ident {
                        name: idents.intern("f"),
                        span,
                    },
                    return_ty: value.ty,
                    body: Scope {
                        children: vec![Stmt::Return(Return { value, span })],
                    },
                }],
            };
            lower_program(&mut TextBuilder::new("test"), idents, &program)
        }

        #[test]
        fn test_unsupported_operations_are_errors() {
            assert_eq!(
                lower_returned_binary(
                    BinaryOperator::Add,
                    Type::Bool,
                    ExprKind::Boolean(true),
                    ExprKind::Boolean(false),
                ),
                Err(Error::UnsupportedOperation {
                    op: BinaryOperator::Add,
                    ty: Type::Bool,
                })
            );
            assert_eq!(
                lower_returned_binary(
                    BinaryOperator::And,
                    Type::Int,
                    ExprKind::Integer(1),
                    ExprKind::Integer(2),
                ),
                Err(Error::UnsupportedOperation {
                    op: BinaryOperator::And,
                    ty: Type::Int,
                })
            );
            assert_eq!(
                Error::UnsupportedOperation {
                    op: BinaryOperator::Or,
                    ty: Type::Float,
                }
                .to_string(),
                "unsupported operation Or on operands of type float"
            );
        }
    }
}
