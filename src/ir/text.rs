//! An [`IrBuilder`] that records instructions in memory and prints them as
//! LLVM-flavoured assembly.

use std::{collections::HashSet, fmt};

use crate::ir::builder::{BinaryInst, FloatPredicate, IntPredicate, IrBuilder, IrType};

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    /// A virtual register, numbered per function.
    Reg(u32, IrType),
    Int(IrType, i64),
    Float(f32),
}

impl Value {
    pub fn ty(self) -> IrType {
        match self {
            Value::Reg(_, ty) | Value::Int(ty, _) => ty,
            Value::Float(_) => IrType::F32,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Reg(reg, _) => write!(f, "%{reg}"),
            Value::Int(_, int) => write!(f, "{int}"),
            Value::Float(float) => write_float(f, *float),
        }
    }
}

/// Plain decimal when it reads back to the exact same value, otherwise the
/// hexadecimal `double` bit pattern LLVM accepts for any `float`.
fn write_float(f: &mut fmt::Formatter<'_>, float: f32) -> fmt::Result {
    let wide = f64::from(float);
    let decimal = format!("{float:?}");
    let exact = decimal.bytes().all(|b| b.is_ascii_digit() || b == b'.' || b == b'-')
        && decimal.parse::<f64>() == Ok(wide);
    if exact {
        f.write_str(&decimal)
    } else {
        write!(f, "0x{:016X}", wide.to_bits())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FunctionRef(usize);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockRef {
    function: usize,
    index: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotRef {
    function: usize,
    index: usize,
}

/// Slots and blocks are referred to by their index in the owning function.
#[derive(Clone, Debug, PartialEq)]
pub enum Inst {
    Alloca { slot: usize },
    Load { dst: u32, slot: usize },
    Store { value: Value, slot: usize },
    Binary { dst: u32, op: BinaryInst, lhs: Value, rhs: Value },
    ICmp { dst: u32, pred: IntPredicate, lhs: Value, rhs: Value },
    FCmp { dst: u32, pred: FloatPredicate, lhs: Value, rhs: Value },
    SExt { dst: u32, value: Value, ty: IrType },
}

#[derive(Clone, Debug, PartialEq)]
pub enum Terminator {
    Br(usize),
    CondBr {
        cond: Value,
        then: usize,
        otherwise: usize,
    },
    Ret(Option<Value>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub name: String,
    pub insts: Vec<Inst>,
    pub terminator: Option<Terminator>,
}

impl Block {
    /// Indices of the blocks this one may branch to.
    pub fn successors(&self) -> Vec<usize> {
        match self.terminator {
            Some(Terminator::Br(dest)) => vec![dest],
            Some(Terminator::CondBr {
                then, otherwise, ..
            }) => vec![then, otherwise],
            Some(Terminator::Ret(_)) | None => Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Slot {
    pub name: String,
    pub ty: IrType,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub name: String,
    pub ret: IrType,
    pub blocks: Vec<Block>,
    pub slots: Vec<Slot>,
    next_reg: u32,
    /// Block and slot names share a namespace.
    used_names: HashSet<String>,
}

impl Function {
    fn new(name: &str, ret: IrType) -> Function {
        Function {
            name: name.to_owned(),
            ret,
            blocks: Vec::with_capacity(8),
            slots: Vec::with_capacity(8),
            next_reg: 0,
            used_names: HashSet::with_capacity(16),
        }
    }

    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|block| block.name == name)
    }

    /// Names of the blocks `name` may branch to. Empty if there is no such
    /// block.
    pub fn successors(&self, name: &str) -> Vec<&str> {
        self.block(name)
            .map(|block| {
                block
                    .successors()
                    .into_iter()
                    .map(|index| self.blocks[index].name.as_str())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Names of the blocks that may branch to `name`, in block order.
    pub fn predecessors(&self, name: &str) -> Vec<&str> {
        self.blocks
            .iter()
            .filter(|block| {
                block
                    .successors()
                    .into_iter()
                    .any(|index| self.blocks[index].name == name)
            })
            .map(|block| block.name.as_str())
            .collect()
    }

    /// Returns `base`, or `base` suffixed with the first free number.
    fn unique_name(&mut self, base: &str) -> String {
        let mut candidate = base.to_owned();
        let mut n = 0;
        while !self.used_names.insert(candidate.clone()) {
            n += 1;
            candidate = format!("{base}{n}");
        }
        candidate
    }

    fn fresh_reg(&mut self) -> u32 {
        let reg = self.next_reg;
        self.next_reg += 1;
        reg
    }

    fn write_inst(&self, f: &mut fmt::Formatter<'_>, inst: &Inst) -> fmt::Result {
        let slot = |index: usize| &self.slots[index];
        match inst {
            Inst::Alloca { slot: index } => {
                let Slot { name, ty } = slot(*index);
                write!(f, "%{name} = alloca {ty}")
            }
            Inst::Load { dst, slot: index } => {
                let Slot { name, ty } = slot(*index);
                write!(f, "%{dst} = load {ty}, ptr %{name}")
            }
            Inst::Store { value, slot: index } => {
                let name = &slot(*index).name;
                write!(f, "store {} {value}, ptr %{name}", value.ty())
            }
            Inst::Binary { dst, op, lhs, rhs } => {
                write!(f, "%{dst} = {op} {} {lhs}, {rhs}", lhs.ty())
            }
            Inst::ICmp {
                dst,
                pred,
                lhs,
                rhs,
            } => write!(f, "%{dst} = icmp {pred} {} {lhs}, {rhs}", lhs.ty()),
            Inst::FCmp {
                dst,
                pred,
                lhs,
                rhs,
            } => write!(f, "%{dst} = fcmp {pred} {} {lhs}, {rhs}", lhs.ty()),
            Inst::SExt { dst, value, ty } => {
                write!(f, "%{dst} = sext {} {value} to {ty}", value.ty())
            }
        }
    }

    fn write_terminator(&self, f: &mut fmt::Formatter<'_>, terminator: &Terminator) -> fmt::Result {
        let label = |index: usize| &self.blocks[index].name;
        match terminator {
            Terminator::Br(dest) => write!(f, "br label %{}", label(*dest)),
            Terminator::CondBr {
                cond,
                then,
                otherwise,
            } => write!(
                f,
                "br i1 {cond}, label %{}, label %{}",
                label(*then),
                label(*otherwise)
            ),
            Terminator::Ret(None) => write!(f, "ret void"),
            Terminator::Ret(Some(value)) => write!(f, "ret {} {value}", value.ty()),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "define {} @{}() {{", self.ret, self.name)?;
        for block in &self.blocks {
            writeln!(f, "{}:", block.name)?;
            for inst in &block.insts {
                write!(f, "  ")?;
                self.write_inst(f, inst)?;
                writeln!(f)?;
            }
            if let Some(terminator) = &block.terminator {
                write!(f, "  ")?;
                self.write_terminator(f, terminator)?;
                writeln!(f)?;
            }
        }
        writeln!(f, "}}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|function| function.name == name)
    }

    /// Checks that every function has blocks, every block is terminated,
    /// branch targets exist and returns agree with the function's return type.
    pub fn verify(&self) -> Result<(), VerifyError> {
        for function in &self.functions {
            if function.blocks.is_empty() {
                return Err(VerifyError::Empty {
                    function: function.name.clone(),
                });
            }
            for block in &function.blocks {
                match &block.terminator {
                    None => {
                        return Err(VerifyError::MissingTerminator {
                            function: function.name.clone(),
                            block: block.name.clone(),
                        });
                    }
                    Some(Terminator::Ret(value)) => {
                        let ty = value.map_or(IrType::Void, Value::ty);
                        if ty != function.ret {
                            return Err(VerifyError::ReturnType {
                                function: function.name.clone(),
                                expected: function.ret,
                                actual: ty,
                            });
                        }
                    }
                    Some(_) => (),
                }
                if block.successors().iter().any(|&index| index >= function.blocks.len()) {
                    return Err(VerifyError::UnknownTarget {
                        function: function.name.clone(),
                        block: block.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        for function in &self.functions {
            writeln!(f)?;
            write!(f, "{function}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerifyError {
    #[error("function {function} has no blocks")]
    Empty { function: String },
    #[error("block {block} of function {function} has no terminator")]
    MissingTerminator { function: String, block: String },
    #[error("block {block} of function {function} branches to a block that does not exist")]
    UnknownTarget { function: String, block: String },
    #[error("function {function} returns {actual}, but is declared to return {expected}")]
    ReturnType {
        function: String,
        expected: IrType,
        actual: IrType,
    },
}

pub struct TextBuilder {
    module: Module,
    insertion: Option<BlockRef>,
}

impl TextBuilder {
    pub fn new(module_name: impl Into<String>) -> TextBuilder {
        TextBuilder {
            module: Module {
                name: module_name.into(),
                functions: Vec::with_capacity(8),
            },
            insertion: None,
        }
    }

    pub fn finish(self) -> Module {
        self.module
    }

    fn at(&self) -> BlockRef {
        self.insertion.expect("no insertion point set")
    }

    fn function_mut(&mut self) -> &mut Function {
        let at = self.at();
        &mut self.module.functions[at.function]
    }

    fn block_mut(&mut self) -> &mut Block {
        let at = self.at();
        let block = &mut self.module.functions[at.function].blocks[at.index];
        debug_assert!(
            block.terminator.is_none(),
            "emitting into terminated block {}",
            block.name
        );
        block
    }

    fn push(&mut self, inst: Inst) {
        self.block_mut().insts.push(inst);
    }

    fn terminate(&mut self, terminator: Terminator) {
        self.block_mut().terminator = Some(terminator);
    }

    /// Index of `block` in the current function.
    fn local(&self, block: BlockRef) -> usize {
        assert_eq!(
            block.function,
            self.at().function,
            "branch across functions"
        );
        block.index
    }

    fn slot_index(&self, slot: SlotRef) -> usize {
        assert_eq!(slot.function, self.at().function, "slot of another function");
        slot.index
    }

    fn emit(&mut self, ty: IrType, make: impl FnOnce(u32) -> Inst) -> Value {
        let dst = self.function_mut().fresh_reg();
        self.push(make(dst));
        Value::Reg(dst, ty)
    }
}

impl IrBuilder for TextBuilder {
    type Function = FunctionRef;
    type Block = BlockRef;
    type Value = Value;
    type Slot = SlotRef;

    fn create_function(&mut self, name: &str, ret: IrType) -> FunctionRef {
        self.module.functions.push(Function::new(name, ret));
        FunctionRef(self.module.functions.len() - 1)
    }

    fn create_block(&mut self, function: FunctionRef, name: &str) -> BlockRef {
        let f = &mut self.module.functions[function.0];
        let name = f.unique_name(name);
        log::trace!("creating block {name} in {}", f.name);
        f.blocks.push(Block {
            name,
            insts: Vec::new(),
            terminator: None,
        });
        BlockRef {
            function: function.0,
            index: f.blocks.len() - 1,
        }
    }

    fn set_insertion_point(&mut self, block: BlockRef) {
        self.insertion = Some(block);
    }

    fn br(&mut self, dest: BlockRef) {
        let dest = self.local(dest);
        self.terminate(Terminator::Br(dest));
    }

    fn cond_br(&mut self, cond: Value, then: BlockRef, otherwise: BlockRef) {
        debug_assert_eq!(cond.ty(), IrType::I1);
        let then = self.local(then);
        let otherwise = self.local(otherwise);
        self.terminate(Terminator::CondBr {
            cond,
            then,
            otherwise,
        });
    }

    fn ret(&mut self, value: Option<Value>) {
        self.terminate(Terminator::Ret(value));
    }

    fn alloca(&mut self, ty: IrType, name: &str) -> SlotRef {
        let at = self.at();
        let function = self.function_mut();
        let name = function.unique_name(name);
        function.slots.push(Slot { name, ty });
        let index = function.slots.len() - 1;
        // Allocas are grouped at the top of the entry block, in creation order.
        let entry = function.blocks.first_mut().expect("function without entry block");
        let position = entry
            .insts
            .iter()
            .take_while(|inst| matches!(inst, Inst::Alloca { .. }))
            .count();
        entry.insts.insert(position, Inst::Alloca { slot: index });
        SlotRef {
            function: at.function,
            index,
        }
    }

    fn load(&mut self, slot: SlotRef) -> Value {
        let slot = self.slot_index(slot);
        let ty = self.function_mut().slots[slot].ty;
        self.emit(ty, |dst| Inst::Load { dst, slot })
    }

    fn store(&mut self, value: Value, slot: SlotRef) {
        let slot = self.slot_index(slot);
        debug_assert_eq!(self.function_mut().slots[slot].ty, value.ty());
        self.push(Inst::Store { value, slot });
    }

    fn const_int(&mut self, ty: IrType, value: i64) -> Value {
        Value::Int(ty, value)
    }

    fn const_float(&mut self, value: f32) -> Value {
        Value::Float(value)
    }

    fn binary(&mut self, op: BinaryInst, lhs: Value, rhs: Value) -> Value {
        debug_assert_eq!(lhs.ty(), rhs.ty());
        self.emit(lhs.ty(), |dst| Inst::Binary { dst, op, lhs, rhs })
    }

    fn icmp(&mut self, pred: IntPredicate, lhs: Value, rhs: Value) -> Value {
        debug_assert_eq!(lhs.ty(), rhs.ty());
        self.emit(IrType::I1, |dst| Inst::ICmp {
            dst,
            pred,
            lhs,
            rhs,
        })
    }

    fn fcmp(&mut self, pred: FloatPredicate, lhs: Value, rhs: Value) -> Value {
        self.emit(IrType::I1, |dst| Inst::FCmp {
            dst,
            pred,
            lhs,
            rhs,
        })
    }

    fn sext(&mut self, value: Value, ty: IrType) -> Value {
        self.emit(ty, |dst| Inst::SExt { dst, value, ty })
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_build_and_print() {
        let mut b = TextBuilder::new("demo");
        let f = b.create_function("main", IrType::I32);
        let entry = b.create_block(f, "entry");
        let exit = b.create_block(f, "exit");
        b.set_insertion_point(entry);
        let result = b.alloca(IrType::I32, "result");
        let one = b.const_int(IrType::I32, 1);
        let two = b.load(result);
        let sum = b.binary(BinaryInst::Add, one, two);
        b.store(sum, result);
        b.br(exit);
        b.set_insertion_point(exit);
        let value = b.load(result);
        b.ret(Some(value));

        let module = b.finish();
        assert_eq!(module.verify(), Ok(()));
        assert_eq!(
            module.to_string(),
            indoc! {"
                ; ModuleID = 'demo'

                define i32 @main() {
                entry:
                  %result = alloca i32
                  %0 = load i32, ptr %result
                  %1 = add i32 1, %0
                  store i32 %1, ptr %result
                  br label %exit
                exit:
                  %2 = load i32, ptr %result
                  ret i32 %2
                }
            "}
        );
    }

    #[test]
    fn test_allocas_are_hoisted_to_entry() {
        let mut b = TextBuilder::new("demo");
        let f = b.create_function("f", IrType::Void);
        let entry = b.create_block(f, "entry");
        let body = b.create_block(f, "body");
        b.set_insertion_point(entry);
        let a = b.alloca(IrType::F32, "a");
        let half = b.const_float(0.5);
        b.store(half, a);
        b.br(body);
        b.set_insertion_point(body);
        let c = b.alloca(IrType::I8, "c");
        let truth = b.const_int(IrType::I8, -1);
        b.store(truth, c);
        b.ret(None);

        let module = b.finish();
        let entry = &module.functions[0].blocks[0];
        assert_eq!(
            entry.insts[..2],
            [Inst::Alloca { slot: 0 }, Inst::Alloca { slot: 1 }]
        );
        assert_eq!(module.function("f").unwrap().blocks[1].insts.len(), 1);
    }

    #[test]
    fn test_names_are_uniquified() {
        let mut b = TextBuilder::new("demo");
        let f = b.create_function("f", IrType::Void);
        let entry = b.create_block(f, "entry");
        b.set_insertion_point(entry);
        let x1 = b.alloca(IrType::I32, "x1");
        let x = b.alloca(IrType::I32, "x");
        let x_again = b.alloca(IrType::I32, "x");
        let x_third = b.alloca(IrType::I32, "x");
        let body = b.create_block(f, "body");
        let body_again = b.create_block(f, "body");
        b.ret(None);
        b.set_insertion_point(body);
        b.ret(None);
        b.set_insertion_point(body_again);
        b.ret(None);

        let module = b.finish();
        let function = &module.functions[0];
        let names: Vec<_> = [x1, x, x_again, x_third]
            .iter()
            .map(|slot| function.slots[slot.index].name.as_str())
            .collect();
        assert_eq!(names, ["x1", "x", "x2", "x3"]);
        assert!(function.block("body").is_some());
        assert!(function.block("body1").is_some());
    }

    #[test]
    fn test_successors_and_predecessors() {
        let mut b = TextBuilder::new("demo");
        let f = b.create_function("f", IrType::Void);
        let entry = b.create_block(f, "entry");
        let left = b.create_block(f, "left");
        let right = b.create_block(f, "right");
        let join = b.create_block(f, "join");
        b.set_insertion_point(entry);
        let t = b.const_int(IrType::I8, -1);
        let cond = b.icmp(IntPredicate::Eq, t, t);
        b.cond_br(cond, left, right);
        for block in [left, right] {
            b.set_insertion_point(block);
            b.br(join);
        }
        b.set_insertion_point(join);
        b.ret(None);

        let module = b.finish();
        let function = module.function("f").unwrap();
        assert_eq!(function.successors("entry"), ["left", "right"]);
        assert_eq!(function.predecessors("join"), ["left", "right"]);
        assert!(function.successors("join").is_empty());
    }

    #[test]
    fn test_verify_reports_missing_terminator() {
        let mut b = TextBuilder::new("demo");
        let f = b.create_function("f", IrType::Void);
        let entry = b.create_block(f, "entry");
        b.create_block(f, "dangling");
        b.set_insertion_point(entry);
        b.ret(None);

        assert_eq!(
            b.finish().verify(),
            Err(VerifyError::MissingTerminator {
                function: "f".into(),
                block: "dangling".into(),
            })
        );
    }

    #[test]
    fn test_verify_reports_unknown_target() {
        let mut module = Module {
            name: "demo".into(),
            functions: vec![Function::new("f", IrType::Void)],
        };
        module.functions[0].blocks.push(Block {
            name: "entry".into(),
            insts: Vec::new(),
            terminator: Some(Terminator::Br(3)),
        });

        assert_eq!(
            module.verify(),
            Err(VerifyError::UnknownTarget {
                function: "f".into(),
                block: "entry".into(),
            })
        );
    }

    #[test]
    fn test_verify_reports_return_type() {
        let mut b = TextBuilder::new("demo");
        let f = b.create_function("f", IrType::I32);
        let entry = b.create_block(f, "entry");
        b.set_insertion_point(entry);
        b.ret(None);

        let error = b.finish().verify().unwrap_err();
        assert_eq!(
            error.to_string(),
            "function f returns void, but is declared to return i32"
        );
    }

    #[test]
    fn test_float_constants_print_in_exact_form() {
        let shown = |float: f32| Value::Float(float).to_string();
        assert_eq!(shown(1.5), "1.5");
        assert_eq!(shown(-2.0), "-2.0");
        // Neither reads back exactly as a decimal `float`.
        assert_eq!(shown(0.1), "0x3FB99999A0000000");
        assert_eq!(shown(1e16), "0x4341C37940000000");
    }
}
