//! The instruction-building interface lowering is written against.
//!
//! Implementors own the emitted code. Lowering only ever holds the opaque,
//! copyable handles defined by the associated types.

use std::fmt;

use crate::types::Type;

/// Machine-level value types.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IrType {
    /// Comparison results and branch conditions.
    I1,
    /// Booleans as stored in variables. True has every bit set.
    I8,
    I32,
    F32,
    Void,
}

impl IrType {
    pub const fn of(ty: Type) -> IrType {
        match ty {
            Type::Int => IrType::I32,
            Type::Float => IrType::F32,
            Type::Bool => IrType::I8,
            Type::Void => IrType::Void,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IrType::I1 => "i1",
            IrType::I8 => "i8",
            IrType::I32 => "i32",
            IrType::F32 => "float",
            IrType::Void => "void",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryInst {
    Add,
    Sub,
    Mul,
    SDiv,
    FAdd,
    FSub,
    FMul,
    FDiv,
    And,
    Or,
}

impl fmt::Display for BinaryInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinaryInst::Add => "add",
            BinaryInst::Sub => "sub",
            BinaryInst::Mul => "mul",
            BinaryInst::SDiv => "sdiv",
            BinaryInst::FAdd => "fadd",
            BinaryInst::FSub => "fsub",
            BinaryInst::FMul => "fmul",
            BinaryInst::FDiv => "fdiv",
            BinaryInst::And => "and",
            BinaryInst::Or => "or",
        })
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IntPredicate {
    Eq,
    Ne,
}

/// Ordered float comparisons: false if either operand is NaN.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FloatPredicate {
    Oeq,
    One,
}

impl fmt::Display for IntPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
        })
    }
}

impl fmt::Display for FloatPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FloatPredicate::Oeq => "oeq",
            FloatPredicate::One => "one",
        })
    }
}

pub trait IrBuilder {
    type Function: Copy;
    type Block: Copy;
    type Value: Copy;
    type Slot: Copy;

    /// Creates a function taking no parameters.
    fn create_function(&mut self, name: &str, ret: IrType) -> Self::Function;

    /// Appends an empty block to `function`. The first block created is its
    /// entry block.
    fn create_block(&mut self, function: Self::Function, name: &str) -> Self::Block;

    /// Instructions are appended to `block` from now on.
    fn set_insertion_point(&mut self, block: Self::Block);

    fn br(&mut self, dest: Self::Block);

    /// `cond` must be an `i1`.
    fn cond_br(&mut self, cond: Self::Value, then: Self::Block, otherwise: Self::Block);

    /// Returns `value`, or nothing from a void function.
    fn ret(&mut self, value: Option<Self::Value>);

    /// Allocates a named stack slot. Slots always live in the entry block of
    /// the current function, wherever the insertion point is.
    fn alloca(&mut self, ty: IrType, name: &str) -> Self::Slot;

    fn load(&mut self, slot: Self::Slot) -> Self::Value;

    fn store(&mut self, value: Self::Value, slot: Self::Slot);

    fn const_int(&mut self, ty: IrType, value: i64) -> Self::Value;

    fn const_float(&mut self, value: f32) -> Self::Value;

    fn binary(&mut self, op: BinaryInst, lhs: Self::Value, rhs: Self::Value) -> Self::Value;

    /// Yields an `i1`.
    fn icmp(&mut self, pred: IntPredicate, lhs: Self::Value, rhs: Self::Value) -> Self::Value;

    /// Yields an `i1`.
    fn fcmp(&mut self, pred: FloatPredicate, lhs: Self::Value, rhs: Self::Value) -> Self::Value;

    /// Sign-extends an integer value to the wider `ty`.
    fn sext(&mut self, value: Self::Value, ty: IrType) -> Self::Value;
}
