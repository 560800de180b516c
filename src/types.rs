use std::fmt;

/// The static type of a value.
///
/// The language has no user-defined types, so this is a closed set.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int,
    Float,
    Bool,
    Void,
}

impl Type {
    pub const fn name(self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Float => "float",
            Type::Bool => "bool",
            Type::Void => "void",
        }
    }

    pub const fn is_void(self) -> bool {
        matches!(self, Type::Void)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Information the parser keeps about a live variable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VarInfo {
    pub ty: Type,
    pub is_mutable: bool,
}

impl VarInfo {
    pub const fn new(ty: Type, is_mutable: bool) -> VarInfo {
        VarInfo { ty, is_mutable }
    }

    /// Loop induction variables are always immutable integers.
    pub const fn induction() -> VarInfo {
        VarInfo::new(Type::Int, false)
    }
}
