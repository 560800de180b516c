use std::collections::HashMap;

use crate::{types::VarInfo, util::intern::Symbol};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeclError {
    /// The name was already declared in the current frame.
    Redeclaration,
    /// The name is live in an enclosing frame.
    Shadowing,
}

/// Maps every live identifier to its value, plus a stack of frames recording
/// which names each lexical block declared.
///
/// The parser instantiates it with [`VarInfo`]; the lowering pass reuses it to
/// track stack slots.
///
/// Frames must be strictly nested: every [`SymbolTable::enter_scope`] needs
/// exactly one matching [`SymbolTable::exit_scope`].
#[derive(Debug)]
pub struct SymbolTable<V = VarInfo> {
    live: HashMap<Symbol, V>,
    frames: Vec<Vec<Symbol>>,
}

impl<V> Default for SymbolTable<V> {
    fn default() -> Self {
        SymbolTable::with_capacity(0)
    }
}

impl<V> SymbolTable<V> {
    pub fn with_capacity(capacity: usize) -> SymbolTable<V> {
        SymbolTable {
            live: HashMap::with_capacity(capacity),
            frames: Vec::with_capacity(8),
        }
    }

    /// Records `name` in the innermost frame.
    ///
    /// Panics if no frame is open.
    pub fn declare(&mut self, name: Symbol, value: V) -> Result<(), DeclError> {
        let frame = self
            .frames
            .last_mut()
            .expect("declaration outside of any scope");
        if self.live.contains_key(&name) {
            return Err(if frame.contains(&name) {
                DeclError::Redeclaration
            } else {
                DeclError::Shadowing
            });
        }
        frame.push(name);
        self.live.insert(name, value);
        Ok(())
    }

    pub fn enter_scope(&mut self) {
        self.frames.push(Vec::new());
    }

    /// Pops the innermost frame, erasing every name it declared.
    pub fn exit_scope(&mut self) {
        let frame = self.frames.pop().expect("unbalanced scope exit");
        for name in frame {
            self.live.remove(&name);
        }
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl<V: Copy> SymbolTable<V> {
    pub fn lookup(&self, name: Symbol) -> Option<V> {
        self.live.get(&name).copied()
    }
}
