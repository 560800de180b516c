use std::{collections::HashMap, fmt, num::NonZeroU32, rc::Rc};

/// A handle to an interned identifier. Resolve it back to text with
/// [`Interner::resolve`].
///
/// Two symbols from the same interner are equal iff their text is equal.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(NonZeroU32);

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Deduplicating identifier storage shared by every compilation phase.
pub struct Interner {
    map: HashMap<Rc<str>, Symbol>,
    names: Vec<Rc<str>>,
}

impl fmt::Debug for Interner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.names).finish()
    }
}

impl Default for Interner {
    fn default() -> Self {
        Interner::with_capacity(0)
    }
}

impl Interner {
    pub fn with_capacity(capacity: usize) -> Self {
        Interner {
            map: HashMap::with_capacity(capacity),
            names: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the symbol for `name`, allocating one on first sight.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(&symbol) = self.map.get(name) {
            return symbol;
        }
        let next = u32::try_from(self.names.len() + 1).expect("interner out of capacity");
        let symbol = Symbol(NonZeroU32::new(next).expect("handles start at one"));
        let name: Rc<str> = Rc::from(name);
        self.names.push(Rc::clone(&name));
        self.map.insert(name, symbol);
        symbol
    }

    /// Looks a name up without interning it.
    pub fn get(&self, name: &str) -> Option<Symbol> {
        self.map.get(name).copied()
    }

    /// Panics if the symbol was produced by another interner.
    pub fn resolve(&self, symbol: Symbol) -> &str {
        let index = symbol.0.get() as usize - 1;
        &self.names[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interner() {
        let mut i = Interner::with_capacity(3);

        let main1 = i.intern("main");
        let x1 = i.intern("x");
        let main2 = i.intern("main");
        let x2 = i.intern("x");

        assert_eq!(main1, main2);
        assert_eq!(x1, x2);
        assert_ne!(main1, x1);
        assert_eq!(i.len(), 2);

        assert_eq!(i.resolve(main1), "main");
        assert_eq!(i.resolve(x2), "x");
        assert_eq!(i.get("x"), Some(x1));
        assert_eq!(i.get("y"), None);
    }
}
