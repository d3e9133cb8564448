//! String interning.
//!
//! Identifiers are compared and hashed constantly across the lexer, parser,
//! and semantic analyzer — interning them once turns those comparisons into
//! `u32` equality instead of byte-by-byte string comparison, and lets
//! [`Symbol`] be `Copy`.
//!
//! The interner is process-global behind a `RefCell`, matching the single-
//! threaded, single-arena-per-invocation model of spec §5: nothing here is
//! `Sync`, and `ceeify-drv` never shares one interner across concurrent
//! invocations.

use rustc_hash::FxHashMap;
use std::cell::RefCell;

/// An interned string.
///
/// Two `Symbol`s compare equal iff the strings they were interned from are
/// equal; comparison and hashing are O(1).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    pub fn intern(s: &str) -> Symbol {
        INTERNER.with(|i| i.borrow_mut().intern(s))
    }

    pub fn as_str(self) -> &'static str {
        INTERNER.with(|i| i.borrow().resolve(self))
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol({:?})", self.as_str())
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

struct Interner {
    strings: Vec<&'static str>,
    names: FxHashMap<&'static str, Symbol>,
}

impl Interner {
    fn new() -> Self {
        Self { strings: Vec::new(), names: FxHashMap::default() }
    }

    fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.names.get(s) {
            return sym;
        }
        // Strings live for the process lifetime; this is the same trade-off
        // the teacher's interner makes (one arena-backed allocation per
        // unique identifier, never freed until process exit).
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(leaked);
        self.names.insert(leaked, sym);
        sym
    }

    fn resolve(&self, sym: Symbol) -> &'static str {
        self.strings[sym.0 as usize]
    }
}

thread_local! {
    static INTERNER: RefCell<Interner> = RefCell::new(Interner::new());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_string_twice_yields_same_symbol() {
        let a = Symbol::intern("hello");
        let b = Symbol::intern("hello");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_strings_intern_to_distinct_symbols() {
        let a = Symbol::intern("foo");
        let b = Symbol::intern("bar");
        assert_ne!(a, b);
        assert_eq!(a.as_str(), "foo");
        assert_eq!(b.as_str(), "bar");
    }
}
