//! Symbol table and scope chain (spec §3's `Symbol`/`Scope`).
//!
//! Grounded in the teacher's `faxc-sem::scope::{RibId, Rib, ScopeTree}` shape
//! — an `IndexVec`-indexed arena of scopes linked by a `parent` back-edge,
//! walked outward on lookup — but the payload is spec §3's flat `Symbol`
//! record (`kind`, `dtype`, `scope_depth`, `base_class`) instead of the
//! teacher's generic/trait-object Fax symbol. Using `SymbolId`/`ScopeId`
//! index types instead of raw pointers implements spec §9's "Arena + index
//! instead of raw pointer graphs" for the one genuinely cyclic structure in
//! this crate (`base_class` back-edges, scope parents).

use ceeify_util::{new_index_type, Idx, IndexVec, Span, Symbol as Name};
use indexmap::IndexMap;

use crate::types::DataType;

new_index_type! {
    /// A stable numeric symbol id (spec §3: `Symbol.id`).
    pub struct SymbolId;
}

new_index_type! {
    pub struct ScopeId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    Var,
    Function,
    Class,
    Module,
    Block,
}

/// One declared name (spec §3's `Symbol`).
#[derive(Clone, Debug)]
pub struct SymbolEntry {
    pub id: SymbolId,
    pub name: Name,
    pub kind: SymbolKind,
    pub dtype: DataType,
    pub scope_depth: u32,
    pub decl_span: Span,
    /// Owned inner scope, for FUNCTION/CLASS/MODULE symbols (spec §3).
    pub scope: Option<ScopeId>,
    /// For CLASS symbols, the single base class; for parameter symbols
    /// bound to `self`, the enclosing class (spec §3, §4.3's self rule).
    pub base_class: Option<SymbolId>,
    /// Declared parameter types, populated for FUNCTION symbols so `Call`
    /// can arity/type-check against them (spec §4.3's `Call` rule).
    pub param_types: Vec<DataType>,
}

/// A single scope (spec §3's `Scope`): an unordered-by-spec, but here
/// insertion-ordered, set of `name -> Symbol` bindings plus a link to the
/// enclosing scope. Insertion order is kept (via `IndexMap`) because the
/// emitter (§4.5) walks a class's own fields in declaration order to lay out
/// the generated struct.
#[derive(Debug)]
pub struct Scope {
    pub parent: Option<ScopeId>,
    pub bindings: IndexMap<Name, SymbolId>,
}

#[derive(Debug)]
pub struct SymbolTable {
    pub symbols: IndexVec<SymbolId, SymbolEntry>,
    pub scopes: IndexVec<ScopeId, Scope>,
}

impl SymbolTable {
    pub fn new() -> Self {
        let mut scopes = IndexVec::new();
        scopes.push(Scope { parent: None, bindings: IndexMap::new() });
        Self { symbols: IndexVec::new(), scopes }
    }

    pub fn root_scope(&self) -> ScopeId {
        ScopeId::from_usize(0)
    }

    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        self.scopes.push(Scope { parent: Some(parent), bindings: IndexMap::new() })
    }

    #[allow(clippy::too_many_arguments)]
    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: Name,
        kind: SymbolKind,
        dtype: DataType,
        scope_depth: u32,
        decl_span: Span,
        base_class: Option<SymbolId>,
    ) -> SymbolId {
        let id = self.symbols.next_id();
        self.symbols.push(SymbolEntry {
            id,
            name,
            kind,
            dtype,
            scope_depth,
            decl_span,
            scope: None,
            base_class,
            param_types: Vec::new(),
        });
        self.scopes[scope].bindings.insert(name, id);
        id
    }

    pub fn symbol(&self, id: SymbolId) -> &SymbolEntry {
        &self.symbols[id]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut SymbolEntry {
        &mut self.symbols[id]
    }

    /// Lexical lookup (spec §3's `Scope`: "walk parents until found").
    pub fn lookup(&self, scope: ScopeId, name: Name) -> Option<SymbolId> {
        let mut cur = Some(scope);
        while let Some(s) = cur {
            if let Some(&id) = self.scopes[s].bindings.get(&name) {
                return Some(id);
            }
            cur = self.scopes[s].parent;
        }
        None
    }

    /// Local-only lookup; does not cross the scope-chain link (spec §3:
    /// "Local lookup does not cross the link").
    pub fn lookup_local(&self, scope: ScopeId, name: Name) -> Option<SymbolId> {
        self.scopes[scope].bindings.get(&name).copied()
    }

    /// Transitive member lookup across `base_class` (spec §3 invariant 3,
    /// spec §8 property 6: "every field of B is visible via
    /// `lookup_member(C, name)`").
    pub fn lookup_member(&self, class: SymbolId, name: Name) -> Option<SymbolId> {
        let mut cur = Some(class);
        while let Some(c) = cur {
            let class_scope = self.symbols[c].scope?;
            if let Some(&id) = self.scopes[class_scope].bindings.get(&name) {
                return Some(id);
            }
            cur = self.symbols[c].base_class;
        }
        None
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceeify_util::Span;

    #[test]
    fn lookup_walks_parent_chain() {
        let mut table = SymbolTable::new();
        let root = table.root_scope();
        let x = Name::intern("x");
        table.declare(root, x, SymbolKind::Var, DataType::Int, 0, Span::DUMMY, None);
        let inner = table.push_scope(root);
        assert_eq!(table.lookup(inner, x), table.lookup_local(root, x));
    }

    #[test]
    fn shadowing_in_inner_scope_wins_locally() {
        let mut table = SymbolTable::new();
        let root = table.root_scope();
        let x = Name::intern("shadow_me");
        let outer_x = table.declare(root, x, SymbolKind::Var, DataType::Int, 0, Span::DUMMY, None);
        let inner = table.push_scope(root);
        let inner_x =
            table.declare(inner, x, SymbolKind::Var, DataType::Float, 1, Span::DUMMY, None);
        assert_ne!(outer_x, inner_x);
        assert_eq!(table.lookup(inner, x), Some(inner_x));
    }

    #[test]
    fn lookup_member_walks_base_class() {
        let mut table = SymbolTable::new();
        let root = table.root_scope();
        let base_name = Name::intern("Animal");
        let base = table.declare(root, base_name, SymbolKind::Class, DataType::Unknown, 0, Span::DUMMY, None);
        let base_scope = table.push_scope(root);
        table.symbol_mut(base).scope = Some(base_scope);
        let field = Name::intern("legs");
        table.declare(base_scope, field, SymbolKind::Var, DataType::Int, 1, Span::DUMMY, None);

        let sub_name = Name::intern("Dog");
        let sub =
            table.declare(root, sub_name, SymbolKind::Class, DataType::Unknown, 0, Span::DUMMY, Some(base));
        let sub_scope = table.push_scope(root);
        table.symbol_mut(sub).scope = Some(sub_scope);

        assert!(table.lookup_member(sub, field).is_some());
    }
}
