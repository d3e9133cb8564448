//! Bump-allocated arena, scoped to one pipeline invocation.
//!
//! Spec §5 requires that tokens, AST nodes, symbols, scope entries, TAC
//! instructions, and emitted strings all live in one arena whose lifetime
//! equals the invocation, with release-on-exit instead of per-object
//! bookkeeping. [`Arena`] wraps `bumpalo::Bump` and is the thing a
//! `ceeify-drv::Session` owns one of per compile.
//!
//! Back-edges such as `Expr::parent` or a class symbol's `base_class` are
//! represented as index types (see [`crate::index_vec`]) rather than
//! references into the arena, so they stay valid across arena growth and
//! never need a lifetime parameter threaded through the whole tree (spec §9:
//! "Arena + index instead of raw pointer graphs").

use bumpalo::Bump;

/// A named, bump-allocated region with optional debug-mode usage counters.
///
/// The `name` and stats are purely diagnostic — nothing in the pipeline
/// reads them back — mirroring spec §6's "Optional tagging with a name
/// string for debug output" and "Optional stats counters... when debug mode
/// is enabled".
pub struct Arena {
    bump: Bump,
    name: &'static str,
    debug: bool,
    alloc_count: std::cell::Cell<usize>,
}

impl Arena {
    pub fn new(name: &'static str) -> Self {
        Self { bump: Bump::new(), name, debug: false, alloc_count: std::cell::Cell::new(0) }
    }

    pub fn with_debug_stats(name: &'static str) -> Self {
        Self { bump: Bump::new(), name, debug: true, alloc_count: std::cell::Cell::new(0) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Allocates `value` in the arena and returns a reference tied to the
    /// arena's lifetime.
    pub fn alloc<T>(&self, value: T) -> &mut T {
        if self.debug {
            self.alloc_count.set(self.alloc_count.get() + 1);
        }
        self.bump.alloc(value)
    }

    pub fn alloc_str(&self, s: &str) -> &str {
        if self.debug {
            self.alloc_count.set(self.alloc_count.get() + 1);
        }
        self.bump.alloc_str(s)
    }

    /// Total bytes currently allocated from the underlying chunks.
    pub fn bytes_allocated(&self) -> usize {
        self.bump.allocated_bytes()
    }

    pub fn allocation_count(&self) -> usize {
        self.alloc_count.get()
    }

    /// Frees the whole arena in one operation. Dropping the `Arena` does
    /// this implicitly; this exists for callers that want to release memory
    /// before the `Arena` itself goes out of scope.
    pub fn reset(&mut self) {
        self.bump.reset();
        self.alloc_count.set(0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_returns_usable_reference() {
        let arena = Arena::new("test");
        let x: &mut i32 = arena.alloc(42);
        assert_eq!(*x, 42);
        *x = 7;
        assert_eq!(*x, 7);
    }

    #[test]
    fn debug_stats_count_allocations() {
        let arena = Arena::with_debug_stats("test");
        arena.alloc(1);
        arena.alloc(2);
        assert_eq!(arena.allocation_count(), 2);
    }
}
