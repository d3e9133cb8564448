//! Shared infrastructure used by every stage of the ceeify pipeline: the
//! bump arena, string interning, source spans, diagnostic rendering, the
//! emitter's string builder, and the typed-index vector used for symbol and
//! scope ids.
//!
//! Nothing in this crate knows about the source or target language; it is
//! the "external collaborators" layer spec §1/§6 carve out of the core, made
//! concrete instead of left as an interface description.

pub mod arena;
pub mod diagnostic;
pub mod index_vec;
pub mod span;
pub mod string_builder;
pub mod symbol;

pub use arena::Arena;
pub use diagnostic::{Diagnostic, Handler, Level};
pub use index_vec::{Idx, IndexVec};
pub use span::Span;
pub use string_builder::StringBuilder;
pub use symbol::Symbol;
