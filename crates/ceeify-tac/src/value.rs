//! Operand representation for three-address instructions (spec §4.4).
//!
//! Spec §4.4: "Every operand is a `TACValue = (id, DataType)`. Two pools of
//! ids exist: register ids... [and] variable ids". The two pools are kept as
//! distinct id *types* here (`RegId` vs. `SymbolId`) rather than one untyped
//! `id` field, so a builder bug that feeds a register id where a variable id
//! belongs is a compile error instead of a silently wrong TAC dump — the
//! same motivation `ceeify_util::IndexVec` documents for typed indices.

use ceeify_sem::{DataType, SymbolId};
use ceeify_util::{new_index_type, Idx};

new_index_type! {
    /// A register id (spec §4.4: "monotonically increasing per program;
    /// each arithmetic instruction produces a fresh register").
    pub struct RegId;
}

new_index_type! {
    pub struct ConstId;
}

new_index_type! {
    /// A fresh label `L<n>` (spec §4.4: "allocated from a per-builder
    /// counter").
    pub struct LabelId;
}

impl std::fmt::Display for LabelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "L{}", self.as_u32())
    }
}

/// An instruction operand. `None` is the explicit "unused" tag spec §4.4
/// calls for ("unused operands are tagged NONE").
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TACValue {
    Reg(RegId, DataType),
    Var(SymbolId, DataType),
    Const(ConstId, DataType),
    /// A raw, non-pooled integer immediate — used for `ARG`'s positional
    /// index (spec §4.4: "for each parameter emit `ARG index -> var_id`"),
    /// which names a position, not a typed value worth constant-pool
    /// dedup.
    Imm(i64),
    /// A compiler-synthesized pseudo-callee for operators with no dedicated
    /// opcode (see `builder.rs`'s intrinsic lowering for `//`, `%`, `**`,
    /// `and`, `or`, `not`).
    Intrinsic(&'static str),
    None,
}

impl TACValue {
    pub fn dtype(&self) -> DataType {
        match self {
            TACValue::Reg(_, t) | TACValue::Var(_, t) | TACValue::Const(_, t) => *t,
            TACValue::Imm(_) => DataType::Int,
            TACValue::Intrinsic(_) | TACValue::None => DataType::Unknown,
        }
    }
}
