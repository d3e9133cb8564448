//! `DataType` (spec §3, §4.3): the semantic type lattice the analyzer
//! infers bottom-up and the emitter maps onto target-language types.

use crate::scope::SymbolId;

/// One of the eight types spec §3 enumerates. `Object` carries the class
/// `Symbol` it names so attribute lookups (§4.3's `Attribute` rule) and the
/// emitter's `<class_name>*` mapping (§4.5) both have something to resolve
/// against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    Int,
    Float,
    Str,
    Bool,
    List,
    Object(SymbolId),
    None,
    Unknown,
}

impl DataType {
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int | DataType::Float)
    }

    /// INT→FLOAT widening is the only legal mismatch (spec §3 invariant 2,
    /// §4.3's arithmetic rule). Same-type pairs always widen to themselves.
    pub fn widen(self, other: DataType) -> Option<DataType> {
        match (self, other) {
            (a, b) if a == b => Some(a),
            (DataType::Int, DataType::Float) | (DataType::Float, DataType::Int) => {
                Some(DataType::Float)
            }
            _ => None,
        }
    }

    pub fn class_id(self) -> Option<SymbolId> {
        match self {
            DataType::Object(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceeify_util::Idx;

    #[test]
    fn same_type_widens_to_itself() {
        assert_eq!(DataType::Int.widen(DataType::Int), Some(DataType::Int));
    }

    #[test]
    fn int_and_float_widen_to_float() {
        assert_eq!(DataType::Int.widen(DataType::Float), Some(DataType::Float));
        assert_eq!(DataType::Float.widen(DataType::Int), Some(DataType::Float));
    }

    #[test]
    fn str_and_int_do_not_widen() {
        assert_eq!(DataType::Str.widen(DataType::Int), None);
    }

    #[test]
    fn object_carries_its_class_symbol() {
        let id = SymbolId::from_usize(3);
        assert_eq!(DataType::Object(id).class_id(), Some(id));
    }
}
