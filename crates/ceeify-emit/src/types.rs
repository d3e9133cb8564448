//! Type mapping (spec §4.5): `INT->int, FLOAT->float, STR->char*,
//! BOOL->bool, LIST->list, NONE->void, OBJECT-><class_name>*`.

use ceeify_sem::{DataType, SymbolTable};

pub fn c_type(dtype: DataType, table: &SymbolTable) -> String {
    match dtype {
        DataType::Int => "int".to_string(),
        DataType::Float => "float".to_string(),
        DataType::Str => "char*".to_string(),
        DataType::Bool => "bool".to_string(),
        DataType::List => "list".to_string(),
        DataType::None => "void".to_string(),
        DataType::Unknown => "void".to_string(),
        DataType::Object(class) => format!("{}*", table.symbol(class).name.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_types_map_directly() {
        let table = SymbolTable::new();
        assert_eq!(c_type(DataType::Int, &table), "int");
        assert_eq!(c_type(DataType::Str, &table), "char*");
        assert_eq!(c_type(DataType::Bool, &table), "bool");
        assert_eq!(c_type(DataType::None, &table), "void");
    }
}
