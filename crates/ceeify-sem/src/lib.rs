//! The semantic analyzer (spec §4.3): a recursive scope/type-resolving
//! walk over the `ceeify-par` AST, grounded in the teacher's `faxc-sem`
//! walk shape but built against this language's own type system —
//! `DataType`, single-inheritance `base_class` chains, keyword-less `self`
//! recognition, and synthetic field insertion for `self.x = ...` inside
//! `__init__`.

pub mod analysis;
pub mod error;
pub mod scope;
pub mod types;

pub use analysis::{analyze, Analysis};
pub use error::{SemError, SemResult};
pub use scope::{Scope, SymbolEntry, SymbolId, SymbolKind, SymbolTable};
pub use types::DataType;

#[cfg(test)]
mod tests {
    use super::*;
    use ceeify_util::Handler;

    fn analyze_src(src: &str) -> SemResult<Analysis> {
        let mut handler = Handler::new();
        let tokens = ceeify_lex::tokenize(src, &mut handler);
        let mut module = ceeify_par::parse_module(tokens).expect("parse failed");
        analyze(&mut module)
    }

    #[test]
    fn e4_undefined_name_is_name_error() {
        let err = analyze_src("z = x + 1\n").unwrap_err();
        assert!(matches!(err, SemError::NameError { .. }));
    }

    #[test]
    fn shadowing_in_function_scope_does_not_leak_out() {
        let analysis = analyze_src("x = 1\ndef f():\n    x = 2.5\n    return x\n").unwrap();
        let module_x = analysis.table.lookup(analysis.module_scope, ceeify_util::Symbol::intern("x"));
        assert_eq!(analysis.table.symbol(module_x.unwrap()).dtype, DataType::Int);
    }

    #[test]
    fn self_parameter_is_recognized_without_a_keyword() {
        let analysis = analyze_src(
            "class Animal:\n    def speak(me):\n        return me\n",
        )
        .unwrap();
        let class_id =
            analysis.table.lookup(analysis.module_scope, ceeify_util::Symbol::intern("Animal")).unwrap();
        let class_scope = analysis.table.symbol(class_id).scope.unwrap();
        let method_id =
            analysis.table.lookup_local(class_scope, ceeify_util::Symbol::intern("speak")).unwrap();
        let method_scope = analysis.table.symbol(method_id).scope.unwrap();
        let first_param =
            analysis.table.lookup_local(method_scope, ceeify_util::Symbol::intern("me")).unwrap();
        assert_eq!(analysis.table.symbol(first_param).dtype, DataType::Object(class_id));
    }

    #[test]
    fn self_assignment_inserts_synthetic_field_into_class_body() {
        let mut handler = Handler::new();
        let src = "class Dog:\n    def __init__(self, name):\n        self.name = name\n";
        let tokens = ceeify_lex::tokenize(src, &mut handler);
        let mut module = ceeify_par::parse_module(tokens).expect("parse failed");
        analyze(&mut module).expect("analysis failed");
        match &module[0] {
            ceeify_par::ast::Stmt::ClassDef(c) => {
                assert!(matches!(&c.body[0], ceeify_par::ast::Stmt::Expr(ceeify_par::ast::Expr::Variable(v), _) if v.name.as_str() == "name"));
            }
            other => panic!("expected class def, got {other:?}"),
        }
    }

    #[test]
    fn attribute_assignment_outside_init_is_invalid_operation() {
        let err = analyze_src(
            "class Dog:\n    def rename(self, name):\n        self.name = name\n",
        )
        .unwrap_err();
        assert!(matches!(err, SemError::InvalidOperation { .. }));
    }

    #[test]
    fn multiple_inheritance_is_rejected() {
        let err = analyze_src(
            "class A:\n    def f(self):\n        return 1\nclass B:\n    def g(self):\n        return 1\nclass C(A, B):\n    def h(self):\n        return 1\n",
        )
        .unwrap_err();
        assert!(matches!(err, SemError::UnsupportedFeature { .. }));
    }

    #[test]
    fn inherited_attribute_resolves_through_base_class() {
        let analysis = analyze_src(
            "class Animal:\n    def __init__(self, legs):\n        self.legs = legs\nclass Dog(Animal):\n    def paws(self):\n        return self.legs\n",
        )
        .unwrap();
        let dog = analysis.table.lookup(analysis.module_scope, ceeify_util::Symbol::intern("Dog")).unwrap();
        let legs = analysis.table.lookup_member(dog, ceeify_util::Symbol::intern("legs"));
        assert!(legs.is_some());
    }

    #[test]
    fn wildcard_case_before_last_case_is_unreachable() {
        let err = analyze_src("x = 1\nmatch x:\n    case _:\n        y = 1\n    case 2:\n        y = 2\n");
        let err = err.unwrap_err();
        assert!(matches!(err, SemError::UnreachablePattern { .. }));
    }

    #[test]
    fn call_arity_mismatch_is_reported() {
        let err = analyze_src("def f(a, b):\n    return a\nx = f(1)\n").unwrap_err();
        assert!(matches!(err, SemError::ArityMismatch { .. }));
    }

    #[test]
    fn redeclaration_in_same_scope_is_rejected() {
        let err = analyze_src("def f():\n    return 1\ndef f():\n    return 2\n").unwrap_err();
        assert!(matches!(err, SemError::Redeclaration { .. }));
    }

    #[test]
    fn exponentiation_is_rejected_as_unsupported() {
        let err = analyze_src("x = 2 ** 3\n").unwrap_err();
        assert!(matches!(err, SemError::UnsupportedFeature { .. }));
    }

    #[test]
    fn int_plus_float_widens_variable_to_float() {
        let analysis = analyze_src("x = 1\nx = 2.5\n").unwrap();
        let id = analysis.table.lookup(analysis.module_scope, ceeify_util::Symbol::intern("x")).unwrap();
        assert_eq!(analysis.table.symbol(id).dtype, DataType::Float);
    }
}
