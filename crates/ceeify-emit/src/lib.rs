//! The source emitter (spec §4.5): a direct AST-to-C-text pass, no
//! intermediate representation of its own. It shares the `Analysis` side
//! table with `ceeify-tac` but walks the tree independently (spec §2) —
//! unlike the teacher's `faxc-gen`, there is no LLVM IR, no target-machine
//! codegen, and no linker step here, just text into a `StringBuilder`.

pub mod emitter;
pub mod error;
pub mod operators;
pub mod types;

pub use emitter::emit;
pub use error::{EmitError, EmitResult};

#[cfg(test)]
mod tests {
    use super::*;
    use ceeify_util::Handler;

    fn emit_src(src: &str) -> String {
        let mut handler = Handler::new();
        let tokens = ceeify_lex::tokenize(src, &mut handler);
        let mut module = ceeify_par::parse_module(tokens).expect("parse failed");
        let analysis = ceeify_sem::analyze(&mut module).expect("analysis failed");
        emit(&module, &analysis).expect("emit failed")
    }

    #[test]
    fn e1_literal_assignment() {
        assert_eq!(emit_src("x = 42\n").trim(), "int x = 42;");
    }

    #[test]
    fn e2_arithmetic_precedence_matches_source_shape() {
        assert_eq!(emit_src("y = 3 + 5 * 2\n").trim(), "int y = 3 + 5 * 2;");
    }

    #[test]
    fn second_assignment_to_same_name_omits_the_type() {
        let out = emit_src("x = 1\nx = 2\n");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "int x = 1;");
        assert_eq!(lines[1], "x = 2;");
    }

    #[test]
    fn e5_method_emission_mangles_name_and_walks_base_chain() {
        let out = emit_src(
            "class Animal:\n    def __init__(self, name: str):\n        self.name = name\nclass Dog(Animal):\n    def __init__(self, name: str):\n        self.name = name\n",
        );
        assert!(out.contains("typedef struct {\n    char* name;\n} Animal;"));
        assert!(out.contains("typedef struct {\n    Animal* base;\n} Dog;"));
        assert!(out.contains("void Dog___init__(Dog* self, char* name) {"));
        assert!(out.contains("self->base->name = name;"));
    }

    #[test]
    fn e6_match_with_guard_substitutes_temporary_into_guard() {
        let out = emit_src("x = 1\nmatch x:\n    case n if n > 0:\n        y = 1\n    case _:\n        y = 0\n");
        assert!(out.contains("int _tmp0 = x;"));
        assert!(out.contains("if ((_tmp0 > 0)) {"));
        assert!(out.contains("int n = _tmp0;"));
        assert!(out.contains("else {"));
    }

    #[test]
    fn and_or_not_map_to_c_boolean_operators() {
        let out = emit_src("a = True\nb = False\nc = a and b\nd = a or b\ne = not a\n");
        assert!(out.contains("c = a && b;"));
        assert!(out.contains("d = a || b;"));
        assert!(out.contains("e = !a;"));
    }

    #[test]
    fn chained_comparison_joins_with_ampersand_ampersand() {
        let out = emit_src("a = 5\nflag = 1 <= a < 10\n");
        assert!(out.contains("(1 <= a) && (a < 10)"));
    }

    #[test]
    fn pow_operator_is_rejected_as_unsupported_before_emit_is_reached() {
        let mut handler = Handler::new();
        let tokens = ceeify_lex::tokenize("x = 2 ** 3\n", &mut handler);
        let mut module = ceeify_par::parse_module(tokens).expect("parse failed");
        assert!(ceeify_sem::analyze(&mut module).is_err());
    }
}
