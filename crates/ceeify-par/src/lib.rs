//! The operator-precedence parser (spec §4.2): tokens in, an owned AST out.
//! Statement dispatch walks the token stream once; expressions within a
//! statement are parsed by collecting the bounded token run and running it
//! through shunting yard (see [`expr`]).

pub mod ast;
pub mod error;
mod expr;
mod stmt;

pub use error::{ParseError, ParseResult};
pub use stmt::parse_module;

#[cfg(test)]
mod tests {
    use super::*;
    use ast::{BinOp, Expr, LiteralValue, Stmt, VarContext};
    use ceeify_util::Handler;

    fn parse(src: &str) -> ast::Block {
        let mut handler = Handler::new();
        let tokens = ceeify_lex::tokenize(src, &mut handler);
        assert!(!handler.has_errors(), "lex errors: {:?}", handler.diagnostics());
        parse_module(tokens).expect("parse failed")
    }

    #[test]
    fn e1_literal_assignment_parses() {
        let module = parse("x = 42\n");
        assert_eq!(module.len(), 1);
        match &module[0] {
            Stmt::Assignment(a) => {
                assert_eq!(a.targets.len(), 1);
                match &a.value {
                    Expr::Literal(l) => assert!(matches!(l.value, LiteralValue::Int(ref s) if s == "42")),
                    other => panic!("expected literal, got {other:?}"),
                }
            }
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn arithmetic_precedence_nests_multiplication_under_addition() {
        let module = parse("x = 1 + 2 * 3\n");
        match &module[0] {
            Stmt::Assignment(a) => match &a.value {
                Expr::BinaryOp(b) => {
                    assert_eq!(b.op, BinOp::Add);
                    assert!(matches!(*b.right, Expr::BinaryOp(ref rhs) if rhs.op == BinOp::Mul));
                }
                other => panic!("expected binary op, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn power_operator_is_right_associative() {
        let module = parse("x = 2 ** 3 ** 2\n");
        match &module[0] {
            Stmt::Assignment(a) => match &a.value {
                Expr::BinaryOp(b) => {
                    assert_eq!(b.op, BinOp::Pow);
                    // right-assoc: top node's right child is itself a ** op
                    assert!(matches!(*b.right, Expr::BinaryOp(ref rhs) if rhs.op == BinOp::Pow));
                }
                other => panic!("expected binary op, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn chained_comparison_builds_one_compare_node() {
        let module = parse("flag = 1 <= a < 10\n");
        match &module[0] {
            Stmt::Assignment(a) => match &a.value {
                Expr::Compare(c) => {
                    assert_eq!(c.ops.len(), 2);
                    assert_eq!(c.comparators.len(), 2);
                }
                other => panic!("expected compare, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn e3_if_elif_else_chain_nests_as_right_leaning_tree() {
        let module = parse("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n");
        match &module[0] {
            Stmt::If(top) => {
                assert_eq!(top.body.len(), 1);
                assert_eq!(top.orelse.len(), 1);
                match &top.orelse[0] {
                    Stmt::If(elif) => {
                        assert_eq!(elif.orelse.len(), 1);
                    }
                    other => panic!("expected nested if, got {other:?}"),
                }
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn function_def_parses_params_and_return_annotation() {
        let module = parse("def add(a: int, b: int) -> int:\n    return a + b\n");
        match &module[0] {
            Stmt::FunctionDef(f) => {
                assert_eq!(f.params.len(), 2);
                assert!(f.returns.is_some());
                assert_eq!(f.body.len(), 1);
            }
            other => panic!("expected function def, got {other:?}"),
        }
    }

    #[test]
    fn class_def_parses_single_base() {
        let module = parse("class Dog(Animal):\n    def bark(self):\n        return 1\n");
        match &module[0] {
            Stmt::ClassDef(c) => {
                assert_eq!(c.bases.len(), 1);
                assert_eq!(c.body.len(), 1);
            }
            other => panic!("expected class def, got {other:?}"),
        }
    }

    #[test]
    fn attribute_and_call_chain_parses_left_to_right() {
        let module = parse("y = obj.method(1, 2).field\n");
        match &module[0] {
            Stmt::Assignment(a) => match &a.value {
                Expr::Attribute(attr) => {
                    assert!(matches!(*attr.object, Expr::Call(_)));
                }
                other => panic!("expected attribute, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn list_literal_parses_all_elements() {
        let module = parse("xs = [1, 2, 3]\n");
        match &module[0] {
            Stmt::Assignment(a) => match &a.value {
                Expr::List(l) => assert_eq!(l.items.len(), 3),
                other => panic!("expected list, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn match_statement_rejects_structural_pattern() {
        let mut handler = Handler::new();
        let tokens = ceeify_lex::tokenize("match x:\n    case [a, b]:\n        y = 1\n", &mut handler);
        let err = parse_module(tokens).unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedPattern { .. }));
    }

    #[test]
    fn match_statement_accepts_literal_and_wildcard_patterns() {
        let module = parse("match x:\n    case 1:\n        y = 1\n    case _:\n        y = 2\n");
        match &module[0] {
            Stmt::Match(m) => assert_eq!(m.cases.len(), 2),
            other => panic!("expected match, got {other:?}"),
        }
    }

    #[test]
    fn unary_minus_binds_tighter_than_addition() {
        let module = parse("x = -1 + 2\n");
        match &module[0] {
            Stmt::Assignment(a) => match &a.value {
                Expr::BinaryOp(b) => assert!(matches!(*b.left, Expr::UnaryOp(_))),
                other => panic!("expected binary op, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    #[test]
    fn import_statement_parses_multiple_names() {
        let module = parse("import os, sys\n");
        match &module[0] {
            Stmt::Import(i) => assert_eq!(i.names.len(), 2),
            other => panic!("expected import, got {other:?}"),
        }
    }

    #[test]
    fn variable_target_has_store_context() {
        let module = parse("x = 1\n");
        match &module[0] {
            Stmt::Assignment(a) => match &a.targets[0] {
                Expr::Variable(v) => assert_eq!(v.context, VarContext::Store),
                other => panic!("expected variable, got {other:?}"),
            },
            other => panic!("expected assignment, got {other:?}"),
        }
    }

    proptest::proptest! {
        #[test]
        fn parsing_never_panics_on_arbitrary_arithmetic(s in "[a-z][a-z0-9]{0,3} = [0-9]{1,3}( [+*/-] [0-9]{1,3}){0,4}\n") {
            let mut handler = ceeify_util::Handler::new();
            let tokens = ceeify_lex::tokenize(&s, &mut handler);
            let _ = parse_module(tokens);
        }
    }
}
