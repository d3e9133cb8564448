//! The IR builder (spec §4.4): a flat three-address-code generator with a
//! deduplicated constant pool. No optimizer beyond that dedup (spec §1
//! Non-goal) — this crate has no basic-block graph, no dataflow analysis,
//! and no rewrite passes, unlike the teacher's CFG-shaped `faxc-mir`.

pub mod builder;
pub mod const_pool;
pub mod error;
pub mod instr;
pub mod value;

pub use builder::{build, Program};
pub use const_pool::ConstPool;
pub use error::{TacError, TacResult};
pub use instr::{Instruction, Op};
pub use value::{ConstId, LabelId, RegId, TACValue};

#[cfg(test)]
mod tests {
    use super::*;
    use ceeify_util::Handler;

    fn build_src(src: &str) -> Program {
        let mut handler = Handler::new();
        let tokens = ceeify_lex::tokenize(src, &mut handler);
        let mut module = ceeify_par::parse_module(tokens).expect("parse failed");
        let analysis = ceeify_sem::analyze(&mut module).expect("analysis failed");
        build(&module, &analysis).expect("tac build failed")
    }

    #[test]
    fn e1_literal_assignment_emits_const_and_store() {
        let program = build_src("x = 42\n");
        let ops: Vec<Op> = program.instructions.iter().map(|i| i.op).collect();
        assert_eq!(ops, vec![Op::Const, Op::Store]);
        assert_eq!(program.consts.len(), 1);
    }

    #[test]
    fn e2_arithmetic_precedence_lowers_mul_before_add() {
        let program = build_src("y = 3 + 5 * 2\n");
        let ops: Vec<Op> = program.instructions.iter().map(|i| i.op).collect();
        // 3, 5, 2 all CONST; MUL before the final ADD; then STORE.
        let mul_pos = ops.iter().position(|op| *op == Op::Mul).unwrap();
        let add_pos = ops.iter().position(|op| *op == Op::Add).unwrap();
        assert!(mul_pos < add_pos);
        assert_eq!(*ops.last().unwrap(), Op::Store);
    }

    #[test]
    fn e3_if_elif_chain_emits_two_jz_and_matching_labels() {
        let program = build_src("x = 1\nif x < 10:\n    y = 5\nelif x < 20:\n    y = 15\n");
        let jz_count = program.instructions.iter().filter(|i| i.op == Op::Jz).count();
        let label_count = program.instructions.iter().filter(|i| i.op == Op::Label).count();
        assert_eq!(jz_count, 2);
        // one LABEL per branch (else_label, nested end) plus the final LABEL.
        assert_eq!(label_count, 3);
    }

    #[test]
    fn constant_pool_dedups_identical_literals() {
        let program = build_src("x = 1\ny = 1\n");
        assert_eq!(program.consts.len(), 1);
    }

    #[test]
    fn unary_minus_lowers_to_const_zero_and_sub() {
        let program = build_src("x = 1\ny = -x\n");
        let sub = program.instructions.iter().find(|i| i.op == Op::Sub).expect("expected a SUB");
        assert!(matches!(sub.lhs, TACValue::Reg(_, _)));
    }

    #[test]
    fn function_def_emits_label_then_arg_per_parameter() {
        let program = build_src("def add(a: int, b: int) -> int:\n    return a + b\n");
        assert_eq!(program.instructions[0].op, Op::Label);
        assert_eq!(program.instructions[1].op, Op::Arg);
        assert_eq!(program.instructions[2].op, Op::Arg);
        assert!(program.instructions.iter().any(|i| i.op == Op::Return));
    }

    #[test]
    fn chained_comparison_emits_two_cmp_instructions() {
        let program = build_src("a = 5\nflag = 1 <= a < 10\n");
        let cmp_count = program.instructions.iter().filter(|i| i.op == Op::Cmp).count();
        assert_eq!(cmp_count, 2);
    }
}
