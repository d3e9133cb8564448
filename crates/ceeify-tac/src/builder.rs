//! The TAC builder (spec §4.4): walks the same tree `ceeify-sem` annotated
//! and emits a flat instruction list plus the constant pool. Grounded in the
//! teacher's "one struct owns a growing instruction `Vec` plus per-builder
//! counters" shape, but flattened to spec §4.4's linear TAC instead of the
//! teacher's basic-block CFG — this stage has no optimizer beyond constant-
//! pool dedup (spec §1 Non-goal), so there is no block graph to build.

use ceeify_par::ast::{self, BinOp, Expr, Pattern, Stmt, UnOp};
use ceeify_sem::{Analysis, DataType};
use ceeify_util::{Idx, Symbol as Name};

use crate::const_pool::ConstPool;
use crate::error::{TacError, TacResult};
use crate::instr::{Instruction, Op};
use crate::value::{LabelId, RegId, TACValue};

pub struct Builder<'a> {
    analysis: &'a Analysis,
    instructions: Vec<Instruction>,
    consts: ConstPool,
    next_reg: u32,
    next_label: u32,
    /// Readable names for function/method entry labels, kept alongside the
    /// numeric `LabelId`s so `--dump-tac` (SPEC_FULL.md's ambient CLI) can
    /// print `L3 (Dog___init__)` instead of a bare number.
    label_names: std::collections::HashMap<LabelId, String>,
}

/// The builder's output (spec §4.4): the flat instruction list plus the
/// deduplicated constant pool.
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub consts: ConstPool,
    pub label_names: std::collections::HashMap<LabelId, String>,
}

pub fn build(module: &ast::Block, analysis: &Analysis) -> TacResult<Program> {
    let mut builder = Builder {
        analysis,
        instructions: Vec::new(),
        consts: ConstPool::new(),
        next_reg: 0,
        next_label: 0,
        label_names: std::collections::HashMap::new(),
    };
    builder.lower_block(module)?;
    Ok(Program {
        instructions: builder.instructions,
        consts: builder.consts,
        label_names: builder.label_names,
    })
}

impl<'a> Builder<'a> {
    fn fresh_reg(&mut self) -> RegId {
        let id = RegId::from_usize(self.next_reg as usize);
        self.next_reg += 1;
        id
    }

    fn fresh_label(&mut self) -> LabelId {
        let id = LabelId::from_usize(self.next_label as usize);
        self.next_label += 1;
        id
    }

    fn emit(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    fn resolve(&self, span: ceeify_util::Span) -> TacResult<(ceeify_sem::SymbolId, DataType)> {
        let id = self.analysis.resolution_of(span).ok_or(TacError::UnresolvedSymbol { span })?;
        Ok((id, self.analysis.type_of(span)))
    }

    fn lower_block(&mut self, block: &ast::Block) -> TacResult<()> {
        for stmt in block {
            self.lower_stmt(stmt)?;
        }
        Ok(())
    }

    fn lower_stmt(&mut self, stmt: &Stmt) -> TacResult<()> {
        match stmt {
            Stmt::Assignment(a) => self.lower_assignment(a),
            Stmt::If(s) => self.lower_if(s),
            Stmt::While(s) => self.lower_while(s),
            // For-loop iteration has no defined runtime value representation
            // (spec §1 Non-goal: "no runtime value representation"); the
            // body is lowered once between bracketing labels for structural
            // fidelity rather than modeling real iteration. See DESIGN.md.
            Stmt::For(s) => {
                let start = self.fresh_label();
                let end = self.fresh_label();
                self.emit(Instruction::new(Op::Label).label(start));
                self.lower_block(&s.body)?;
                self.emit(Instruction::new(Op::Label).label(end));
                self.lower_block(&s.orelse)
            }
            Stmt::Match(m) => self.lower_match(m),
            Stmt::FunctionDef(f) => self.lower_function(f, None),
            Stmt::ClassDef(c) => self.lower_class(c),
            Stmt::Import(_) => Ok(()),
            Stmt::Return(r) => {
                let value = match &r.value {
                    Some(e) => self.lower_expr(e)?,
                    None => TACValue::None,
                };
                self.emit(Instruction::new(Op::Return).result(value));
                Ok(())
            }
            Stmt::Expr(e, _) => self.lower_expr(e).map(|_| ()),
        }
    }

    fn lower_assignment(&mut self, a: &ast::Assignment) -> TacResult<()> {
        let value = self.lower_expr(&a.value)?;
        for target in &a.targets {
            let span = target.span();
            let (symbol, dtype) = self.resolve(span)?;
            self.emit(Instruction::new(Op::Store).lhs(value).result(TACValue::Var(symbol, dtype)));
        }
        Ok(())
    }

    /// `if test: body` / `if test: body else: orelse` (spec §4.4, exactly).
    fn lower_if(&mut self, s: &ast::If) -> TacResult<()> {
        let test = self.lower_expr(&s.test)?;
        if s.orelse.is_empty() {
            let end = self.fresh_label();
            self.emit(Instruction::new(Op::Jz).lhs(test).label(end));
            self.lower_block(&s.body)?;
            self.emit(Instruction::new(Op::Label).label(end));
        } else {
            let else_label = self.fresh_label();
            let end = self.fresh_label();
            self.emit(Instruction::new(Op::Jz).lhs(test).label(else_label));
            self.lower_block(&s.body)?;
            self.emit(Instruction::new(Op::Jmp).label(end));
            self.emit(Instruction::new(Op::Label).label(else_label));
            self.lower_block(&s.orelse)?;
            self.emit(Instruction::new(Op::Label).label(end));
        }
        Ok(())
    }

    fn lower_while(&mut self, s: &ast::While) -> TacResult<()> {
        let start = self.fresh_label();
        let end = self.fresh_label();
        self.emit(Instruction::new(Op::Label).label(start));
        let test = self.lower_expr(&s.test)?;
        self.emit(Instruction::new(Op::Jz).lhs(test).label(end));
        self.lower_block(&s.body)?;
        self.emit(Instruction::new(Op::Jmp).label(start));
        self.emit(Instruction::new(Op::Label).label(end));
        self.lower_block(&s.orelse)
    }

    /// Not detailed by spec §4.4's control-flow rules (only `if`/`if-else`,
    /// `FunctionDef`, and unary minus are named); lowered here by analogy to
    /// `if`/`elif` — a `CMP` per case guarding a skip-to-next-case jump,
    /// terminated by a shared end label. See DESIGN.md.
    fn lower_match(&mut self, m: &ast::Match) -> TacResult<()> {
        let scrutinee = self.lower_expr(&m.scrutinee)?;
        let end = self.fresh_label();
        let mut next_case: Option<LabelId> = None;
        for case in &m.cases {
            if let Some(label) = next_case.take() {
                self.emit(Instruction::new(Op::Label).label(label));
            }
            let after = self.fresh_label();
            match &case.pattern {
                Pattern::Literal(lit) => {
                    let pat_val = self.lower_literal(lit);
                    let reg = self.fresh_reg();
                    self.emit(
                        Instruction::new(Op::Cmp)
                            .lhs(scrutinee)
                            .rhs(pat_val)
                            .result(TACValue::Reg(reg, DataType::Bool))
                            .cmp(ast::CompareOp::Eq),
                    );
                    self.emit(Instruction::new(Op::Jz).lhs(TACValue::Reg(reg, DataType::Bool)).label(after));
                }
                Pattern::Capture(name, span) => {
                    if let Some((symbol, dtype)) = self.analysis.resolution_of(*span).map(|id| (id, self.analysis.type_of(*span))) {
                        self.emit(Instruction::new(Op::Store).lhs(scrutinee).result(TACValue::Var(symbol, dtype)));
                    }
                    let _ = name;
                }
                Pattern::Wildcard(_) => {}
            }
            if let Some(guard) = &case.guard {
                let cond = self.lower_expr(guard)?;
                self.emit(Instruction::new(Op::Jz).lhs(cond).label(after));
            }
            self.lower_block(&case.body)?;
            self.emit(Instruction::new(Op::Jmp).label(end));
            next_case = Some(after);
        }
        if let Some(label) = next_case {
            self.emit(Instruction::new(Op::Label).label(label));
        }
        self.emit(Instruction::new(Op::Label).label(end));
        Ok(())
    }

    /// `FunctionDef` (spec §4.4): `LABEL name`, `ARG index -> var_id` per
    /// parameter, the body, then an implicit trailing `RETURN` regardless of
    /// whether the body already returned explicitly.
    fn lower_function(&mut self, f: &ast::FunctionDef, prefix: Option<Name>) -> TacResult<()> {
        let mangled = match prefix {
            Some(p) => format!("{}_{}", p.as_str(), f.name.as_str()),
            None => f.name.as_str().to_string(),
        };
        let entry = self.fresh_label();
        self.label_names.insert(entry, mangled);
        self.emit(Instruction::new(Op::Label).label(entry));
        for (i, param) in f.params.iter().enumerate() {
            let (symbol, dtype) = self.resolve(param.span)?;
            self.emit(
                Instruction::new(Op::Arg).lhs(TACValue::Imm(i as i64)).result(TACValue::Var(symbol, dtype)),
            );
        }
        self.lower_block(&f.body)?;
        self.emit(Instruction::new(Op::Return).result(TACValue::None));
        Ok(())
    }

    /// Classes carry no TAC of their own (spec §4.4 never mentions
    /// `ClassDef`; layout and struct emission are the emitter's job per
    /// §4.5). Methods still need lowering, mangled `<Class>_<method>` to
    /// match the emitter's own method-name mangling so a TAC dump and a `.c`
    /// dump name the same function identically.
    fn lower_class(&mut self, c: &ast::ClassDef) -> TacResult<()> {
        for stmt in &c.body {
            if let Stmt::FunctionDef(f) = stmt {
                self.lower_function(f, Some(c.name))?;
            }
        }
        Ok(())
    }

    fn lower_literal(&mut self, lit: &ast::Literal) -> TACValue {
        let (dtype, text) = match &lit.value {
            ast::LiteralValue::Int(s) => (DataType::Int, s.replace('_', "")),
            ast::LiteralValue::Float(s) => (DataType::Float, s.replace('_', "")),
            ast::LiteralValue::Str(s) => (DataType::Str, s.clone()),
            ast::LiteralValue::Bool(b) => (DataType::Bool, b.to_string()),
            ast::LiteralValue::None => (DataType::None, "None".to_string()),
        };
        let const_id = self.consts.intern(dtype, text);
        let reg = self.fresh_reg();
        self.emit(Instruction::new(Op::Const).lhs(TACValue::Const(const_id, dtype)).result(TACValue::Reg(reg, dtype)));
        TACValue::Reg(reg, dtype)
    }

    fn lower_expr(&mut self, expr: &Expr) -> TacResult<TACValue> {
        match expr {
            Expr::Literal(lit) => Ok(self.lower_literal(lit)),
            Expr::Variable(v) => {
                let (symbol, dtype) = self.resolve(v.span)?;
                let reg = self.fresh_reg();
                self.emit(Instruction::new(Op::Load).lhs(TACValue::Var(symbol, dtype)).result(TACValue::Reg(reg, dtype)));
                Ok(TACValue::Reg(reg, dtype))
            }
            Expr::UnaryOp(u) => self.lower_unary(u),
            Expr::BinaryOp(b) => self.lower_binary(b),
            Expr::Compare(c) => self.lower_compare(c),
            Expr::Attribute(attr) => {
                let (symbol, dtype) = self.resolve(attr.span)?;
                let reg = self.fresh_reg();
                self.emit(Instruction::new(Op::Load).lhs(TACValue::Var(symbol, dtype)).result(TACValue::Reg(reg, dtype)));
                Ok(TACValue::Reg(reg, dtype))
            }
            Expr::Call(call) => self.lower_call(call),
            Expr::List(list) => {
                // No runtime value representation (spec §1 Non-goal): a
                // list literal lowers to its elements' side effects only.
                for item in &list.items {
                    self.lower_expr(item)?;
                }
                Ok(TACValue::None)
            }
        }
    }

    /// Unary minus lowers exactly as spec §4.4 states: `CONST 0; SUB 0, x ->
    /// r`. Unary plus is the identity. `not` has no dedicated opcode, so it
    /// goes through the same intrinsic-call convention as the other
    /// opcode-less operators (see `lower_binary`).
    fn lower_unary(&mut self, u: &ast::UnaryOp) -> TacResult<TACValue> {
        match u.op {
            UnOp::Pos => self.lower_expr(&u.operand),
            UnOp::Neg => {
                let dtype = self.analysis.type_of(u.span);
                let zero_id = self.consts.intern(dtype, "0");
                let zero_reg = self.fresh_reg();
                self.emit(Instruction::new(Op::Const).lhs(TACValue::Const(zero_id, dtype)).result(TACValue::Reg(zero_reg, dtype)));
                let operand = self.lower_expr(&u.operand)?;
                let reg = self.fresh_reg();
                self.emit(
                    Instruction::new(Op::Sub)
                        .lhs(TACValue::Reg(zero_reg, dtype))
                        .rhs(operand)
                        .result(TACValue::Reg(reg, dtype)),
                );
                Ok(TACValue::Reg(reg, dtype))
            }
            UnOp::Not => {
                let operand = self.lower_expr(&u.operand)?;
                self.lower_intrinsic_call("__not", &[operand], DataType::Bool)
            }
        }
    }

    /// `ADD`/`SUB`/`MUL`/`DIV` are the only arithmetic opcodes spec §4.4
    /// names. `//`, `%`, `**`, `and`, `or` have no dedicated opcode, so they
    /// lower to a `CALL` of a compiler-synthesized intrinsic name, reusing
    /// the same `ARG`+`CALL` convention user-level calls use — see
    /// DESIGN.md for why this was chosen over inventing new opcodes.
    fn lower_binary(&mut self, b: &ast::BinaryOp) -> TacResult<TACValue> {
        let dtype = self.analysis.type_of(b.span);
        let lhs = self.lower_expr(&b.left)?;
        let rhs = self.lower_expr(&b.right)?;
        let op = match b.op {
            BinOp::Add => Some(Op::Add),
            BinOp::Sub => Some(Op::Sub),
            BinOp::Mul => Some(Op::Mul),
            BinOp::Div | BinOp::FloorDiv => Some(Op::Div),
            _ => None,
        };
        if let Some(op) = op {
            let reg = self.fresh_reg();
            self.emit(Instruction::new(op).lhs(lhs).rhs(rhs).result(TACValue::Reg(reg, dtype)));
            return Ok(TACValue::Reg(reg, dtype));
        }
        let name = match b.op {
            BinOp::Mod => "__mod",
            BinOp::Pow => "__pow",
            BinOp::And => "__and",
            BinOp::Or => "__or",
            _ => unreachable!("arithmetic ops handled above"),
        };
        self.lower_intrinsic_call(name, &[lhs, rhs], dtype)
    }

    /// Chained comparisons (`1 <= a < 10`) lower to one `CMP` per adjacent
    /// pair, folded together with `__and` intrinsic calls the same way
    /// `ceeify-emit` folds them into `&&`-joined text (spec §4.5).
    fn lower_compare(&mut self, c: &ast::Compare) -> TacResult<TACValue> {
        let mut prev = self.lower_expr(&c.left)?;
        let mut acc: Option<TACValue> = None;
        for (op, comparator) in c.ops.iter().zip(c.comparators.iter()) {
            let next = self.lower_expr(comparator)?;
            let reg = self.fresh_reg();
            self.emit(
                Instruction::new(Op::Cmp)
                    .lhs(prev)
                    .rhs(next)
                    .result(TACValue::Reg(reg, DataType::Bool))
                    .cmp(*op),
            );
            let this_cmp = TACValue::Reg(reg, DataType::Bool);
            acc = Some(match acc {
                Some(prev_acc) => self.lower_intrinsic_call("__and", &[prev_acc, this_cmp], DataType::Bool)?,
                None => this_cmp,
            });
            prev = next;
        }
        Ok(acc.expect("Compare always has at least one comparator"))
    }

    fn lower_call(&mut self, call: &ast::Call) -> TacResult<TACValue> {
        let callee_dtype = self.analysis.type_of(call.span);
        let (callee_symbol, _) = self.resolve(call.callee.span())?;
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.lower_expr(arg)?);
        }
        for (i, arg) in args.iter().enumerate() {
            self.emit(Instruction::new(Op::Arg).lhs(TACValue::Imm(i as i64)).result(*arg));
        }
        let reg = self.fresh_reg();
        self.emit(
            Instruction::new(Op::Call)
                .lhs(TACValue::Var(callee_symbol, callee_dtype))
                .result(TACValue::Reg(reg, callee_dtype)),
        );
        Ok(TACValue::Reg(reg, callee_dtype))
    }

    fn lower_intrinsic_call(&mut self, name: &'static str, args: &[TACValue], dtype: DataType) -> TacResult<TACValue> {
        for (i, arg) in args.iter().enumerate() {
            self.emit(Instruction::new(Op::Arg).lhs(TACValue::Imm(i as i64)).result(*arg));
        }
        let reg = self.fresh_reg();
        self.emit(Instruction::new(Op::Call).lhs(TACValue::Intrinsic(name)).result(TACValue::Reg(reg, dtype)));
        Ok(TACValue::Reg(reg, dtype))
    }
}
