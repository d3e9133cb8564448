//! JSON dumps for `--dump-tokens`/`--dump-ast`/`--dump-tac` (spec §6's "File
//! formats": "Chrome-trace-compatible structure with fields `{type, depth,
//! token, …}` for nodes and `{name, ph, ts, dur, args}` for trace events").
//!
//! These walk the pipeline's own types directly rather than `#[derive]`ing
//! `Serialize` onto the AST/token types themselves — the dump shape here is
//! a diagnostic projection, not the canonical representation those crates
//! expose to the rest of the pipeline.

use ceeify_lex::Token;
use ceeify_par::ast::{self, Expr, Pattern, Stmt};
use serde_json::{json, Value};

pub fn tokens_to_json(tokens: &[Token<'_>]) -> Value {
    let entries: Vec<Value> = tokens
        .iter()
        .map(|t| {
            json!({
                "type": "token",
                "kind": format!("{:?}", t.kind),
                "token": t.lexeme,
                "line": t.line,
                "col": t.col,
                "indent": t.indent,
            })
        })
        .collect();
    Value::Array(entries)
}

pub fn ast_to_json(block: &ast::Block) -> Value {
    Value::Array(block.iter().map(|s| stmt_to_json(s, 0)).collect())
}

fn stmt_to_json(stmt: &Stmt, depth: u32) -> Value {
    match stmt {
        Stmt::Assignment(a) => json!({
            "type": "Assignment",
            "depth": depth,
            "targets": a.targets.iter().map(|t| expr_to_json(t, depth + 1)).collect::<Vec<_>>(),
            "value": expr_to_json(&a.value, depth + 1),
        }),
        Stmt::If(i) => json!({
            "type": "If",
            "depth": depth,
            "test": expr_to_json(&i.test, depth + 1),
            "body": i.body.iter().map(|s| stmt_to_json(s, depth + 1)).collect::<Vec<_>>(),
            "orelse": i.orelse.iter().map(|s| stmt_to_json(s, depth + 1)).collect::<Vec<_>>(),
        }),
        Stmt::While(w) => json!({
            "type": "While",
            "depth": depth,
            "test": expr_to_json(&w.test, depth + 1),
            "body": w.body.iter().map(|s| stmt_to_json(s, depth + 1)).collect::<Vec<_>>(),
            "orelse": w.orelse.iter().map(|s| stmt_to_json(s, depth + 1)).collect::<Vec<_>>(),
        }),
        Stmt::For(f) => json!({
            "type": "For",
            "depth": depth,
            "token": f.target.name.as_str(),
            "iter": expr_to_json(&f.iter, depth + 1),
            "body": f.body.iter().map(|s| stmt_to_json(s, depth + 1)).collect::<Vec<_>>(),
            "orelse": f.orelse.iter().map(|s| stmt_to_json(s, depth + 1)).collect::<Vec<_>>(),
        }),
        Stmt::Match(m) => json!({
            "type": "Match",
            "depth": depth,
            "scrutinee": expr_to_json(&m.scrutinee, depth + 1),
            "cases": m.cases.iter().map(|c| json!({
                "type": "MatchCase",
                "depth": depth + 1,
                "pattern": pattern_to_json(&c.pattern),
                "guard": c.guard.as_ref().map(|g| expr_to_json(g, depth + 2)),
                "body": c.body.iter().map(|s| stmt_to_json(s, depth + 2)).collect::<Vec<_>>(),
            })).collect::<Vec<_>>(),
        }),
        Stmt::FunctionDef(f) => json!({
            "type": "FunctionDef",
            "depth": depth,
            "token": f.name.as_str(),
            "params": f.params.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
            "body": f.body.iter().map(|s| stmt_to_json(s, depth + 1)).collect::<Vec<_>>(),
        }),
        Stmt::ClassDef(c) => json!({
            "type": "ClassDef",
            "depth": depth,
            "token": c.name.as_str(),
            "bases": c.bases.iter().map(|b| b.as_str()).collect::<Vec<_>>(),
            "body": c.body.iter().map(|s| stmt_to_json(s, depth + 1)).collect::<Vec<_>>(),
        }),
        Stmt::Import(i) => json!({
            "type": "Import",
            "depth": depth,
            "names": i.names.iter().map(|n| n.name.as_str()).collect::<Vec<_>>(),
        }),
        Stmt::Return(r) => json!({
            "type": "Return",
            "depth": depth,
            "value": r.value.as_ref().map(|v| expr_to_json(v, depth + 1)),
        }),
        Stmt::Expr(e, _) => json!({
            "type": "Expr",
            "depth": depth,
            "value": expr_to_json(e, depth + 1),
        }),
    }
}

fn pattern_to_json(pattern: &Pattern) -> Value {
    match pattern {
        Pattern::Literal(l) => json!({ "type": "Literal", "token": literal_text(l) }),
        Pattern::Wildcard(_) => json!({ "type": "Wildcard", "token": "_" }),
        Pattern::Capture(name, _) => json!({ "type": "Capture", "token": name.as_str() }),
    }
}

fn literal_text(l: &ast::Literal) -> String {
    match &l.value {
        ast::LiteralValue::Int(s) | ast::LiteralValue::Float(s) => s.clone(),
        ast::LiteralValue::Str(s) => s.clone(),
        ast::LiteralValue::Bool(b) => b.to_string(),
        ast::LiteralValue::None => "None".to_string(),
    }
}

fn expr_to_json(expr: &Expr, depth: u32) -> Value {
    match expr {
        Expr::Literal(l) => json!({ "type": "Literal", "depth": depth, "token": literal_text(l) }),
        Expr::Variable(v) => json!({ "type": "Variable", "depth": depth, "token": v.name.as_str() }),
        Expr::BinaryOp(b) => json!({
            "type": "BinaryOp",
            "depth": depth,
            "token": format!("{:?}", b.op),
            "left": expr_to_json(&b.left, depth + 1),
            "right": expr_to_json(&b.right, depth + 1),
        }),
        Expr::UnaryOp(u) => json!({
            "type": "UnaryOp",
            "depth": depth,
            "token": format!("{:?}", u.op),
            "operand": expr_to_json(&u.operand, depth + 1),
        }),
        Expr::Compare(c) => json!({
            "type": "Compare",
            "depth": depth,
            "left": expr_to_json(&c.left, depth + 1),
            "ops": c.ops.iter().map(|op| format!("{op:?}")).collect::<Vec<_>>(),
            "comparators": c.comparators.iter().map(|e| expr_to_json(e, depth + 1)).collect::<Vec<_>>(),
        }),
        Expr::Attribute(a) => json!({
            "type": "Attribute",
            "depth": depth,
            "token": a.attr.as_str(),
            "object": expr_to_json(&a.object, depth + 1),
        }),
        Expr::Call(c) => json!({
            "type": "Call",
            "depth": depth,
            "callee": expr_to_json(&c.callee, depth + 1),
            "args": c.args.iter().map(|e| expr_to_json(e, depth + 1)).collect::<Vec<_>>(),
        }),
        Expr::List(l) => json!({
            "type": "List",
            "depth": depth,
            "items": l.items.iter().map(|e| expr_to_json(e, depth + 1)).collect::<Vec<_>>(),
        }),
    }
}

pub fn tac_to_json(program: &ceeify_tac::Program) -> Value {
    let events: Vec<Value> = program
        .instructions
        .iter()
        .enumerate()
        .map(|(i, instr)| {
            json!({
                "name": format!("{:?}", instr.op),
                "ph": "X",
                "ts": i,
                "dur": 1,
                "args": {
                    "lhs": format!("{:?}", instr.lhs),
                    "rhs": format!("{:?}", instr.rhs),
                    "result": format!("{:?}", instr.result),
                    "label": instr.label.map(|l| l.to_string()),
                    "cmp": instr.cmp.map(|c| format!("{c:?}")),
                },
            })
        })
        .collect();
    Value::Array(events)
}
