//! The source emitter (spec §4.5): walks the AST and `Analysis` side table
//! independently of `ceeify-tac` (spec §2: "the IR builder and the source
//! emitter then walk the same annotated tree independently") and writes C
//! text into a `ceeify_util::StringBuilder`.

use std::collections::{HashMap, HashSet};

use ceeify_par::ast::{self, Expr, Pattern, Stmt, VarContext};
use ceeify_sem::{Analysis, SymbolId};
use ceeify_util::{Span, StringBuilder, Symbol};

use crate::error::{EmitError, EmitResult};
use crate::operators::{
    binop_precedence, binop_text, compare_op_text, needs_parens, unop_text, ATOM_PRECEDENCE,
    COMPARE_PRECEDENCE, UNARY_PRECEDENCE,
};
use crate::types::c_type;

pub fn emit(module: &ast::Block, analysis: &Analysis) -> EmitResult<String> {
    let mut emitter = Emitter::new(analysis);
    emitter.emit_block(module, 0)?;
    Ok(emitter.out.into_string())
}

struct Emitter<'a> {
    analysis: &'a Analysis,
    out: StringBuilder,
    /// Symbols already given their `<type> <name> = …;` declaration, so a
    /// later assignment to the same symbol emits a bare `<name> = …;` (spec
    /// §4.5's "first declaration" rule).
    declared: HashSet<SymbolId>,
    match_temp_counter: u32,
    /// Per-match-arm text substitution for a guard's free variables — the
    /// pattern's capture name renders as the scrutinee temporary until the
    /// arm declares its own local (spec §4.5: "scrutinee-to-temporary
    /// substitution performed on free variables").
    name_override: HashMap<Symbol, String>,
}

impl<'a> Emitter<'a> {
    fn new(analysis: &'a Analysis) -> Self {
        Self {
            analysis,
            out: StringBuilder::new(),
            declared: HashSet::new(),
            match_temp_counter: 0,
            name_override: HashMap::new(),
        }
    }

    fn c_type_of(&self, span: Span) -> String {
        c_type(self.analysis.type_of(span), &self.analysis.table)
    }

    fn emit_block(&mut self, block: &ast::Block, indent: usize) -> EmitResult<()> {
        for stmt in block {
            self.emit_stmt(stmt, indent)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt, indent: usize) -> EmitResult<()> {
        match stmt {
            Stmt::Assignment(a) => self.emit_assignment(a, indent),
            Stmt::If(s) => self.emit_if(s, indent),
            Stmt::While(s) => self.emit_while(s, indent),
            Stmt::For(s) => self.emit_for(s, indent),
            Stmt::Match(m) => self.emit_match(m, indent),
            Stmt::FunctionDef(f) => self.emit_function(f, None, indent),
            Stmt::ClassDef(c) => self.emit_class(c, indent),
            Stmt::Import(_) => Ok(()),
            Stmt::Return(r) => {
                let text = match &r.value {
                    Some(v) => format!("return {};", self.emit_expr(v)?),
                    None => "return;".to_string(),
                };
                self.out.append_indent(indent).append_line(&text);
                Ok(())
            }
            Stmt::Expr(e, _) => {
                // A bare `Variable` in `Store` context is a field-declaration
                // marker inserted by the analyzer (synthetic `self.x = …`
                // fields); `emit_class` consumes those directly and they have
                // no standalone statement form here.
                if matches!(e, Expr::Variable(v) if v.context == VarContext::Store) {
                    return Ok(());
                }
                let text = self.emit_expr(e)?;
                self.out.append_indent(indent).append_line(&format!("{};", text));
                Ok(())
            }
        }
    }

    fn emit_assignment(&mut self, a: &ast::Assignment, indent: usize) -> EmitResult<()> {
        let value_text = self.emit_expr(&a.value)?;
        for target in &a.targets {
            match target {
                Expr::Variable(v) => {
                    let symbol = self.analysis.resolution_of(v.span).ok_or_else(|| EmitError::Internal {
                        detail: format!("assignment target '{}' has no resolved symbol", v.name.as_str()),
                        span: v.span,
                    })?;
                    let first_decl = self.declared.insert(symbol);
                    let line = if first_decl {
                        format!("{} {} = {};", self.c_type_of(v.span), v.name.as_str(), value_text)
                    } else {
                        format!("{} = {};", v.name.as_str(), value_text)
                    };
                    self.out.append_indent(indent).append_line(&line);
                }
                Expr::Attribute(attr) => {
                    let target_text = self.emit_attribute(attr)?;
                    self.out.append_indent(indent).append_line(&format!("{} = {};", target_text, value_text));
                }
                other => {
                    return Err(EmitError::Internal {
                        detail: format!("unsupported assignment target {other:?}"),
                        span: a.span,
                    })
                }
            }
        }
        Ok(())
    }

    fn emit_if(&mut self, s: &ast::If, indent: usize) -> EmitResult<()> {
        let test = self.emit_expr(&s.test)?;
        self.out.append_indent(indent).append_line(&format!("if ({}) {{", test));
        self.emit_block(&s.body, indent + 1)?;
        self.out.append_indent(indent).append_line("}");
        self.emit_orelse(&s.orelse, indent)
    }

    /// `elif` chains are nested Ifs whose parent's `orelse` holds exactly one
    /// of them (spec §4.2); detect that shape and fold it into `else if`
    /// instead of an extra nested braces level.
    fn emit_orelse(&mut self, orelse: &ast::Block, indent: usize) -> EmitResult<()> {
        if orelse.is_empty() {
            return Ok(());
        }
        if orelse.len() == 1 {
            if let Some(Stmt::If(nested)) = orelse.front() {
                let test = self.emit_expr(&nested.test)?;
                self.out.append_indent(indent).append_line(&format!("else if ({}) {{", test));
                self.emit_block(&nested.body, indent + 1)?;
                self.out.append_indent(indent).append_line("}");
                return self.emit_orelse(&nested.orelse, indent);
            }
        }
        self.out.append_indent(indent).append_line("else {");
        self.emit_block(orelse, indent + 1)?;
        self.out.append_indent(indent).append_line("}");
        Ok(())
    }

    fn emit_while(&mut self, s: &ast::While, indent: usize) -> EmitResult<()> {
        let test = self.emit_expr(&s.test)?;
        self.out.append_indent(indent).append_line(&format!("while ({}) {{", test));
        self.emit_block(&s.body, indent + 1)?;
        self.out.append_indent(indent).append_line("}");
        // This grammar has no `break`, so a `while/else` body always runs
        // once the loop condition goes false; emit it unconditionally after.
        self.emit_block(&s.orelse, indent)
    }

    /// No runtime value representation exists (spec §1 Non-goal), so there
    /// is no well-defined C iteration to lower `for` into; the body is
    /// emitted once, unguarded, matching `ceeify-tac`'s identical limitation
    /// for the same reason.
    fn emit_for(&mut self, s: &ast::For, indent: usize) -> EmitResult<()> {
        self.out.append_indent(indent).append_line(&format!(
            "/* for {} in <iterable>: no runtime iteration */",
            s.target.name.as_str()
        ));
        self.out.append_indent(indent).append_line("{");
        self.emit_block(&s.body, indent + 1)?;
        self.out.append_indent(indent).append_line("}");
        self.emit_block(&s.orelse, indent)
    }

    fn emit_match(&mut self, m: &ast::Match, indent: usize) -> EmitResult<()> {
        let scrutinee_text = self.emit_expr(&m.scrutinee)?;
        let tmp = format!("_tmp{}", self.match_temp_counter);
        self.match_temp_counter += 1;
        let scrutinee_c_type = self.c_type_of(m.scrutinee.span());
        self.out.append_indent(indent).append_line(&format!(
            "{} {} = {};",
            scrutinee_c_type,
            tmp,
            scrutinee_text
        ));

        let mut first_branch = true;
        for case in &m.cases {
            match &case.pattern {
                Pattern::Wildcard(_) => {
                    self.out.append_indent(indent).append_line("else {");
                    self.emit_block(&case.body, indent + 1)?;
                    self.out.append_indent(indent).append_line("}");
                }
                Pattern::Literal(lit) => {
                    let lit_text = self.emit_literal(lit);
                    let test = self.guarded_test(&case.guard, &format!("{} == {}", tmp, lit_text))?;
                    let keyword = if first_branch { "if" } else { "else if" };
                    self.out.append_indent(indent).append_line(&format!("{} ({}) {{", keyword, test));
                    self.emit_block(&case.body, indent + 1)?;
                    self.out.append_indent(indent).append_line("}");
                    first_branch = false;
                }
                Pattern::Capture(name, _) => {
                    self.name_override.insert(*name, tmp.clone());
                    let test = self.guarded_test(&case.guard, "1")?;
                    self.name_override.remove(name);
                    let keyword = if first_branch { "if" } else { "else if" };
                    self.out.append_indent(indent).append_line(&format!("{} ({}) {{", keyword, test));
                    let pattern_c_type = self.c_type_of(case.pattern.span());
                    self.out.append_indent(indent + 1).append_line(&format!(
                        "{} {} = {};",
                        pattern_c_type,
                        name.as_str(),
                        tmp
                    ));
                    self.emit_block(&case.body, indent + 1)?;
                    self.out.append_indent(indent).append_line("}");
                    first_branch = false;
                }
            }
        }
        Ok(())
    }

    /// Combines a pattern's own test with an optional guard (free variables
    /// in the guard already render against `self.name_override`).
    fn guarded_test(&mut self, guard: &Option<Expr>, own_test: &str) -> EmitResult<String> {
        match guard {
            Some(g) => {
                let guard_text = self.emit_expr(g)?;
                if own_test == "1" {
                    Ok(guard_text)
                } else {
                    Ok(format!("{} && {}", own_test, guard_text))
                }
            }
            None => Ok(own_test.to_string()),
        }
    }

    fn emit_function(&mut self, f: &ast::FunctionDef, prefix: Option<&str>, indent: usize) -> EmitResult<()> {
        let name = match prefix {
            Some(p) => format!("{}_{}", p, f.name.as_str()),
            None => f.name.as_str().to_string(),
        };
        let ret_ty = self.c_type_of(f.span);
        let mut params = Vec::with_capacity(f.params.len());
        for (i, param) in f.params.iter().enumerate() {
            if i == 0 && prefix.is_some() {
                params.push(format!("{}* {}", prefix.unwrap(), param.name.as_str()));
            } else {
                params.push(format!("{} {}", self.c_type_of(param.span), param.name.as_str()));
            }
        }
        self.out
            .append_indent(indent)
            .append_line(&format!("{} {}({}) {{", ret_ty, name, params.join(", ")));
        self.emit_block(&f.body, indent + 1)?;
        self.out.append_indent(indent).append_line("}");
        Ok(())
    }

    /// A struct with one embedded `base*` pointer plus non-method members,
    /// followed by its methods pulled out as mangled free functions (spec
    /// §4.5).
    fn emit_class(&mut self, c: &ast::ClassDef, indent: usize) -> EmitResult<()> {
        let class_name = c.name.as_str();
        self.out.append_indent(indent).append_line("typedef struct {");
        if let Some(&base_name) = c.bases.first() {
            self.out.append_indent(indent + 1).append_line(&format!("{}* base;", base_name.as_str()));
        }
        for stmt in &c.body {
            if let Some((field_ty, field_name)) = self.own_field(stmt) {
                self.out.append_indent(indent + 1).append_line(&format!("{} {};", field_ty, field_name));
            }
        }
        self.out.append_indent(indent).append_line(&format!("}} {};", class_name));
        self.out.append_line("");

        for stmt in &c.body {
            if let Stmt::FunctionDef(f) = stmt {
                self.emit_function(f, Some(class_name), indent)?;
                self.out.append_line("");
            }
        }
        Ok(())
    }

    /// Recognizes a class-body statement that declares a data member: either
    /// a synthetic bare `Variable` marker (from `self.x = …` in `__init__`)
    /// or a plain class-level assignment to a name (a class variable). Both
    /// forms just contribute `<type> <name>;` to the struct; an initializer
    /// on the latter has no direct struct-literal C equivalent and is
    /// dropped (see `DESIGN.md`).
    fn own_field<'s>(&self, stmt: &'s Stmt) -> Option<(String, &'s str)> {
        match stmt {
            Stmt::Expr(Expr::Variable(v), _) if v.context == VarContext::Store => {
                Some((self.c_type_of(v.span), v.name.as_str()))
            }
            Stmt::Assignment(a) if a.targets.len() == 1 => match &a.targets[0] {
                Expr::Variable(v) => Some((self.c_type_of(v.span), v.name.as_str())),
                _ => None,
            },
            _ => None,
        }
    }

    fn emit_literal(&self, lit: &ast::Literal) -> String {
        match &lit.value {
            ast::LiteralValue::Int(text) => text.replace('_', ""),
            ast::LiteralValue::Float(text) => text.replace('_', ""),
            ast::LiteralValue::Str(text) => format!("\"{}\"", text),
            ast::LiteralValue::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            ast::LiteralValue::None => "NULL".to_string(),
        }
    }

    /// Walks `class_id`'s base chain looking for a locally-owned binding
    /// named `name` (spec §4.5's `resolve_attribute_owner`); returns the
    /// owning class plus the `base->base->…` hop chain needed to reach it
    /// from an instance of `class_id` (empty if owned directly).
    fn resolve_attribute_owner(&self, mut class_id: SymbolId, name: Symbol) -> (SymbolId, String) {
        let mut chain = String::new();
        loop {
            let owns = self
                .analysis
                .table
                .symbol(class_id)
                .scope
                .map(|scope| self.analysis.table.lookup_local(scope, name).is_some())
                .unwrap_or(false);
            if owns {
                return (class_id, chain);
            }
            match self.analysis.table.symbol(class_id).base_class {
                Some(base) => {
                    chain = if chain.is_empty() { "base".to_string() } else { format!("{}->base", chain) };
                    class_id = base;
                }
                None => return (class_id, chain),
            }
        }
    }

    /// Dotted access lowers to `->`, walking the base chain (`->base->…`)
    /// until the field's owning class is found (spec §4.5).
    fn emit_attribute(&mut self, attr: &ast::Attribute) -> EmitResult<String> {
        let object_text = self.emit_expr(&attr.object)?;
        let object_ty = self.analysis.type_of(attr.object.span());
        let Some(class_id) = object_ty.class_id() else {
            return Err(EmitError::Internal {
                detail: format!("attribute access on non-object type {object_ty:?}"),
                span: attr.span,
            });
        };
        let (_, chain) = self.resolve_attribute_owner(class_id, attr.attr);
        if chain.is_empty() {
            Ok(format!("{}->{}", object_text, attr.attr.as_str()))
        } else {
            Ok(format!("{}->{}->{}", object_text, chain, attr.attr.as_str()))
        }
    }

    fn emit_expr(&mut self, expr: &Expr) -> EmitResult<String> {
        match expr {
            Expr::Literal(l) => Ok(self.emit_literal(l)),
            Expr::Variable(v) => Ok(self
                .name_override
                .get(&v.name)
                .cloned()
                .unwrap_or_else(|| v.name.as_str().to_string())),
            Expr::UnaryOp(u) => {
                let operand = self.emit_child(&u.operand, UNARY_PRECEDENCE, false)?;
                Ok(format!("{}{}", unop_text(u.op), operand))
            }
            Expr::BinaryOp(b) => {
                let parent_prec = binop_precedence(b.op);
                let op_text = binop_text(b.op, b.span)?;
                let left = self.emit_child(&b.left, parent_prec, false)?;
                let right = self.emit_child(&b.right, parent_prec, true)?;
                Ok(format!("{} {} {}", left, op_text, right))
            }
            Expr::Compare(c) => self.emit_compare(c),
            Expr::Attribute(a) => self.emit_attribute(a),
            Expr::Call(call) => self.emit_call(call),
            Expr::List(list) => {
                let mut items = Vec::with_capacity(list.items.len());
                for item in &list.items {
                    items.push(self.emit_expr(item)?);
                }
                Ok(format!("{{{}}}", items.join(", ")))
            }
        }
    }

    /// Parenthesizes `child` only if its binding is looser than `parent_prec`
    /// (or tied and on the right, to preserve left-associativity).
    fn emit_child(&mut self, child: &Expr, parent_prec: u8, is_right: bool) -> EmitResult<String> {
        let child_prec = expr_precedence(child);
        let text = self.emit_expr(child)?;
        if needs_parens(child_prec, parent_prec, is_right) {
            Ok(format!("({})", text))
        } else {
            Ok(text)
        }
    }

    /// Chained comparisons render as parenthesized `&&`-joined pairs, each
    /// reusing the shared middle operand textually (spec §4.5).
    fn emit_compare(&mut self, c: &ast::Compare) -> EmitResult<String> {
        let mut operands = Vec::with_capacity(c.comparators.len() + 1);
        operands.push(self.emit_child(&c.left, ATOM_PRECEDENCE, false)?);
        for comparator in &c.comparators {
            operands.push(self.emit_child(comparator, ATOM_PRECEDENCE, false)?);
        }
        let mut parts = Vec::with_capacity(c.ops.len());
        for (i, op) in c.ops.iter().enumerate() {
            parts.push(format!("({} {} {})", operands[i], compare_op_text(*op), operands[i + 1]));
        }
        if parts.len() == 1 {
            Ok(parts.into_iter().next().unwrap())
        } else {
            Ok(parts.join(" && "))
        }
    }

    /// A method call (`obj.method(args)`) has no runtime vtable — it lowers
    /// to a direct call of the mangled free function with the receiver
    /// passed as the first argument.
    fn emit_call(&mut self, call: &ast::Call) -> EmitResult<String> {
        if let Expr::Attribute(attr) = call.callee.as_ref() {
            let object_ty = self.analysis.type_of(attr.object.span());
            if let Some(class_id) = object_ty.class_id() {
                let (owner, chain) = self.resolve_attribute_owner(class_id, attr.attr);
                let class_name = self.analysis.table.symbol(owner).name.as_str();
                let object_text = self.emit_expr(&attr.object)?;
                let receiver =
                    if chain.is_empty() { object_text } else { format!("{}->{}", object_text, chain) };
                let mut args = vec![receiver];
                for arg in &call.args {
                    args.push(self.emit_expr(arg)?);
                }
                return Ok(format!("{}_{}({})", class_name, attr.attr.as_str(), args.join(", ")));
            }
        }
        let callee = self.emit_expr(&call.callee)?;
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            args.push(self.emit_expr(arg)?);
        }
        Ok(format!("{}({})", callee, args.join(", ")))
    }
}

fn expr_precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::BinaryOp(b) => binop_precedence(b.op),
        Expr::Compare(_) => COMPARE_PRECEDENCE,
        Expr::UnaryOp(_) => UNARY_PRECEDENCE,
        Expr::Literal(_) | Expr::Variable(_) | Expr::Attribute(_) | Expr::Call(_) | Expr::List(_) => {
            ATOM_PRECEDENCE
        }
    }
}
