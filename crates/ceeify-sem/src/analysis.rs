//! The recursive depth-first walk (spec §4.3): a single mutable
//! `current_scope` pointer moves as the walk enters/exits `ClassDef` and
//! `FunctionDef`; every other statement shares the enclosing scope.
//!
//! Grounded in the teacher's `faxc-sem` walk shape (one analyzer struct
//! carrying scope-stack state, recursing statement by statement) but built
//! against spec §4.3's actual rules instead of Fax's generic/trait-object
//! type system: `DataType` inference, `base_class` single inheritance,
//! keyword-less `self` recognition, synthetic field insertion, and
//! match-reachability.

use std::collections::HashMap;

use ceeify_par::ast::{self, BinOp, Expr, Pattern, Stmt, UnOp, VarContext};
use ceeify_util::{Span, Symbol as Name};

use crate::error::{SemError, SemResult};
use crate::scope::{ScopeId, SymbolId, SymbolKind, SymbolTable};
use crate::types::DataType;

/// The analyzer's output: the populated symbol table plus span-keyed
/// resolution/type maps. The AST itself (owned by `ceeify-par`) is not
/// extended with annotation fields — `ceeify-tac` and `ceeify-emit` both
/// consult this side table alongside the tree, keyed by each node's `Span`
/// (unique per source position, so stable enough to key on for one
/// compilation unit). See `DESIGN.md` for why this shape was chosen over
/// threading annotation fields through `ceeify-par::ast`.
#[derive(Debug)]
pub struct Analysis {
    pub table: SymbolTable,
    pub module_scope: ScopeId,
    pub types: HashMap<Span, DataType>,
    pub resolutions: HashMap<Span, SymbolId>,
}

impl Analysis {
    pub fn type_of(&self, span: Span) -> DataType {
        self.types.get(&span).copied().unwrap_or(DataType::Unknown)
    }

    pub fn resolution_of(&self, span: Span) -> Option<SymbolId> {
        self.resolutions.get(&span).copied()
    }
}

struct Analyzer {
    table: SymbolTable,
    current_scope: ScopeId,
    scope_depth: u32,
    /// Set while walking statements directly inside a `ClassDef` body (spec
    /// §4.3: "If the enclosing scope is a class, the first parameter
    /// additionally gets `dtype = OBJECT`..."). Cleared on entering any
    /// nested `FunctionDef` so a method's own local closures aren't
    /// mistaken for further methods.
    current_class: Option<SymbolId>,
    current_class_scope: Option<ScopeId>,
    /// Fields discovered via `self.x = ...` inside `__init__`, one frame per
    /// class currently being walked, flushed as synthetic `Variable`
    /// statements into the class body once the whole body has been walked.
    synthetic_fields: Vec<Vec<(Name, Span)>>,
    /// Per-function-in-progress "last return expression type seen" (spec
    /// §4.3: "inferred return type is the type of the last `return`
    /// subexpression encountered in the body").
    return_types: Vec<Option<DataType>>,
    types: HashMap<Span, DataType>,
    resolutions: HashMap<Span, SymbolId>,
}

pub fn analyze(module: &mut ast::Block) -> SemResult<Analysis> {
    let mut table = SymbolTable::new();
    let module_scope = table.root_scope();
    let mut analyzer = Analyzer {
        table,
        current_scope: module_scope,
        scope_depth: 0,
        current_class: None,
        current_class_scope: None,
        synthetic_fields: Vec::new(),
        return_types: Vec::new(),
        types: HashMap::new(),
        resolutions: HashMap::new(),
    };
    analyzer.analyze_block(module)?;
    Ok(Analysis {
        table: analyzer.table,
        module_scope,
        types: analyzer.types,
        resolutions: analyzer.resolutions,
    })
}

impl Analyzer {
    fn analyze_block(&mut self, block: &mut ast::Block) -> SemResult<()> {
        for stmt in block.iter_mut() {
            self.analyze_stmt(stmt)?;
        }
        Ok(())
    }

    fn analyze_stmt(&mut self, stmt: &mut Stmt) -> SemResult<()> {
        match stmt {
            Stmt::Assignment(a) => self.analyze_assignment(a),
            Stmt::If(s) => {
                self.analyze_expr(&s.test)?;
                self.analyze_block(&mut s.body)?;
                self.analyze_block(&mut s.orelse)
            }
            Stmt::While(s) => {
                self.analyze_expr(&s.test)?;
                self.analyze_block(&mut s.body)?;
                self.analyze_block(&mut s.orelse)
            }
            Stmt::For(s) => {
                let iter_ty = self.analyze_expr(&s.iter)?;
                self.declare_var(s.target.name, iter_ty, s.target.span, s.target.annotation.as_ref())?;
                self.record(s.target.span, self.table.lookup(self.current_scope, s.target.name));
                self.analyze_block(&mut s.body)?;
                self.analyze_block(&mut s.orelse)
            }
            Stmt::Match(m) => self.analyze_match(m),
            Stmt::FunctionDef(f) => self.analyze_function_def(f),
            Stmt::ClassDef(c) => self.analyze_class_def(c),
            Stmt::Import(i) => {
                for name in &i.names {
                    self.table.declare(
                        self.current_scope,
                        name.name,
                        SymbolKind::Module,
                        DataType::Unknown,
                        self.scope_depth,
                        name.span,
                        None,
                    );
                }
                Ok(())
            }
            Stmt::Return(r) => {
                let ty = match &r.value {
                    Some(v) => self.analyze_expr(v)?,
                    None => DataType::None,
                };
                if let Some(slot) = self.return_types.last_mut() {
                    *slot = Some(ty);
                }
                Ok(())
            }
            Stmt::Expr(e, _) => self.analyze_expr(e).map(|_| ()),
        }
    }

    fn analyze_assignment(&mut self, a: &mut ast::Assignment) -> SemResult<()> {
        let value_ty = self.analyze_expr(&a.value)?;
        for target in &a.targets {
            match target {
                Expr::Variable(v) => {
                    self.declare_var(v.name, value_ty, v.span, v.annotation.as_ref())?;
                    self.record(v.span, self.table.lookup(self.current_scope, v.name));
                }
                Expr::Attribute(attr) => self.analyze_attribute_store(attr, value_ty, a.span)?,
                other => {
                    return Err(SemError::Internal {
                        detail: format!("unsupported assignment target {other:?}"),
                        span: a.span,
                    })
                }
            }
        }
        Ok(())
    }

    /// `self.x = value` inside `__init__` creates a field on the enclosing
    /// class (spec §4.3's scope rule); anywhere else it is
    /// `SEM_INVALID_OPERATION`.
    fn analyze_attribute_store(
        &mut self,
        attr: &ast::Attribute,
        value_ty: DataType,
        span: Span,
    ) -> SemResult<()> {
        let Expr::Variable(obj) = attr.object.as_ref() else {
            return Err(SemError::InvalidOperation {
                detail: "attribute assignment target must be `self.<name>`".into(),
                span,
            });
        };
        let obj_id = self.table.lookup(self.current_scope, obj.name);
        let is_self = obj_id
            .map(|id| self.table.symbol(id).base_class.is_some() && self.table.symbol(id).dtype.class_id().is_some())
            .unwrap_or(false);
        let (Some(class_id), Some(class_scope), true) =
            (self.current_class, self.current_class_scope, is_self)
        else {
            return Err(SemError::InvalidOperation {
                detail: "attribute creation is only allowed on `self` inside `__init__`".into(),
                span,
            });
        };
        // `analyze_expr` is never called on the attribute's own object here
        // (this is a STORE, not a LOAD), so its type/resolution must be
        // recorded directly — `ceeify-emit` needs both to walk the base
        // chain when it renders `self->…`/`self->base->…`.
        self.record(obj.span, obj_id);
        self.types.insert(obj.span, self.table.symbol(class_id).dtype);
        // Walk the base chain, not just this class's own scope: `self.x = …`
        // in a subclass's `__init__` must reuse an inherited field instead of
        // shadowing it with a second one on the subclass's own struct.
        if self.table.lookup_member(class_id, attr.attr).is_none() {
            self.table.declare(
                class_scope,
                attr.attr,
                SymbolKind::Var,
                value_ty,
                self.scope_depth,
                attr.span,
                None,
            );
            if let Some(frame) = self.synthetic_fields.last_mut() {
                frame.push((attr.attr, attr.span));
            }
        }
        self.record(attr.span, self.table.lookup_member(class_id, attr.attr));
        self.types.insert(attr.span, value_ty);
        Ok(())
    }

    fn declare_var(
        &mut self,
        name: Name,
        inferred: DataType,
        span: Span,
        annotation: Option<&ast::TypeAnnotation>,
    ) -> SemResult<()> {
        let declared_ty = match annotation {
            Some(ann) => self.datatype_from_annotation(ann)?,
            None => inferred,
        };
        if let Some(existing) = self.table.lookup_local(self.current_scope, name) {
            let existing_ty = self.table.symbol(existing).dtype;
            let Some(widened) = existing_ty.widen(declared_ty) else {
                return Err(SemError::TypeError {
                    detail: format!(
                        "cannot assign {declared_ty:?} to '{}' previously bound to {existing_ty:?}",
                        name.as_str()
                    ),
                    span,
                });
            };
            self.table.symbol_mut(existing).dtype = widened;
            self.types.insert(span, widened);
        } else {
            self.table.declare(
                self.current_scope,
                name,
                SymbolKind::Var,
                declared_ty,
                self.scope_depth,
                span,
                None,
            );
            self.types.insert(span, declared_ty);
        }
        Ok(())
    }

    fn analyze_function_def(&mut self, f: &mut ast::FunctionDef) -> SemResult<()> {
        if self.table.lookup_local(self.current_scope, f.name).is_some() {
            return Err(SemError::Redeclaration { name: f.name.as_str().into(), span: f.span });
        }
        let is_method = self.current_class.is_some();
        let fn_id = self.table.declare(
            self.current_scope,
            f.name,
            SymbolKind::Function,
            DataType::Unknown,
            self.scope_depth,
            f.span,
            None,
        );
        let fn_scope = self.table.push_scope(self.current_scope);
        self.table.symbol_mut(fn_id).scope = Some(fn_scope);

        let saved_scope = self.current_scope;
        let saved_class = self.current_class.take();
        let saved_class_scope = self.current_class_scope.take();
        let saved_depth = self.scope_depth;
        self.current_scope = fn_scope;
        self.scope_depth += 1;

        let mut param_types = Vec::with_capacity(f.params.len());
        for (i, param) in f.params.iter().enumerate() {
            let (dtype, base_class) = if i == 0 && is_method {
                (DataType::Object(saved_class.unwrap()), saved_class)
            } else {
                match &param.annotation {
                    Some(ann) => (self.datatype_from_annotation(ann)?, None),
                    None => (DataType::Unknown, None),
                }
            };
            self.table.declare(
                fn_scope,
                param.name,
                SymbolKind::Var,
                dtype,
                self.scope_depth,
                param.span,
                base_class,
            );
            self.types.insert(param.span, dtype);
            param_types.push(dtype);
        }

        self.return_types.push(None);
        self.analyze_block(&mut f.body)?;
        let inferred_return = self.return_types.pop().flatten().unwrap_or(DataType::None);

        let return_ty = match &f.returns {
            Some(ann) => {
                let declared = self.datatype_from_annotation(ann)?;
                if declared != inferred_return
                    && !(declared == DataType::Float && inferred_return == DataType::Int)
                {
                    return Err(SemError::TypeError {
                        detail: format!(
                            "function '{}' declared to return {declared:?} but returns {inferred_return:?}",
                            f.name.as_str()
                        ),
                        span: f.span,
                    });
                }
                declared
            }
            None => inferred_return,
        };

        self.current_scope = saved_scope;
        self.current_class = saved_class;
        self.current_class_scope = saved_class_scope;
        self.scope_depth = saved_depth;

        self.table.symbol_mut(fn_id).dtype = return_ty;
        self.table.symbol_mut(fn_id).param_types = param_types;
        self.record(f.span, Some(fn_id));
        self.types.insert(f.span, return_ty);
        Ok(())
    }

    fn analyze_class_def(&mut self, c: &mut ast::ClassDef) -> SemResult<()> {
        if c.bases.len() > 1 {
            return Err(SemError::UnsupportedFeature {
                detail: "multiple inheritance is not supported".into(),
                span: c.span,
            });
        }
        if self.table.lookup_local(self.current_scope, c.name).is_some() {
            return Err(SemError::Redeclaration { name: c.name.as_str().into(), span: c.span });
        }
        let base_class = match c.bases.first() {
            Some(&base_name) => {
                let Some(base_id) = self.table.lookup(self.current_scope, base_name) else {
                    return Err(SemError::NameError { name: base_name.as_str().into(), span: c.span });
                };
                if self.table.symbol(base_id).kind != SymbolKind::Class {
                    return Err(SemError::TypeError {
                        detail: format!("'{}' is not a class", base_name.as_str()),
                        span: c.span,
                    });
                }
                Some(base_id)
            }
            None => None,
        };

        let class_id = self.table.declare(
            self.current_scope,
            c.name,
            SymbolKind::Class,
            DataType::Unknown,
            self.scope_depth,
            c.span,
            base_class,
        );
        let class_scope = self.table.push_scope(self.current_scope);
        self.table.symbol_mut(class_id).scope = Some(class_scope);
        self.table.symbol_mut(class_id).dtype = DataType::Object(class_id);

        let saved_scope = self.current_scope;
        let saved_class = self.current_class.replace(class_id);
        let saved_class_scope = self.current_class_scope.replace(class_scope);
        let saved_depth = self.scope_depth;
        self.current_scope = class_scope;
        self.scope_depth += 1;
        self.synthetic_fields.push(Vec::new());

        self.analyze_block(&mut c.body)?;

        let pending = self.synthetic_fields.pop().unwrap_or_default();
        for (name, span) in pending.into_iter().rev() {
            c.body.push_front(Stmt::Expr(
                Expr::Variable(ast::Variable { name, context: VarContext::Store, annotation: None, span }),
                c.indent + 1,
            ));
        }

        self.current_scope = saved_scope;
        self.current_class = saved_class;
        self.current_class_scope = saved_class_scope;
        self.scope_depth = saved_depth;
        self.record(c.span, Some(class_id));
        Ok(())
    }

    /// Patterns are literal / wildcard / bare-identifier only (spec §4.3,
    /// Open Question 4 resolution — structural patterns are already
    /// rejected earlier, at parse time). A case after an irrefutable
    /// pattern is unreachable.
    fn analyze_match(&mut self, m: &mut ast::Match) -> SemResult<()> {
        let scrutinee_ty = self.analyze_expr(&m.scrutinee)?;
        let mut seen_irrefutable = false;
        for case in &mut m.cases {
            if seen_irrefutable {
                return Err(SemError::UnreachablePattern { span: case.span });
            }
            // A capture pattern binds a value of the scrutinee's own type;
            // there is nothing else to infer it from.
            if let Pattern::Capture(name, span) = case.pattern {
                self.declare_var(name, scrutinee_ty, span, None)?;
            }
            if let Some(guard) = &case.guard {
                self.analyze_expr(guard)?;
            }
            self.analyze_block(&mut case.body)?;
            seen_irrefutable = case.pattern.is_irrefutable();
        }
        Ok(())
    }

    fn analyze_expr(&mut self, expr: &Expr) -> SemResult<DataType> {
        let ty = match expr {
            Expr::Literal(l) => match &l.value {
                ast::LiteralValue::Int(_) => DataType::Int,
                ast::LiteralValue::Float(_) => DataType::Float,
                ast::LiteralValue::Str(_) => DataType::Str,
                ast::LiteralValue::Bool(_) => DataType::Bool,
                ast::LiteralValue::None => DataType::None,
            },
            Expr::Variable(v) => {
                let Some(id) = self.table.lookup(self.current_scope, v.name) else {
                    return Err(SemError::NameError { name: v.name.as_str().into(), span: v.span });
                };
                self.record(v.span, Some(id));
                match &v.annotation {
                    Some(ann) => self.datatype_from_annotation(ann)?,
                    None => self.table.symbol(id).dtype,
                }
            }
            Expr::BinaryOp(b) => {
                let lt = self.analyze_expr(&b.left)?;
                let rt = self.analyze_expr(&b.right)?;
                self.check_binary(b.op, lt, rt, b.span)?
            }
            Expr::UnaryOp(u) => {
                let operand = self.analyze_expr(&u.operand)?;
                match u.op {
                    UnOp::Not => {
                        if operand != DataType::Bool {
                            return Err(SemError::TypeError {
                                detail: "'not' requires a bool operand".into(),
                                span: u.span,
                            });
                        }
                        DataType::Bool
                    }
                    UnOp::Neg | UnOp::Pos => {
                        if !operand.is_numeric() {
                            return Err(SemError::TypeError {
                                detail: "unary +/- requires a numeric operand".into(),
                                span: u.span,
                            });
                        }
                        operand
                    }
                }
            }
            Expr::Compare(c) => {
                let mut prev = self.analyze_expr(&c.left)?;
                for comparator in &c.comparators {
                    let next = self.analyze_expr(comparator)?;
                    let same_broad_kind = (prev.is_numeric() && next.is_numeric()) || prev == next;
                    if !same_broad_kind {
                        return Err(SemError::TypeError {
                            detail: format!("cannot compare {prev:?} with {next:?}"),
                            span: c.span,
                        });
                    }
                    prev = next;
                }
                DataType::Bool
            }
            Expr::Attribute(attr) => {
                let object_ty = self.analyze_expr(&attr.object)?;
                let Some(class_id) = object_ty.class_id() else {
                    return Err(SemError::TypeError {
                        detail: format!("cannot access attribute '{}' on {object_ty:?}", attr.attr.as_str()),
                        span: attr.span,
                    });
                };
                let Some(member) = self.table.lookup_member(class_id, attr.attr) else {
                    return Err(SemError::NameError { name: attr.attr.as_str().into(), span: attr.span });
                };
                self.record(attr.span, Some(member));
                self.table.symbol(member).dtype
            }
            Expr::Call(call) => {
                let callee_ty = self.analyze_expr(&call.callee)?;
                let mut arg_types = Vec::with_capacity(call.args.len());
                for arg in &call.args {
                    arg_types.push(self.analyze_expr(arg)?);
                }
                let Some(callee_id) = self.resolutions.get(&call.callee.span()).copied() else {
                    return Err(SemError::Internal {
                        detail: "call target did not resolve to a symbol".into(),
                        span: call.span,
                    });
                };
                let all_params = &self.table.symbol(callee_id).param_types;
                // A method call `obj.method(args)` supplies `self` implicitly
                // via the attribute base, so the leading `self` parameter is
                // excluded from the explicit-argument arity/type check.
                let is_method_call = matches!(call.callee.as_ref(), Expr::Attribute(_));
                let param_types: Vec<DataType> = if is_method_call && !all_params.is_empty() {
                    all_params[1..].to_vec()
                } else {
                    all_params.clone()
                };
                if param_types.len() != arg_types.len() {
                    return Err(SemError::ArityMismatch {
                        expected: param_types.len(),
                        found: arg_types.len(),
                        span: call.span,
                    });
                }
                for (expected, found) in param_types.iter().zip(arg_types.iter()) {
                    if *expected != DataType::Unknown && expected.widen(*found).is_none() {
                        return Err(SemError::TypeError {
                            detail: format!("expected argument of type {expected:?}, got {found:?}"),
                            span: call.span,
                        });
                    }
                }
                callee_ty
            }
            Expr::List(list) => {
                for item in &list.items {
                    self.analyze_expr(item)?;
                }
                DataType::List
            }
        };
        self.types.insert(expr.span(), ty);
        Ok(ty)
    }

    fn check_binary(&self, op: BinOp, lt: DataType, rt: DataType, span: Span) -> SemResult<DataType> {
        match op {
            // `**` has no C lowering (spec §4.5, §7's canonical
            // `UnsupportedFeature` example) — reject it here rather than
            // letting it reach the emitter.
            BinOp::Pow => Err(SemError::UnsupportedFeature { detail: "'**' has no target lowering".into(), span }),
            BinOp::Add if lt == DataType::Str && rt == DataType::Str => Ok(DataType::Str),
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::FloorDiv | BinOp::Mod => {
                if lt.is_numeric() && rt.is_numeric() {
                    Ok(lt.widen(rt).unwrap_or(DataType::Float))
                } else {
                    Err(SemError::TypeError {
                        detail: format!("arithmetic requires numeric operands, got {lt:?} and {rt:?}"),
                        span,
                    })
                }
            }
            BinOp::And | BinOp::Or => {
                if lt == DataType::Bool && rt == DataType::Bool {
                    Ok(DataType::Bool)
                } else {
                    Err(SemError::TypeError {
                        detail: format!("'and'/'or' require bool operands, got {lt:?} and {rt:?}"),
                        span,
                    })
                }
            }
        }
    }

    fn datatype_from_annotation(&self, ann: &ast::TypeAnnotation) -> SemResult<DataType> {
        match ann.name.as_str() {
            "int" => Ok(DataType::Int),
            "float" => Ok(DataType::Float),
            "str" => Ok(DataType::Str),
            "bool" => Ok(DataType::Bool),
            "list" => Ok(DataType::List),
            "None" => Ok(DataType::None),
            other => match self.table.lookup(self.current_scope, ann.name) {
                Some(id) if self.table.symbol(id).kind == SymbolKind::Class => Ok(DataType::Object(id)),
                _ => Err(SemError::NameError { name: other.into(), span: ann.span }),
            },
        }
    }

    fn record(&mut self, span: Span, id: Option<SymbolId>) {
        if let Some(id) = id {
            self.resolutions.insert(span, id);
        }
    }
}
