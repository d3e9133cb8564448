//! AST node definitions (spec §3): one Rust enum variant per syntactic form.
//!
//! Back-edges the original design describes as raw pointers (`parent` on
//! `Variable`, `base_class` on class symbols) are *not* carried on these
//! nodes. The tree here is a plain owned `Box`-tree — safe by construction,
//! no dangling-pointer risk even when the analyzer mutates it in place (spec
//! §4.3's synthetic-field insertion). The graph-shaped back-edges spec §9
//! worries about (`base_class`, the scope chain) live in `ceeify-sem` as
//! index types into an `IndexVec`, which is where the real cycle is.

use ceeify_util::{Span, Symbol};

/// A block is an ordered sequence of statements. Spec §3 requires O(1)
/// append at both ends and O(1) tail pop; `VecDeque` gives us both, and the
/// one place the pipeline needs a front append — class-body synthetic field
/// insertion (spec §4.3) — wants statements *visible before* the method
/// bodies that use them, i.e. at the front.
pub type Block = std::collections::VecDeque<Stmt>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarContext {
    Load,
    Store,
    Del,
}

#[derive(Clone, Debug)]
pub struct TypeAnnotation {
    pub name: Symbol,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum LiteralValue {
    Int(String),
    Float(String),
    Str(String),
    Bool(bool),
    None,
}

#[derive(Clone, Debug)]
pub struct Literal {
    pub value: LiteralValue,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Variable {
    pub name: Symbol,
    pub context: VarContext,
    pub annotation: Option<TypeAnnotation>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    FloorDiv,
    Mod,
    Pow,
    And,
    Or,
}

#[derive(Clone, Debug)]
pub struct BinaryOp {
    pub op: BinOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnOp {
    Neg,
    Pos,
    Not,
}

#[derive(Clone, Debug)]
pub struct UnaryOp {
    pub op: UnOp,
    pub operand: Box<Expr>,
    pub span: Span,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    Is,
}

/// A chained comparison (`1 <= a < 10`): `ops[i]` applies to
/// `(comparators[i-1] or left, comparators[i])`. Chained comparisons are
/// first-class and never rewritten into nested `and`s (spec §3/§4.2).
#[derive(Clone, Debug)]
pub struct Compare {
    pub left: Box<Expr>,
    pub ops: Vec<CompareOp>,
    pub comparators: Vec<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Attribute {
    pub object: Box<Expr>,
    pub attr: Symbol,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Call {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct ListExpr {
    pub items: Vec<Expr>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum Expr {
    Literal(Literal),
    Variable(Variable),
    BinaryOp(BinaryOp),
    UnaryOp(UnaryOp),
    Compare(Compare),
    Attribute(Attribute),
    Call(Call),
    List(ListExpr),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Literal(l) => l.span,
            Expr::Variable(v) => v.span,
            Expr::BinaryOp(b) => b.span,
            Expr::UnaryOp(u) => u.span,
            Expr::Compare(c) => c.span,
            Expr::Attribute(a) => a.span,
            Expr::Call(c) => c.span,
            Expr::List(l) => l.span,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Assignment {
    pub targets: Vec<Expr>,
    pub value: Expr,
    pub span: Span,
    pub indent: u32,
}

#[derive(Clone, Debug)]
pub struct If {
    pub test: Expr,
    pub body: Block,
    pub orelse: Block,
    pub span: Span,
    pub indent: u32,
}

#[derive(Clone, Debug)]
pub struct While {
    pub test: Expr,
    pub body: Block,
    pub orelse: Block,
    pub span: Span,
    pub indent: u32,
}

#[derive(Clone, Debug)]
pub struct For {
    pub target: Variable,
    pub iter: Expr,
    pub body: Block,
    pub orelse: Block,
    pub span: Span,
    pub indent: u32,
}

/// A `match` pattern (spec §4.3: literal, wildcard, or bare identifier —
/// structural patterns are rejected at parse time per SPEC_FULL.md Open
/// Question 4).
#[derive(Clone, Debug)]
pub enum Pattern {
    Literal(Literal),
    Wildcard(Span),
    Capture(Symbol, Span),
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Literal(l) => l.span,
            Pattern::Wildcard(s) => *s,
            Pattern::Capture(_, s) => *s,
        }
    }

    pub fn is_irrefutable(&self) -> bool {
        matches!(self, Pattern::Wildcard(_) | Pattern::Capture(_, _))
    }
}

#[derive(Clone, Debug)]
pub struct MatchCase {
    pub pattern: Pattern,
    pub guard: Option<Expr>,
    pub body: Block,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct Match {
    pub scrutinee: Expr,
    pub cases: Vec<MatchCase>,
    pub span: Span,
    pub indent: u32,
}

#[derive(Clone, Debug)]
pub struct Param {
    pub name: Symbol,
    pub annotation: Option<TypeAnnotation>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub struct FunctionDef {
    pub name: Symbol,
    pub params: Vec<Param>,
    pub returns: Option<TypeAnnotation>,
    pub body: Block,
    pub span: Span,
    pub indent: u32,
}

#[derive(Clone, Debug)]
pub struct ClassDef {
    pub name: Symbol,
    pub bases: Vec<Symbol>,
    pub body: Block,
    pub span: Span,
    pub indent: u32,
}

#[derive(Clone, Debug)]
pub struct Import {
    pub names: Vec<Variable>,
    pub span: Span,
    pub indent: u32,
}

#[derive(Clone, Debug)]
pub struct Return {
    pub value: Option<Expr>,
    pub span: Span,
    pub indent: u32,
}

#[derive(Clone, Debug)]
pub enum Stmt {
    Assignment(Assignment),
    If(If),
    While(While),
    For(For),
    Match(Match),
    FunctionDef(FunctionDef),
    ClassDef(ClassDef),
    Import(Import),
    Return(Return),
    Expr(Expr, u32),
}

impl Stmt {
    pub fn indent(&self) -> u32 {
        match self {
            Stmt::Assignment(a) => a.indent,
            Stmt::If(s) => s.indent,
            Stmt::While(s) => s.indent,
            Stmt::For(s) => s.indent,
            Stmt::Match(s) => s.indent,
            Stmt::FunctionDef(s) => s.indent,
            Stmt::ClassDef(s) => s.indent,
            Stmt::Import(s) => s.indent,
            Stmt::Return(s) => s.indent,
            Stmt::Expr(_, indent) => *indent,
        }
    }
}

/// The parser's output: the module's top-level block.
pub type Ast = Block;
