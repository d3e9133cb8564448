//! Expression parsing (spec §4.2): collect the token run up to the next
//! `NEWLINE`/`ENDMARKER`/`:`/indent drop, run the shunting-yard algorithm to
//! turn it from infix into postfix, then fold the postfix run into a tree.
//!
//! This is a direct generalization of the source language's own two-step
//! shunting yard (collect the run, `infix_to_postfix`, then pop/apply off an
//! operand stack) extended with the operand kinds spec §3 adds on top of
//! that original two-operator-type core: attribute access, calls, and list
//! literals.

use crate::ast::{
    Attribute, BinOp, BinaryOp, Call, Compare, CompareOp, Expr, ListExpr, Literal, LiteralValue,
    UnOp, UnaryOp, VarContext, Variable,
};
use crate::error::{ParseError, ParseResult};
use ceeify_lex::{Token, TokenKind};
use ceeify_util::{Span, Symbol};

/// Precedence levels, exactly as laid out in spec §4.2: 0 binds loosest.
/// `and`/`or` sit below comparisons since the source spec never defines
/// short-circuit logic as anything but the weakest binder.
fn precedence(lexeme: &str, is_keyword: bool) -> Option<u8> {
    if is_keyword {
        return match lexeme {
            "and" | "or" => Some(0),
            "is" => Some(1),
            _ => None,
        };
    }
    match lexeme {
        "==" | "!=" | "<" | ">" | "<=" | ">=" => Some(1),
        "+" | "-" => Some(2),
        "*" | "/" | "//" | "%" => Some(3),
        "**" => Some(4),
        _ => None,
    }
}

fn is_right_associative(lexeme: &str) -> bool {
    lexeme == "**"
}

fn is_compare_op(lexeme: &str, is_keyword: bool) -> bool {
    matches!(lexeme, "==" | "!=" | "<" | ">" | "<=" | ">=") || (is_keyword && lexeme == "is")
}

fn compare_op_of(lexeme: &str) -> CompareOp {
    match lexeme {
        "<" => CompareOp::Lt,
        ">" => CompareOp::Gt,
        "<=" => CompareOp::Le,
        ">=" => CompareOp::Ge,
        "==" => CompareOp::Eq,
        "!=" => CompareOp::Ne,
        "is" => CompareOp::Is,
        _ => unreachable!("non-compare lexeme passed to compare_op_of"),
    }
}

fn bin_op_of(lexeme: &str) -> BinOp {
    match lexeme {
        "+" => BinOp::Add,
        "-" => BinOp::Sub,
        "*" => BinOp::Mul,
        "/" => BinOp::Div,
        "//" => BinOp::FloorDiv,
        "%" => BinOp::Mod,
        "**" => BinOp::Pow,
        "and" => BinOp::And,
        "or" => BinOp::Or,
        _ => unreachable!("non-binary lexeme passed to bin_op_of"),
    }
}

#[derive(Clone, Copy)]
enum OpStackEntry<'src> {
    Paren,
    Bracket,
    /// `(` that opened a call. The callee isn't known at this stage — it's
    /// whatever expression is already on the operand stack when the call is
    /// applied in `build_tree`, so a method call (`obj.method(...)`) and a
    /// bare call (`f(...)`) both just pop one extra value.
    CallOpen,
    UnaryOp(Token<'src>),
    BinOp(Token<'src>),
}

#[derive(Clone)]
pub(crate) enum Postfix<'src> {
    Operand(Token<'src>),
    Unary(Token<'src>),
    Bin(Token<'src>),
    /// Pops one operand, applies attribute access with this name.
    Attr(Token<'src>),
    /// Pops `argc` operands (in order) as call arguments, then one more
    /// value as the callee.
    Call(Token<'src>, usize),
    /// Pops `argc` operands (in order) as list elements.
    List(Token<'src>, usize),
}

/// Returns the exclusive end index of the token run starting at `from`,
/// bounded by `NEWLINE`, `ENDMARKER`, a bare `:` delimiter, or a change in
/// indent level (mirrors `collect_expression`'s scope check).
pub fn expression_run_end(tokens: &[Token<'_>], from: usize) -> usize {
    if from >= tokens.len() {
        return from;
    }
    let scope = tokens[from].indent;
    let mut j = from;
    while j < tokens.len() {
        let tok = &tokens[j];
        if tok.kind == TokenKind::Newline
            || tok.kind == TokenKind::Endmarker
            || tok.is_delim(":")
            || tok.indent != scope
        {
            break;
        }
        j += 1;
    }
    j
}

struct ShuntState<'src> {
    ops: Vec<OpStackEntry<'src>>,
    argcounts: Vec<usize>,
    output: Vec<Postfix<'src>>,
}

/// `true` when, syntactically, the next token starts a new operand rather
/// than continuing one (so a leading `-`/`+`/`not` is unary).
fn expects_operand(prev: Option<&Token<'_>>) -> bool {
    match prev {
        None => true,
        Some(t) => {
            t.is_delim("(") || t.is_delim(",") || t.kind == TokenKind::Lsqb || {
                t.kind == TokenKind::Operator || (t.kind == TokenKind::Keyword && matches!(t.lexeme, "and" | "or" | "not"))
            }
        }
    }
}

fn pop_while<'src>(state: &mut ShuntState<'src>, keep_going: impl Fn(&OpStackEntry<'src>) -> bool) {
    while let Some(top) = state.ops.last().copied() {
        if !keep_going(&top) {
            break;
        }
        state.ops.pop();
        match top {
            OpStackEntry::UnaryOp(t) => state.output.push(Postfix::Unary(t)),
            OpStackEntry::BinOp(t) => state.output.push(Postfix::Bin(t)),
            OpStackEntry::Paren | OpStackEntry::Bracket | OpStackEntry::CallOpen => {}
        }
    }
}

pub(crate) fn infix_to_postfix<'src>(tokens: &[Token<'src>]) -> ParseResult<Vec<Postfix<'src>>> {
    let mut state = ShuntState { ops: Vec::new(), argcounts: Vec::new(), output: Vec::new() };
    let mut i = 0;
    let mut prev: Option<Token<'src>> = None;

    while i < tokens.len() {
        let tok = tokens[i];

        match tok.kind {
            TokenKind::Number | TokenKind::String => {
                state.output.push(Postfix::Operand(tok));
                prev = Some(tok);
            }
            TokenKind::Identifier => {
                state.output.push(Postfix::Operand(tok));
                prev = Some(tok);
            }
            TokenKind::Keyword if matches!(tok.lexeme, "True" | "False" | "None") => {
                state.output.push(Postfix::Operand(tok));
                prev = Some(tok);
            }
            TokenKind::Operator if tok.lexeme == "." => {
                i += 1;
                let attr = *tokens.get(i).ok_or(ParseError::Expected {
                    expected: "attribute name",
                    found: "end of expression".to_string(),
                    line: tok.line,
                    span: tok.span,
                })?;
                if attr.kind != TokenKind::Identifier {
                    return Err(ParseError::Expected {
                        expected: "attribute name",
                        found: attr.lexeme.to_string(),
                        line: attr.line,
                        span: attr.span,
                    });
                }
                state.output.push(Postfix::Attr(attr));
                prev = Some(attr);
            }
            TokenKind::Operator | TokenKind::Keyword if precedence(tok.lexeme, tok.kind == TokenKind::Keyword).is_some() || tok.is_keyword("not") => {
                if (tok.lexeme == "-" || tok.lexeme == "+" || tok.is_keyword("not")) && expects_operand(prev.as_ref()) {
                    // Unary operators bind tighter than anything already on
                    // the stack and stack right-to-left, so push without
                    // popping: `--x` must become `x Neg Neg`, not flush the
                    // outer `-` before `x` is even seen.
                    state.ops.push(OpStackEntry::UnaryOp(tok));
                } else {
                    let is_kw = tok.kind == TokenKind::Keyword;
                    let prec = precedence(tok.lexeme, is_kw).ok_or(ParseError::UnexpectedToken {
                        found: tok.lexeme.to_string(),
                        line: tok.line,
                        span: tok.span,
                    })?;
                    pop_while(&mut state, |top| match top {
                        OpStackEntry::UnaryOp(_) => true,
                        OpStackEntry::BinOp(t) => {
                            let tp = precedence(t.lexeme, t.kind == TokenKind::Keyword).unwrap_or(0);
                            if is_right_associative(tok.lexeme) {
                                tp > prec
                            } else {
                                tp >= prec
                            }
                        }
                        OpStackEntry::Paren | OpStackEntry::Bracket | OpStackEntry::CallOpen => false,
                    });
                    state.ops.push(OpStackEntry::BinOp(tok));
                }
                prev = Some(tok);
            }
            TokenKind::Delimiter if tok.lexeme == "(" => {
                // `(` directly after a value (identifier, attribute, `)`,
                // `]`) applies a call; any other position opens a grouping.
                if !expects_operand(prev.as_ref()) {
                    state.ops.push(OpStackEntry::CallOpen);
                    state.argcounts.push(if tokens.get(i + 1).map(|t| t.is_delim(")")).unwrap_or(false) { 0 } else { 1 });
                } else {
                    state.ops.push(OpStackEntry::Paren);
                }
                prev = Some(tok);
            }
            TokenKind::Delimiter if tok.lexeme == ")" => {
                pop_while(&mut state, |top| !matches!(top, OpStackEntry::Paren | OpStackEntry::CallOpen));
                match state.ops.pop() {
                    Some(OpStackEntry::Paren) => {}
                    Some(OpStackEntry::CallOpen) => {
                        let argc = state.argcounts.pop().unwrap_or(0);
                        state.output.push(Postfix::Call(tok, argc));
                    }
                    _ => {
                        return Err(ParseError::Unbalanced { opener: '(', line: tok.line, span: tok.span });
                    }
                }
                prev = Some(tok);
            }
            TokenKind::Lsqb => {
                state.ops.push(OpStackEntry::Bracket);
                state.argcounts.push(if tokens.get(i + 1).map(|t| t.kind == TokenKind::Rsqb).unwrap_or(false) { 0 } else { 1 });
                prev = Some(tok);
            }
            TokenKind::Rsqb => {
                pop_while(&mut state, |top| !matches!(top, OpStackEntry::Bracket));
                match state.ops.pop() {
                    Some(OpStackEntry::Bracket) => {
                        let argc = state.argcounts.pop().unwrap_or(0);
                        state.output.push(Postfix::List(tok, argc));
                    }
                    _ => return Err(ParseError::Unbalanced { opener: '[', line: tok.line, span: tok.span }),
                }
                prev = Some(tok);
            }
            TokenKind::Delimiter if tok.lexeme == "," => {
                pop_while(&mut state, |top| !matches!(top, OpStackEntry::Paren | OpStackEntry::Bracket | OpStackEntry::CallOpen));
                if let Some(n) = state.argcounts.last_mut() {
                    *n += 1;
                }
                prev = Some(tok);
            }
            _ => {
                return Err(ParseError::UnexpectedToken { found: tok.lexeme.to_string(), line: tok.line, span: tok.span });
            }
        }
        i += 1;
    }

    pop_while(&mut state, |top| !matches!(top, OpStackEntry::Paren | OpStackEntry::Bracket | OpStackEntry::CallOpen));
    if let Some(bad) = state.ops.first() {
        let (opener, span, line) = match bad {
            OpStackEntry::Paren | OpStackEntry::CallOpen => ('(', tokens[0].span, tokens[0].line),
            OpStackEntry::Bracket => ('[', tokens[0].span, tokens[0].line),
            _ => ('(', tokens[0].span, tokens[0].line),
        };
        return Err(ParseError::Unbalanced { opener, line, span });
    }

    Ok(state.output)
}

fn literal_of(tok: &Token<'_>) -> Expr {
    let value = match tok.kind {
        TokenKind::Number => {
            if tok.lexeme.contains('.') {
                LiteralValue::Float(tok.lexeme.to_string())
            } else {
                LiteralValue::Int(tok.lexeme.to_string())
            }
        }
        TokenKind::String => LiteralValue::Str(tok.lexeme.trim_matches(|c| c == '"' || c == '\'').to_string()),
        TokenKind::Keyword if tok.lexeme == "True" => LiteralValue::Bool(true),
        TokenKind::Keyword if tok.lexeme == "False" => LiteralValue::Bool(false),
        TokenKind::Keyword if tok.lexeme == "None" => LiteralValue::None,
        _ => LiteralValue::Str(tok.lexeme.to_string()),
    };
    Expr::Literal(Literal { value, span: tok.span })
}

fn operand_of(tok: &Token<'_>) -> Expr {
    match tok.kind {
        TokenKind::Identifier => Expr::Variable(Variable {
            name: Symbol::intern(tok.lexeme),
            context: VarContext::Load,
            annotation: None,
            span: tok.span,
        }),
        TokenKind::Keyword if matches!(tok.lexeme, "True" | "False" | "None") => literal_of(tok),
        _ => literal_of(tok),
    }
}

/// Folds one comparison application onto `left`, merging into an existing
/// chain when `left` is itself a `Compare` produced by the same
/// left-associative fold (spec §3: `1 <= a < 10` stays one `Compare` node,
/// never nested binary ops).
fn fold_compare(left: Expr, op: CompareOp, right: Expr, span: Span) -> Expr {
    match left {
        Expr::Compare(mut chain) => {
            chain.ops.push(op);
            chain.comparators.push(right);
            chain.span = span;
            Expr::Compare(chain)
        }
        other => Expr::Compare(Compare { left: Box::new(other), ops: vec![op], comparators: vec![right], span }),
    }
}

pub(crate) fn build_tree(postfix: &[Postfix<'_>], whole_span: Span) -> ParseResult<Expr> {
    let mut stack: Vec<Expr> = Vec::new();

    for item in postfix {
        match item {
            Postfix::Operand(tok) => stack.push(operand_of(tok)),
            Postfix::Unary(tok) => {
                let operand = stack.pop().ok_or(ParseError::EmptyExpression { line: tok.line, span: tok.span })?;
                let op = if tok.is_keyword("not") { UnOp::Not } else if tok.lexeme == "-" { UnOp::Neg } else { UnOp::Pos };
                let span = Span::new(tok.span.start, operand.span().end, tok.line, tok.col);
                stack.push(Expr::UnaryOp(UnaryOp { op, operand: Box::new(operand), span }));
            }
            Postfix::Bin(tok) => {
                let right = stack.pop().ok_or(ParseError::EmptyExpression { line: tok.line, span: tok.span })?;
                let left = stack.pop().ok_or(ParseError::EmptyExpression { line: tok.line, span: tok.span })?;
                let span = Span::new(left.span().start, right.span().end, tok.line, tok.col);
                let is_kw = tok.kind == TokenKind::Keyword;
                if is_compare_op(tok.lexeme, is_kw) {
                    stack.push(fold_compare(left, compare_op_of(tok.lexeme), right, span));
                } else {
                    stack.push(Expr::BinaryOp(BinaryOp { op: bin_op_of(tok.lexeme), left: Box::new(left), right: Box::new(right), span }));
                }
            }
            Postfix::Attr(tok) => {
                let object = stack.pop().ok_or(ParseError::EmptyExpression { line: tok.line, span: tok.span })?;
                let span = Span::new(object.span().start, tok.span.end, object.span().line, object.span().column);
                stack.push(Expr::Attribute(Attribute { object: Box::new(object), attr: Symbol::intern(tok.lexeme), span }));
            }
            Postfix::Call(paren, argc) => {
                if stack.len() < *argc + 1 {
                    return Err(ParseError::EmptyExpression { line: paren.line, span: paren.span });
                }
                let args = stack.split_off(stack.len() - argc);
                let callee = stack.pop().ok_or(ParseError::EmptyExpression { line: paren.line, span: paren.span })?;
                let span = Span::new(callee.span().start, paren.span.end, callee.span().line, callee.span().column);
                stack.push(Expr::Call(Call { callee: Box::new(callee), args, span }));
            }
            Postfix::List(tok, argc) => {
                if stack.len() < *argc {
                    return Err(ParseError::EmptyExpression { line: tok.line, span: tok.span });
                }
                let items = stack.split_off(stack.len() - argc);
                stack.push(Expr::List(ListExpr { items, span: tok.span }));
            }
        }
    }

    stack.pop().ok_or(ParseError::EmptyExpression { line: whole_span.line, span: whole_span })
}

pub fn parse_expression(tokens: &[Token<'_>]) -> ParseResult<Expr> {
    if tokens.is_empty() {
        return Err(ParseError::EmptyExpression { line: 0, span: Span::DUMMY });
    }
    let whole_span = Span::new(tokens[0].span.start, tokens[tokens.len() - 1].span.end, tokens[0].line, tokens[0].col);
    let postfix = infix_to_postfix(tokens)?;
    build_tree(&postfix, whole_span)
}
