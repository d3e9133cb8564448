//! Statement parsing (spec §4.2): dispatch on the leading token of each
//! logical line, recursing into nested blocks by indent level.

use crate::ast::{
    Assignment, Block, ClassDef, Expr, For, FunctionDef, If, Import, LiteralValue, Match,
    MatchCase, Param, Pattern, Return, Stmt, TypeAnnotation, VarContext, Variable, While,
};
use crate::error::{ParseError, ParseResult};
use crate::expr::{expression_run_end, parse_expression};
use ceeify_lex::{Token, TokenKind};
use ceeify_util::Symbol;

pub struct Parser<'src> {
    tokens: Vec<Token<'src>>,
    pos: usize,
}

impl<'src> Parser<'src> {
    pub fn new(tokens: Vec<Token<'src>>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn cur(&self) -> &Token<'src> {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn at_end(&self) -> bool {
        self.cur().kind == TokenKind::Endmarker
    }

    fn advance(&mut self) -> Token<'src> {
        let t = self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn skip_newlines(&mut self) {
        while self.cur().kind == TokenKind::Newline {
            self.advance();
        }
    }

    fn expect_delim(&mut self, lexeme: &'static str) -> ParseResult<Token<'src>> {
        if self.cur().is_delim(lexeme) {
            Ok(self.advance())
        } else {
            let tok = *self.cur();
            Err(ParseError::Expected { expected: lexeme, found: tok.lexeme.to_string(), line: tok.line, span: tok.span })
        }
    }

    fn expect_keyword(&mut self, word: &'static str) -> ParseResult<Token<'src>> {
        if self.cur().is_keyword(word) {
            Ok(self.advance())
        } else {
            let tok = *self.cur();
            Err(ParseError::Expected { expected: word, found: tok.lexeme.to_string(), line: tok.line, span: tok.span })
        }
    }

    fn expect_identifier(&mut self) -> ParseResult<Token<'src>> {
        if self.cur().kind == TokenKind::Identifier {
            Ok(self.advance())
        } else {
            let tok = *self.cur();
            Err(ParseError::Expected { expected: "identifier", found: tok.lexeme.to_string(), line: tok.line, span: tok.span })
        }
    }

    fn parse_expr_run(&mut self) -> ParseResult<Expr> {
        let end = expression_run_end(&self.tokens, self.pos);
        let slice = &self.tokens[self.pos..end];
        let expr = parse_expression(slice)?;
        self.pos = end;
        Ok(expr)
    }

    /// Parses a `name` or `name: Type` annotation suffix, used by both
    /// variable targets and function parameters.
    fn parse_annotation(&mut self) -> ParseResult<Option<TypeAnnotation>> {
        if self.cur().is_delim(":") {
            self.advance();
            let name_tok = self.expect_identifier()?;
            Ok(Some(TypeAnnotation { name: Symbol::intern(name_tok.lexeme), span: name_tok.span }))
        } else {
            Ok(None)
        }
    }

    /// Parses the block of statements indented one level deeper than
    /// `header_indent`. The header's trailing `:` must already be consumed.
    fn parse_block(&mut self, header_indent: u32) -> ParseResult<Block> {
        self.skip_newlines();
        let mut body = Block::new();
        while !self.at_end() && self.cur().indent > header_indent {
            body.push_back(self.parse_statement()?);
            self.skip_newlines();
        }
        Ok(body)
    }

    pub fn parse_module(&mut self) -> ParseResult<Block> {
        let mut items = Block::new();
        self.skip_newlines();
        while !self.at_end() {
            items.push_back(self.parse_statement()?);
            self.skip_newlines();
        }
        Ok(items)
    }

    fn parse_statement(&mut self) -> ParseResult<Stmt> {
        let tok = *self.cur();
        if tok.kind == TokenKind::Keyword {
            match tok.lexeme {
                "import" => return self.parse_import(),
                "if" => return self.parse_if(),
                "while" => return self.parse_while(),
                "for" => return self.parse_for(),
                "def" => return self.parse_function_def(),
                "class" => return self.parse_class_def(),
                "return" => return self.parse_return(),
                _ => {}
            }
        }
        if tok.kind == TokenKind::Identifier && tok.lexeme == "match" {
            if let Some(next) = self.tokens.get(self.pos + 1) {
                if !next.is_operator("=") {
                    return self.parse_match();
                }
            }
        }
        self.parse_assignment_or_expr()
    }

    fn parse_import(&mut self) -> ParseResult<Stmt> {
        let kw = self.advance();
        let mut names = Vec::new();
        loop {
            let name_tok = self.expect_identifier()?;
            names.push(Variable {
                name: Symbol::intern(name_tok.lexeme),
                context: VarContext::Load,
                annotation: None,
                span: name_tok.span,
            });
            if self.cur().is_delim(",") {
                self.advance();
            } else {
                break;
            }
        }
        let span = kw.span.merge(names.last().map(|v| v.span).unwrap_or(kw.span));
        Ok(Stmt::Import(Import { names, span, indent: kw.indent }))
    }

    /// Parses a comma-separated list of assignment targets or a single bare
    /// expression statement, per spec §4.2's identifier-list + `=` lookahead.
    fn parse_assignment_or_expr(&mut self) -> ParseResult<Stmt> {
        let start_tok = *self.cur();
        let mut targets = vec![self.parse_assignment_target()?];
        while self.cur().is_delim(",") {
            self.advance();
            targets.push(self.parse_assignment_target()?);
        }

        if self.cur().is_operator("=") {
            self.advance();
            let value = self.parse_expr_run()?;
            let span = start_tok.span.merge(value.span());
            return Ok(Stmt::Assignment(Assignment { targets, value, span, indent: start_tok.indent }));
        }

        if targets.len() == 1 {
            // Not an assignment after all: re-parse the whole run as one
            // expression so operators spanning the comma-free path work.
            self.pos = self.pos_of_token(&start_tok);
            let expr = self.parse_expr_run()?;
            return Ok(Stmt::Expr(expr, start_tok.indent));
        }

        let tok = *self.cur();
        Err(ParseError::Expected { expected: "=", found: tok.lexeme.to_string(), line: tok.line, span: tok.span })
    }

    fn pos_of_token(&self, tok: &Token<'src>) -> usize {
        self.tokens.iter().position(|t| t.span.start == tok.span.start).unwrap_or(self.pos)
    }

    fn parse_assignment_target(&mut self) -> ParseResult<Expr> {
        let name_tok = self.expect_identifier()?;
        let annotation = self.parse_annotation()?;
        Ok(Expr::Variable(Variable {
            name: Symbol::intern(name_tok.lexeme),
            context: VarContext::Store,
            annotation,
            span: name_tok.span,
        }))
    }

    fn parse_if(&mut self) -> ParseResult<Stmt> {
        let kw = self.advance();
        let test = self.parse_expr_run()?;
        self.expect_delim(":")?;
        let body = self.parse_block(kw.indent)?;

        let orelse = if self.cur().is_keyword("elif") {
            let mut inner = Block::new();
            inner.push_back(self.parse_if_tail()?);
            inner
        } else if self.cur().is_keyword("else") {
            self.advance();
            self.expect_delim(":")?;
            self.parse_block(kw.indent)?
        } else {
            Block::new()
        };

        let span = kw.span.merge(test.span());
        Ok(Stmt::If(If { test, body, orelse, span, indent: kw.indent }))
    }

    /// An `elif` is parsed as a nested `If` wrapped in the parent's `orelse`,
    /// so a long `elif` chain becomes a right-leaning tree of `If` nodes —
    /// exactly the shape the emitter needs to lower back into `else if`.
    fn parse_if_tail(&mut self) -> ParseResult<Stmt> {
        let kw = self.advance(); // consumes "elif"
        let test = self.parse_expr_run()?;
        self.expect_delim(":")?;
        let body = self.parse_block(kw.indent)?;
        let orelse = if self.cur().is_keyword("elif") {
            let mut inner = Block::new();
            inner.push_back(self.parse_if_tail()?);
            inner
        } else if self.cur().is_keyword("else") {
            self.advance();
            self.expect_delim(":")?;
            self.parse_block(kw.indent)?
        } else {
            Block::new()
        };
        let span = kw.span.merge(test.span());
        Ok(Stmt::If(If { test, body, orelse, span, indent: kw.indent }))
    }

    fn parse_while(&mut self) -> ParseResult<Stmt> {
        let kw = self.advance();
        let test = self.parse_expr_run()?;
        self.expect_delim(":")?;
        let body = self.parse_block(kw.indent)?;
        let orelse = if self.cur().is_keyword("else") {
            self.advance();
            self.expect_delim(":")?;
            self.parse_block(kw.indent)?
        } else {
            Block::new()
        };
        let span = kw.span.merge(test.span());
        Ok(Stmt::While(While { test, body, orelse, span, indent: kw.indent }))
    }

    fn parse_for(&mut self) -> ParseResult<Stmt> {
        let kw = self.advance();
        let target_tok = self.expect_identifier()?;
        let target = Variable { name: Symbol::intern(target_tok.lexeme), context: VarContext::Store, annotation: None, span: target_tok.span };
        self.expect_keyword("in")?;
        let iter = self.parse_expr_run()?;
        self.expect_delim(":")?;
        let body = self.parse_block(kw.indent)?;
        let orelse = if self.cur().is_keyword("else") {
            self.advance();
            self.expect_delim(":")?;
            self.parse_block(kw.indent)?
        } else {
            Block::new()
        };
        let span = kw.span.merge(iter.span());
        Ok(Stmt::For(For { target, iter, body, orelse, span, indent: kw.indent }))
    }

    fn parse_match(&mut self) -> ParseResult<Stmt> {
        let kw = self.advance(); // "match" identifier
        let scrutinee = self.parse_expr_run()?;
        self.expect_delim(":")?;
        self.skip_newlines();
        let mut cases = Vec::new();
        while !self.at_end() && self.cur().indent > kw.indent {
            cases.push(self.parse_case(kw.indent)?);
            self.skip_newlines();
        }
        let span = kw.span.merge(scrutinee.span());
        Ok(Stmt::Match(Match { scrutinee, cases, span, indent: kw.indent }))
    }

    fn parse_case(&mut self, match_indent: u32) -> ParseResult<crate::ast::MatchCase> {
        let case_tok = if self.cur().kind == TokenKind::Identifier && self.cur().lexeme == "case" {
            self.advance()
        } else {
            let tok = *self.cur();
            return Err(ParseError::Expected { expected: "case", found: tok.lexeme.to_string(), line: tok.line, span: tok.span });
        };
        let pattern = self.parse_pattern()?;
        let guard = if self.cur().is_keyword("if") {
            self.advance();
            Some(self.parse_expr_run()?)
        } else {
            None
        };
        self.expect_delim(":")?;
        let body = self.parse_block(match_indent + 1)?;
        let span = case_tok.span.merge(pattern.span());
        Ok(MatchCase { pattern, guard, body, span })
    }

    /// Only literal, wildcard (`_`), and bare-identifier capture patterns
    /// parse; any structural shape is rejected here rather than deferred to
    /// the analyzer (SPEC_FULL.md Open Question 4).
    fn parse_pattern(&mut self) -> ParseResult<Pattern> {
        let tok = *self.cur();
        match tok.kind {
            TokenKind::Identifier if tok.lexeme == "_" => {
                self.advance();
                Ok(Pattern::Wildcard(tok.span))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Pattern::Capture(Symbol::intern(tok.lexeme), tok.span))
            }
            TokenKind::Number | TokenKind::String => {
                self.advance();
                let value = if tok.kind == TokenKind::Number {
                    if tok.lexeme.contains('.') { LiteralValue::Float(tok.lexeme.to_string()) } else { LiteralValue::Int(tok.lexeme.to_string()) }
                } else {
                    LiteralValue::Str(tok.lexeme.trim_matches(|c| c == '"' || c == '\'').to_string())
                };
                Ok(Pattern::Literal(crate::ast::Literal { value, span: tok.span }))
            }
            TokenKind::Keyword if matches!(tok.lexeme, "True" | "False" | "None") => {
                self.advance();
                let value = match tok.lexeme {
                    "True" => LiteralValue::Bool(true),
                    "False" => LiteralValue::Bool(false),
                    _ => LiteralValue::None,
                };
                Ok(Pattern::Literal(crate::ast::Literal { value, span: tok.span }))
            }
            _ => Err(ParseError::UnsupportedPattern { found: tok.lexeme.to_string(), line: tok.line, span: tok.span }),
        }
    }

    fn parse_function_def(&mut self) -> ParseResult<Stmt> {
        let kw = self.advance();
        let name_tok = self.expect_identifier()?;
        self.expect_delim("(")?;
        let mut params = Vec::new();
        while !self.cur().is_delim(")") {
            let p_tok = self.expect_identifier()?;
            let annotation = self.parse_annotation()?;
            params.push(Param { name: Symbol::intern(p_tok.lexeme), annotation, span: p_tok.span });
            if self.cur().is_delim(",") {
                self.advance();
            } else {
                break;
            }
        }
        self.expect_delim(")")?;
        let returns = if self.cur().is_operator("->") {
            self.advance();
            let t = self.expect_identifier()?;
            Some(TypeAnnotation { name: Symbol::intern(t.lexeme), span: t.span })
        } else {
            None
        };
        self.expect_delim(":")?;
        let body = self.parse_block(kw.indent)?;
        let span = kw.span.merge(name_tok.span);
        Ok(Stmt::FunctionDef(FunctionDef { name: Symbol::intern(name_tok.lexeme), params, returns, body, span, indent: kw.indent }))
    }

    fn parse_class_def(&mut self) -> ParseResult<Stmt> {
        let kw = self.advance();
        let name_tok = self.expect_identifier()?;
        let mut bases = Vec::new();
        if self.cur().is_delim("(") {
            self.advance();
            while !self.cur().is_delim(")") {
                let b = self.expect_identifier()?;
                bases.push(Symbol::intern(b.lexeme));
                if self.cur().is_delim(",") {
                    self.advance();
                } else {
                    break;
                }
            }
            self.expect_delim(")")?;
        }
        self.expect_delim(":")?;
        let body = self.parse_block(kw.indent)?;
        let span = kw.span.merge(name_tok.span);
        Ok(Stmt::ClassDef(ClassDef { name: Symbol::intern(name_tok.lexeme), bases, body, span, indent: kw.indent }))
    }

    fn parse_return(&mut self) -> ParseResult<Stmt> {
        let kw = self.advance();
        let value = if self.cur().kind == TokenKind::Newline || self.at_end() {
            None
        } else {
            Some(self.parse_expr_run()?)
        };
        let span = value.as_ref().map(|v| kw.span.merge(v.span())).unwrap_or(kw.span);
        Ok(Stmt::Return(Return { value, span, indent: kw.indent }))
    }
}

/// Top-level entry point: tokens in, module AST out. Aborts on the first
/// unexpected token (spec §4.2: no error recovery).
pub fn parse_module(tokens: Vec<Token<'_>>) -> ParseResult<Block> {
    Parser::new(tokens).parse_module()
}
