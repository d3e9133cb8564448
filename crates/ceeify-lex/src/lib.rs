//! The indentation-aware lexer (spec §4.1): source text in, an append-only
//! token buffer out. Scanning is a single forward pass with one character of
//! lookahead; no token is ever mutated after it is pushed.

mod cursor;
mod token;

pub use token::{Token, TokenKind, EXTENDED_OPERATORS, KEYWORDS};

use ceeify_util::{Handler, Span};
use cursor::Cursor;

const SINGLE_CHAR_OPERATORS: [char; 14] =
    ['+', '-', '*', '/', '%', '>', '<', '!', '=', '&', '|', '^', '~', '.'];

/// Tokenizes `source`, returning the append-only token buffer. Malformed
/// strings and unclosed comments are diagnosed through `handler` rather than
/// left to run off the end of the buffer (SPEC_FULL.md Open Question 1):
/// indexing past the end of a Rust `&str` would panic, so "walk off the end
/// silently" is not a memory-safe option here, and diagnosing is the
/// nearest-possible behavior to the original's documented "undefined".
pub fn tokenize<'src>(source: &'src str, handler: &mut Handler) -> Vec<Token<'src>> {
    Lexer::new(source).run(handler)
}

struct Lexer<'src> {
    cursor: Cursor<'src>,
    indent: u32,
    at_line_start: bool,
}

impl<'src> Lexer<'src> {
    fn new(source: &'src str) -> Self {
        Self { cursor: Cursor::new(source), indent: 0, at_line_start: true }
    }

    fn run(mut self, handler: &mut Handler) -> Vec<Token<'src>> {
        let mut tokens = Vec::new();

        loop {
            if self.at_line_start {
                self.consume_leading_indent();
                self.at_line_start = false;
            }

            self.skip_spaces_and_comments();

            if self.cursor.is_at_end() {
                break;
            }

            let start = self.cursor.position();
            let line = self.cursor.line();
            let col = self.cursor.column();
            let c = self.cursor.current();

            let kind = match c {
                '(' | ')' | ',' | ':' => {
                    self.cursor.advance();
                    TokenKind::Delimiter
                }
                '[' => {
                    self.cursor.advance();
                    TokenKind::Lsqb
                }
                ']' => {
                    self.cursor.advance();
                    TokenKind::Rsqb
                }
                '\n' => {
                    self.cursor.advance();
                    self.at_line_start = true;
                    TokenKind::Newline
                }
                '\'' | '"' => self.scan_string(handler),
                c if c.is_ascii_digit() => self.scan_number(),
                c if c.is_alphabetic() || c == '_' => self.scan_word(),
                c if SINGLE_CHAR_OPERATORS.contains(&c) => self.scan_operator(),
                other => {
                    handler.error(
                        "UnsupportedFeature",
                        format!("unrecognized character '{other}'"),
                        Span::point(line, col),
                    );
                    self.cursor.advance();
                    continue;
                }
            };

            let end = self.cursor.position();
            let lexeme = self.cursor.slice(start, end);
            let kind = if kind == TokenKind::Identifier { reclassify_word(lexeme) } else { kind };
            tokens.push(Token {
                kind,
                lexeme,
                line,
                col,
                indent: self.indent,
                span: Span::new(start, end, line, col),
            });
        }

        let (line, col) = (self.cursor.line(), self.cursor.column());
        tokens.push(Token {
            kind: TokenKind::Endmarker,
            lexeme: "EOF",
            line,
            col,
            indent: 0,
            span: Span::point(line, col),
        });
        tokens
    }

    /// Counts leading spaces (tab = 4 columns) and sets the indent level for
    /// every token scanned until the next NEWLINE (spec §4.1: "Indent is
    /// attached to every token on that line").
    fn consume_leading_indent(&mut self) {
        let mut columns = 0u32;
        loop {
            match self.cursor.current() {
                ' ' => {
                    columns += 1;
                    self.cursor.advance();
                }
                '\t' => {
                    columns += 4;
                    self.cursor.advance();
                }
                _ => break,
            }
        }
        self.indent = columns / 4;
    }

    fn skip_spaces_and_comments(&mut self) {
        loop {
            match self.cursor.current() {
                ' ' | '\t' => {
                    self.cursor.advance();
                }
                '#' => {
                    while !self.cursor.is_at_end() && self.cursor.current() != '\n' {
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Consumes an identifier-shaped run of characters. The caller
    /// reclassifies the result as `Keyword` against the reserved-word table
    /// once the full lexeme is known.
    fn scan_word(&mut self) -> TokenKind {
        self.cursor.advance();
        while self.cursor.current().is_alphanumeric() || self.cursor.current() == '_' {
            self.cursor.advance();
        }
        TokenKind::Identifier
    }

    fn scan_number(&mut self) -> TokenKind {
        self.cursor.advance();
        let mut seen_dot = false;
        loop {
            match self.cursor.current() {
                c if c.is_ascii_digit() || c == '_' => {
                    self.cursor.advance();
                }
                '.' if !seen_dot => {
                    seen_dot = true;
                    self.cursor.advance();
                }
                _ => break,
            }
        }
        TokenKind::Number
    }

    fn scan_string(&mut self, handler: &mut Handler) -> TokenKind {
        let quote = self.cursor.current();
        let (line, col) = (self.cursor.line(), self.cursor.column());
        self.cursor.advance(); // opening quote
        while !self.cursor.is_at_end() && self.cursor.current() != quote {
            self.cursor.advance();
        }
        if self.cursor.is_at_end() {
            handler.error(
                "UnsupportedFeature",
                "unterminated string literal",
                Span::point(line, col),
            );
        } else {
            self.cursor.advance(); // closing quote
        }
        TokenKind::String
    }

    fn scan_operator(&mut self) -> TokenKind {
        let remaining_is = |op: &str, cur: &Cursor| -> bool {
            op.chars().enumerate().all(|(i, ch)| cur.peek(i) == ch)
        };
        if let Some(op) = EXTENDED_OPERATORS.iter().find(|op| remaining_is(op, &self.cursor)) {
            for _ in 0..op.chars().count() {
                self.cursor.advance();
            }
        } else {
            self.cursor.advance();
        }
        TokenKind::Operator
    }
}

/// Strings and keywords get their final `TokenKind` only once the lexeme is
/// fully known; `scan_word` above returns a placeholder and `run` fixes it
/// up here so the slicing logic stays in one place.
fn reclassify_word(lexeme: &str) -> TokenKind {
    token::classify_word(lexeme)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ceeify_util::Handler;
    use proptest::prelude::*;

    fn lex(src: &str) -> Vec<Token<'_>> {
        let mut handler = Handler::new();
        let toks = tokenize(src, &mut handler);
        assert!(!handler.has_errors(), "unexpected lex errors: {:?}", handler.diagnostics());
        toks
    }

    #[test]
    fn e1_literal_assignment() {
        let toks = lex("x = 42");
        let kinds: Vec<_> = toks.iter().map(|t| (t.kind, t.lexeme)).collect();
        assert_eq!(
            kinds,
            vec![
                (TokenKind::Identifier, "x"),
                (TokenKind::Operator, "="),
                (TokenKind::Number, "42"),
                (TokenKind::Endmarker, "EOF"),
            ]
        );
    }

    #[test]
    fn keyword_promoted_from_identifier() {
        let toks = lex("if x:");
        assert_eq!(toks[0].kind, TokenKind::Keyword);
        assert_eq!(toks[0].lexeme, "if");
    }

    #[test]
    fn longest_operator_match_wins() {
        let toks = lex("x //= 2");
        assert_eq!(toks[1].lexeme, "//=");
    }

    #[test]
    fn indent_attached_to_every_token_on_line() {
        let toks = lex("if x:\n    y = 1\n");
        let body: Vec<_> = toks.iter().filter(|t| t.line == 2 && t.kind != TokenKind::Newline).collect();
        assert!(body.iter().all(|t| t.indent == 1));
    }

    #[test]
    fn comment_emits_no_token() {
        let toks = lex("x = 1 # comment\ny = 2");
        assert!(toks.iter().all(|t| t.lexeme != "#" && !t.lexeme.contains("comment")));
    }

    #[test]
    fn unterminated_string_is_diagnosed() {
        let mut handler = Handler::new();
        let _ = tokenize("x = \"abc", &mut handler);
        assert!(handler.has_errors());
    }

    #[test]
    fn endmarker_lexeme_is_eof() {
        let toks = lex("");
        assert_eq!(toks.last().unwrap().lexeme, "EOF");
        assert_eq!(toks.last().unwrap().kind, TokenKind::Endmarker);
    }

    proptest::proptest! {
        #[test]
        fn tokenize_is_deterministic(s in "[a-zA-Z0-9_ \\n:=+\\-]{0,80}") {
            let mut h1 = Handler::new();
            let mut h2 = Handler::new();
            let a = tokenize(&s, &mut h1);
            let b = tokenize(&s, &mut h2);
            prop_assert_eq!(a.len(), b.len());
            for (x, y) in a.iter().zip(b.iter()) {
                prop_assert_eq!(x.kind, y.kind);
                prop_assert_eq!(x.lexeme, y.lexeme);
            }
        }

        #[test]
        fn indent_is_monotonic_per_statement_line(s in "[a-z]{1,4}( = [0-9]{1,3})?") {
            let mut handler = Handler::new();
            let toks = tokenize(&s, &mut handler);
            for line in 1..=toks.iter().map(|t| t.line).max().unwrap_or(1) {
                let on_line: Vec<_> = toks.iter().filter(|t| t.line == line && t.kind != TokenKind::Newline).collect();
                if let Some(first) = on_line.first() {
                    prop_assert!(on_line.iter().all(|t| t.indent == first.indent));
                }
            }
        }
    }
}
