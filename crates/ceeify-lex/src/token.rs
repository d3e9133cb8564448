//! Token kinds and the 35-word reserved table (spec §3, §4.1).

use ceeify_util::Span;

/// The 35 reserved words recognized by [`keyword_or_ident`]. Order matches
/// the source language's own table so diagnostics referencing "the Nth
/// keyword" stay meaningful if anyone ever needs that (nobody currently
/// does; this is just the grounding artifact for the table itself).
pub const KEYWORDS: [&str; 35] = [
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

/// Extended multi-character operators, tried longest-match-first (spec
/// §4.1 recognition precedence step 3). Ordered longest-to-shortest so a
/// linear scan without re-sorting always yields the longest match.
pub const EXTENDED_OPERATORS: [&str; 18] = [
    "//=", "**=", "//", "==", "!=", "**", ">=", "<=", "&&", "||", "+=", "-=", "*=", "/=", "%=",
    "<<", ">>", "->",
];

fn keyword_or_ident(lexeme: &str) -> TokenKind {
    if KEYWORDS.contains(&lexeme) {
        TokenKind::Keyword
    } else {
        TokenKind::Identifier
    }
}

pub(crate) fn classify_word(lexeme: &str) -> TokenKind {
    keyword_or_ident(lexeme)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Operator,
    Keyword,
    /// One of `( ) , :`
    Delimiter,
    Lsqb,
    Rsqb,
    Newline,
    Endmarker,
}

/// A lexical token: kind, source slice, and 1-indexed position plus the
/// logical indent level of the line it starts on (spec §3).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub lexeme: &'src str,
    pub line: u32,
    pub col: u32,
    pub indent: u32,
    pub span: Span,
}

impl<'src> Token<'src> {
    pub fn is_delim(&self, lexeme: &str) -> bool {
        self.kind == TokenKind::Delimiter && self.lexeme == lexeme
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == TokenKind::Keyword && self.lexeme == word
    }

    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == TokenKind::Operator && self.lexeme == op
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_table_has_35_entries() {
        assert_eq!(KEYWORDS.len(), 35);
    }

    #[test]
    fn classify_recognizes_keywords_and_identifiers() {
        assert_eq!(classify_word("if"), TokenKind::Keyword);
        assert_eq!(classify_word("foo"), TokenKind::Identifier);
    }
}
