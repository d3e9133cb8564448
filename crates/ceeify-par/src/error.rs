//! Parser error taxonomy (spec §4.2: the parser aborts on the first
//! unexpected token, no error recovery).

use ceeify_util::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unexpected token {found:?} at line {line}")]
    UnexpectedToken { found: String, line: u32, span: Span },

    #[error("expected {expected}, found {found:?} at line {line}")]
    Expected { expected: &'static str, found: String, line: u32, span: Span },

    #[error("empty expression at line {line}")]
    EmptyExpression { line: u32, span: Span },

    #[error("unbalanced '{opener}' at line {line}")]
    Unbalanced { opener: char, line: u32, span: Span },

    #[error("structural match patterns are not supported, found {found:?} at line {line}")]
    UnsupportedPattern { found: String, line: u32, span: Span },
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            ParseError::UnexpectedToken { span, .. } => *span,
            ParseError::Expected { span, .. } => *span,
            ParseError::EmptyExpression { span, .. } => *span,
            ParseError::Unbalanced { span, .. } => *span,
            ParseError::UnsupportedPattern { span, .. } => *span,
        }
    }
}

pub type ParseResult<T> = Result<T, ParseError>;
