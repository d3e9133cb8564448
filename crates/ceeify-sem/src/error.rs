//! `SemError` (spec §7's taxonomy), rendered through `ceeify_util::Diagnostic`
//! the same way the teacher's `faxc_util::diagnostic` module does.

use ceeify_util::{Diagnostic, Span};
use thiserror::Error;

/// One flag on the analyzer state at a time (spec §7): the analyzer halts on
/// the first error it records.
#[derive(Debug, Error, Clone)]
pub enum SemError {
    #[error("name '{name}' is not defined")]
    NameError { name: String, span: Span },

    #[error("{detail}")]
    TypeError { detail: String, span: Span },

    #[error("expected {expected} argument(s), got {found}")]
    ArityMismatch { expected: usize, found: usize, span: Span },

    #[error("'{name}' is already defined in this scope")]
    Redeclaration { name: String, span: Span },

    #[error("unreachable pattern: a previous case already matches everything")]
    UnreachablePattern { span: Span },

    #[error("unsupported feature: {detail}")]
    UnsupportedFeature { detail: String, span: Span },

    #[error("invalid operation: {detail}")]
    InvalidOperation { detail: String, span: Span },

    #[error("internal error: {detail}")]
    Internal { detail: String, span: Span },
}

impl SemError {
    pub fn span(&self) -> Span {
        match self {
            SemError::NameError { span, .. }
            | SemError::TypeError { span, .. }
            | SemError::ArityMismatch { span, .. }
            | SemError::Redeclaration { span, .. }
            | SemError::UnreachablePattern { span, .. }
            | SemError::UnsupportedFeature { span, .. }
            | SemError::InvalidOperation { span, .. }
            | SemError::Internal { span, .. } => *span,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SemError::NameError { .. } => "NameError",
            SemError::TypeError { .. } => "TypeError",
            SemError::ArityMismatch { .. } => "ArityMismatch",
            SemError::Redeclaration { .. } => "Redeclaration",
            SemError::UnreachablePattern { .. } => "UnreachablePattern",
            SemError::UnsupportedFeature { .. } => "UnsupportedFeature",
            SemError::InvalidOperation { .. } => "InvalidOperation",
            SemError::Internal { .. } => "Internal",
        }
    }

    /// The traceback-style rendering spec §4.3/§7 describes (file, line,
    /// source excerpt, caret, kind, detail) — delegated to
    /// `ceeify_util::Diagnostic`, which already implements exactly that.
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(self.kind(), self.to_string(), self.span())
    }
}

pub type SemResult<T> = Result<T, SemError>;
