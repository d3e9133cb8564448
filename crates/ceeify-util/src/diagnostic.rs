//! Diagnostics: the traceback-style error rendering every stage's error
//! surface converges on (spec §4.3, §7: "file, line, source excerpt, caret
//! column pointer, kind, detail").

use crate::span::Span;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
            Level::Note => write!(f, "note"),
        }
    }
}

/// One diagnosed problem.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub level: Level,
    /// Short machine-readable kind, e.g. `"NameError"`, `"TypeError"` (spec
    /// §7's taxonomy) — kept distinct from `message` so callers can match on
    /// it without parsing free text.
    pub kind: &'static str,
    pub message: String,
    pub span: Span,
}

impl Diagnostic {
    pub fn new(level: Level, kind: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self { level, kind, message: message.into(), span }
    }

    pub fn error(kind: &'static str, message: impl Into<String>, span: Span) -> Self {
        Self::new(Level::Error, kind, message, span)
    }

    /// Renders the multi-line traceback: filename:line, the source line
    /// itself, and a caret under the offending column.
    pub fn render(&self, filename: &str, source: &str) -> String {
        let line_text = source.lines().nth(self.span.line.saturating_sub(1) as usize).unwrap_or("");
        let caret_pad = " ".repeat(self.span.column.saturating_sub(1) as usize);
        format!(
            "{file}:{line}:{col}: {level}[{kind}]: {message}\n  {line_text}\n  {pad}^",
            file = filename,
            line = self.span.line,
            col = self.span.column,
            level = self.level,
            kind = self.kind,
            message = self.message,
            line_text = line_text,
            pad = caret_pad,
        )
    }
}

/// Collects diagnostics for one compilation unit.
///
/// Per spec §4.3/§7, every stage halts on its *first* error — `Handler`
/// still accumulates warnings/notes freely, but `report_error` is meant to
/// be called at most once per stage before that stage bails out.
#[derive(Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    pub fn new() -> Self {
        Self { diagnostics: Vec::new() }
    }

    pub fn report(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    pub fn error(&mut self, kind: &'static str, message: impl Into<String>, span: Span) {
        self.report(Diagnostic::error(kind, message, span));
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }

    pub fn first_error(&self) -> Option<&Diagnostic> {
        self.diagnostics.iter().find(|d| d.level == Level::Error)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn render_all(&self, filename: &str, source: &str) -> String {
        self.diagnostics.iter().map(|d| d.render(filename, source)).collect::<Vec<_>>().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_points_caret_at_column() {
        let diag = Diagnostic::error("NameError", "name 'x' is not defined", Span::new(4, 5, 1, 5));
        let rendered = diag.render("in.src", "z = x + 1");
        assert!(rendered.contains("name 'x' is not defined"));
        let caret_line = rendered.lines().last().unwrap();
        assert_eq!(caret_line.trim_start().len(), caret_line.len() - 2);
    }

    #[test]
    fn handler_tracks_error_presence() {
        let mut handler = Handler::new();
        assert!(!handler.has_errors());
        handler.error("Internal", "boom", Span::DUMMY);
        assert!(handler.has_errors());
    }
}
