//! Source location tracking.
//!
//! Every [`Token`](crate) and AST node carries a [`Span`] back to the
//! originating source text so diagnostics can render a traceback-style
//! excerpt (spec §7: file, line, source excerpt, caret under the column).

/// A location in source text.
///
/// `line` and `column` are 1-indexed and reflect the raw source byte
/// offset, not a post-indentation offset (spec §3 invariant 5).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const DUMMY: Span = Span { start: 0, end: 0, line: 0, column: 0 };

    pub const fn new(start: usize, end: usize, line: u32, column: u32) -> Self {
        Self { start, end, line, column }
    }

    pub const fn point(line: u32, column: u32) -> Self {
        Self { start: 0, end: 0, line, column }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: self.line,
            column: self.column,
        }
    }
}
