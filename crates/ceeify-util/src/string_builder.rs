//! Growable text buffer for the source emitter (spec §6: "String builder
//! (consumed)" — append formatted text, grow geometrically, expose the raw
//! buffer and its length).

/// A geometrically-growing string buffer.
///
/// `ceeify-emit` writes target-language source into one `StringBuilder` for
/// the whole compilation unit; `String`'s own amortized-doubling growth
/// already gives us the geometric growth spec §6 asks for, so this is a thin
/// wrapper that gives the emitter a stable, documented interface (and a seam
/// to swap in a different growth policy later without touching call sites).
#[derive(Debug, Default, Clone)]
pub struct StringBuilder {
    buf: String,
    indent_unit: usize,
}

impl StringBuilder {
    pub fn new() -> Self {
        Self { buf: String::new(), indent_unit: 1 }
    }

    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: String::with_capacity(cap), indent_unit: 1 }
    }

    /// Appends raw text verbatim.
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(text);
        self
    }

    pub fn append_char(&mut self, c: char) -> &mut Self {
        self.buf.push(c);
        self
    }

    /// Appends already-formatted text followed by a newline.
    pub fn append_line(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(text);
        self.buf.push('\n');
        self
    }

    /// Appends `level * indent_unit` spaces (spec §4.5: "Indentation of the
    /// emitted code uses the source's `indent` level, times one space").
    pub fn append_indent(&mut self, level: usize) -> &mut Self {
        for _ in 0..level * self.indent_unit {
            self.buf.push(' ');
        }
        self
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    pub fn into_string(self) -> String {
        self.buf
    }
}

impl std::fmt::Write for StringBuilder {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_concatenates() {
        let mut sb = StringBuilder::new();
        sb.append("int x").append(" = ").append("42;");
        assert_eq!(sb.as_str(), "int x = 42;");
    }

    #[test]
    fn indent_emits_one_space_per_level() {
        let mut sb = StringBuilder::new();
        sb.append_indent(3).append("y = 1;");
        assert_eq!(sb.as_str(), "   y = 1;");
    }
}
