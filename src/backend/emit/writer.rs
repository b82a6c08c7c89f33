//! Output writer with indentation tracking
//!
//! Every emission component appends to one [`SourceWriter`] owned by the pass context.

/// Writer that tracks indentation and builds the generated source
#[derive(Debug, Clone)]
pub struct SourceWriter {
    /// The output buffer
    output: String,
    /// Current indentation level
    indent_level: usize,
    /// Number of spaces per indentation level
    indent_width: usize,
    /// Whether we're at the start of a line
    at_line_start: bool,
}

impl SourceWriter {
    /// Create a new writer with the given indentation width
    pub fn new(indent_width: usize) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_width,
            at_line_start: true,
        }
    }

    /// Get the generated output
    pub fn finish(self) -> String {
        self.output
    }

    /// Get the output written so far
    pub fn as_str(&self) -> &str {
        &self.output
    }

    /// Increase indentation level
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indentation level
    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    /// Write indentation if at line start
    fn write_indent(&mut self) {
        if self.at_line_start {
            let indent = " ".repeat(self.indent_level * self.indent_width);
            self.output.push_str(&indent);
            self.at_line_start = false;
        }
    }

    /// Write a string (with auto-indent)
    pub fn write(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.write_indent();
        self.output.push_str(s);
    }

    /// Write a string and newline
    pub fn writeln(&mut self, s: &str) {
        self.write(s);
        self.newline();
    }

    /// Write just a newline
    pub fn newline(&mut self) {
        self.output.push('\n');
        self.at_line_start = true;
    }

    /// Open an Allman-style `{` block and indent
    pub fn open_block(&mut self) {
        if !self.at_line_start {
            self.newline();
        }
        self.writeln("{");
        self.indent();
    }

    /// Dedent and close a block with `suffix` after the brace (`""` or `";"`)
    pub fn close_block(&mut self, suffix: &str) {
        self.dedent();
        self.write("}");
        self.writeln(suffix);
    }

    /// Get current indentation level
    pub fn current_indent(&self) -> usize {
        self.indent_level
    }

    /// Get the indentation width
    pub fn indent_width(&self) -> usize {
        self.indent_width
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn default_writer() -> SourceWriter {
        SourceWriter::new(4)
    }

    // ========================================
    // Constructor and finish tests
    // ========================================

    #[test]
    fn test_new_writer_empty_output() {
        let writer = default_writer();
        assert_eq!(writer.finish(), "");
    }

    #[test]
    fn test_new_writer_at_indent_zero() {
        let writer = default_writer();
        assert_eq!(writer.current_indent(), 0);
        assert_eq!(writer.indent_width(), 4);
    }

    // ========================================
    // Write tests
    // ========================================

    #[test]
    fn test_write_empty_string() {
        let mut writer = default_writer();
        writer.write("");
        assert_eq!(writer.finish(), "");
    }

    #[test]
    fn test_write_multiple() {
        let mut writer = default_writer();
        writer.write("int");
        writer.write(" ");
        writer.write("x;");
        assert_eq!(writer.finish(), "int x;");
    }

    // ========================================
    // Indentation tests
    // ========================================

    #[test]
    fn test_indent_applies_at_line_start_only() {
        let mut writer = default_writer();
        writer.indent();
        writer.write("a");
        writer.write("b");
        writer.newline();
        writer.writeln("c");
        assert_eq!(writer.finish(), "    ab\n    c\n");
    }

    #[test]
    fn test_dedent_saturates_at_zero() {
        let mut writer = default_writer();
        writer.dedent();
        writer.writeln("x");
        assert_eq!(writer.current_indent(), 0);
        assert_eq!(writer.finish(), "x\n");
    }

    #[test]
    fn test_custom_indent_width() {
        let mut writer = SourceWriter::new(2);
        writer.indent();
        writer.indent();
        writer.writeln("x");
        assert_eq!(writer.finish(), "    x\n");
    }

    // ========================================
    // Block tests
    // ========================================

    #[test]
    fn test_blocks_use_allman_braces() {
        let mut writer = default_writer();
        writer.write("void f()");
        writer.open_block();
        writer.writeln("return;");
        writer.close_block("");
        assert_eq!(writer.finish(), "void f()\n{\n    return;\n}\n");
    }

    #[test]
    fn test_struct_block_suffix() {
        let mut writer = default_writer();
        writer.writeln("struct S");
        writer.open_block();
        writer.writeln("int x;");
        writer.close_block(";");
        assert_eq!(writer.finish(), "struct S\n{\n    int x;\n};\n");
    }
}
