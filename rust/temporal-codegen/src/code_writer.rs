//! Line-oriented writer with indentation tracking for Go source.
//!
//! Indentation is held in an `Rc<Cell<usize>>` so an [`IndentGuard`] never
//! borrows the writer, and writes can continue while the guard is alive.
//!
//! # Example
//!
//! ```
//! use temporal_codegen::code_writer::CodeWriter;
//! use temporal_codegen::cw_writeln;
//!
//! let mut w = CodeWriter::go(String::new());
//! w.block("func Answer() int", |w| cw_writeln!(w, "return {}", 42))
//!     .unwrap();
//! assert_eq!(w.into_inner(), "func Answer() int {\n\treturn 42\n}\n");
//! ```

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// A code writer that tracks indentation and knows Go's block forms.
pub struct CodeWriter<W> {
    writer: W,
    indent_level: Rc<Cell<usize>>,
    indent_string: String,
    at_line_start: bool,
}

impl<W: fmt::Write> CodeWriter<W> {
    /// Create a new CodeWriter with the given writer and indent string.
    pub fn new(writer: W, indent_string: impl Into<String>) -> Self {
        Self {
            writer,
            indent_level: Rc::new(Cell::new(0)),
            indent_string: indent_string.into(),
            at_line_start: true,
        }
    }

    /// Create a CodeWriter indenting with tabs, as gofmt does.
    pub fn go(writer: W) -> Self {
        Self::new(writer, "\t")
    }

    /// Write text without a newline. Adds indentation if at line start.
    pub fn write(&mut self, text: &str) -> fmt::Result {
        if text.is_empty() {
            return Ok(());
        }

        if self.at_line_start && !text.trim().is_empty() {
            for _ in 0..self.indent_level.get() {
                self.writer.write_str(&self.indent_string)?;
            }
            self.at_line_start = false;
        }

        self.writer.write_str(text)
    }

    /// Write text followed by a newline.
    pub fn writeln(&mut self, text: &str) -> fmt::Result {
        self.write(text)?;
        self.writer.write_char('\n')?;
        self.at_line_start = true;
        Ok(())
    }

    pub fn blank_line(&mut self) -> fmt::Result {
        self.writer.write_char('\n')?;
        self.at_line_start = true;
        Ok(())
    }

    /// Create an indentation guard. Indentation increases while the guard is alive.
    pub fn indent(&mut self) -> IndentGuard {
        self.indent_level.set(self.indent_level.get() + 1);
        IndentGuard {
            indent_level: Rc::clone(&self.indent_level),
        }
    }

    /// Write a `//` comment block, one line per line of `text`.
    ///
    /// Empty lines become a bare `//` so no trailing whitespace is emitted.
    pub fn comment(&mut self, text: &str) -> fmt::Result {
        for line in text.lines() {
            if line.trim().is_empty() {
                self.writeln("//")?;
            } else {
                self.writeln(&format!("// {line}"))?;
            }
        }
        Ok(())
    }

    /// Write `header {`, the body one level deeper, then `}`.
    pub fn block<F>(&mut self, header: &str, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.delimited(header, '{', '}', body)
    }

    /// Write `header (`, the body one level deeper, then `)`.
    ///
    /// Used for grouped `const`, `var` and `import` declarations.
    pub fn group<F>(&mut self, header: &str, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        self.delimited(header, '(', ')', body)
    }

    fn delimited<F>(&mut self, header: &str, open: char, close: char, body: F) -> fmt::Result
    where
        F: FnOnce(&mut Self) -> fmt::Result,
    {
        if header.is_empty() {
            self.writeln(&open.to_string())?;
        } else {
            self.writeln(&format!("{header} {open}"))?;
        }
        {
            let _indent = self.indent();
            body(self)?;
        }
        self.writeln(&close.to_string())
    }

    /// Write items separated by a delimiter (e.g., a parameter list).
    pub fn write_separated<I, F>(
        &mut self,
        items: I,
        separator: &str,
        mut write_item: F,
    ) -> fmt::Result
    where
        I: IntoIterator,
        F: FnMut(&mut Self, I::Item) -> fmt::Result,
    {
        let mut first = true;
        for item in items {
            if !first {
                self.write(separator)?;
            }
            write_item(self, item)?;
            first = false;
        }
        Ok(())
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level.get()
    }

    /// Consume the writer and return the inner writer
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Use the `cw_write!` macro instead of calling this directly.
    #[doc(hidden)]
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        match args.as_str() {
            Some(text) => self.write(text),
            None => self.write(&args.to_string()),
        }
    }

    /// Use the `cw_writeln!` macro instead of calling this directly.
    #[doc(hidden)]
    pub fn writeln_fmt(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        match args.as_str() {
            Some(text) => self.writeln(text),
            None => self.writeln(&args.to_string()),
        }
    }
}

/// RAII guard that maintains indentation level
pub struct IndentGuard {
    indent_level: Rc<Cell<usize>>,
}

impl Drop for IndentGuard {
    fn drop(&mut self) {
        let current = self.indent_level.get();
        self.indent_level.set(current.saturating_sub(1));
    }
}

/// Write formatted text to a CodeWriter (like std::write!)
#[macro_export]
macro_rules! cw_write {
    ($writer:expr, $($arg:tt)*) => {
        $writer.write_fmt(format_args!($($arg)*))
    };
}

/// Write formatted text with newline to a CodeWriter (like std::writeln!)
#[macro_export]
macro_rules! cw_writeln {
    ($writer:expr, $($arg:tt)*) => {
        $writer.writeln_fmt(format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indentation_uses_tabs() {
        let mut w = CodeWriter::go(String::new());

        w.writeln("level 0").unwrap();
        {
            let _indent = w.indent();
            w.writeln("level 1").unwrap();
            {
                let _indent = w.indent();
                w.writeln("level 2").unwrap();
            }
            w.writeln("level 1 again").unwrap();
        }
        w.writeln("level 0 again").unwrap();

        assert_eq!(
            w.into_inner(),
            "level 0\n\tlevel 1\n\t\tlevel 2\n\tlevel 1 again\nlevel 0 again\n"
        );
    }

    #[test]
    fn test_block_and_group() {
        let mut w = CodeWriter::go(String::new());

        w.group("const", |w| w.writeln("A = \"a\"")).unwrap();
        w.block("func F()", |w| {
            w.block("if ok", |w| w.writeln("return"))
        })
        .unwrap();

        assert_eq!(
            w.into_inner(),
            "const (\n\tA = \"a\"\n)\nfunc F() {\n\tif ok {\n\t\treturn\n\t}\n}\n"
        );
    }

    #[test]
    fn test_blank_lines_are_not_indented() {
        let mut w = CodeWriter::go(String::new());

        w.block("type T struct", |w| {
            w.writeln("A int")?;
            w.blank_line()?;
            w.writeln("B int")
        })
        .unwrap();

        assert_eq!(w.into_inner(), "type T struct {\n\tA int\n\n\tB int\n}\n");
    }

    #[test]
    fn test_comment_lines() {
        let mut w = CodeWriter::go(String::new());
        {
            let _indent = w.indent();
            w.comment("Transfer moves funds\n\nbetween accounts").unwrap();
        }

        assert_eq!(
            w.into_inner(),
            "\t// Transfer moves funds\n\t//\n\t// between accounts\n"
        );
    }

    #[test]
    fn test_write_separated() {
        let mut w = CodeWriter::go(String::new());

        w.write("f(").unwrap();
        w.write_separated(["ctx", "req", "opts..."], ", ", |w, item| w.write(item))
            .unwrap();
        w.write(")").unwrap();

        assert_eq!(w.into_inner(), "f(ctx, req, opts...)");
    }

    #[test]
    fn test_macros() {
        let mut w = CodeWriter::go(String::new());

        let name = "ExampleTransferWorkflowName";
        cw_write!(w, "{} = ", name).unwrap();
        cw_writeln!(w, "{:?}", "example.v1.Example.Transfer").unwrap();

        assert_eq!(
            w.into_inner(),
            "ExampleTransferWorkflowName = \"example.v1.Example.Transfer\"\n"
        );
    }

    #[test]
    fn test_guard_drop_restores_level() {
        let mut w = CodeWriter::go(String::new());
        let guard = w.indent();
        assert_eq!(w.indent_level(), 1);
        drop(guard);
        assert_eq!(w.indent_level(), 0);
    }
}
