//! Plain text output formatter

use super::OutputFormatter;
use anyhow::Result;
use std::io::{self, Write};
use std::path::Path;

/// Plain text formatter - outputs one line per line
pub struct TextFormatter<W: Write> {
    writer: W,
    show_last: bool,
    headers: bool,
    files_started: usize,
}

impl<W: Write> TextFormatter<W> {
    /// Create a new text formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            show_last: false,
            headers: false,
            files_started: 0,
        }
    }

    /// Prefix the final line of each file with `[last] `
    pub fn show_last(mut self, enabled: bool) -> Self {
        self.show_last = enabled;
        self
    }

    /// Print a `==> path <==` header before each file
    pub fn headers(mut self, enabled: bool) -> Self {
        self.headers = enabled;
        self
    }

    /// Consume the formatter, returning the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl TextFormatter<io::Stdout> {
    /// Create a formatter that writes to stdout
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send + Sync> OutputFormatter for TextFormatter<W> {
    fn begin_file(&mut self, path: &Path) -> Result<()> {
        if self.headers {
            if self.files_started > 0 {
                writeln!(self.writer)?;
            }
            writeln!(self.writer, "==> {} <==", path.display())?;
        }
        self.files_started += 1;
        Ok(())
    }

    fn format_line(&mut self, line: &str, _number: u64, last: bool) -> Result<()> {
        if self.show_last && last {
            write!(self.writer, "[last] ")?;
        }
        writeln!(self.writer, "{line}")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(formatter: TextFormatter<Vec<u8>>) -> String {
        String::from_utf8(formatter.into_inner()).unwrap()
    }

    #[test]
    fn test_lines_written_verbatim() {
        let mut formatter = TextFormatter::new(Vec::new());
        formatter.begin_file(Path::new("a.txt")).unwrap();
        formatter.format_line("  padded ", 1, false).unwrap();
        formatter.format_line("", 2, true).unwrap();
        formatter.finish().unwrap();
        assert_eq!(render(formatter), "  padded \n\n");
    }

    #[test]
    fn test_show_last_marks_final_line() {
        let mut formatter = TextFormatter::new(Vec::new()).show_last(true);
        formatter.format_line("a", 1, false).unwrap();
        formatter.format_line("b", 2, true).unwrap();
        assert_eq!(render(formatter), "a\n[last] b\n");
    }

    #[test]
    fn test_headers_between_files() {
        let mut formatter = TextFormatter::new(Vec::new()).headers(true);
        formatter.begin_file(Path::new("one.txt")).unwrap();
        formatter.format_line("1", 1, true).unwrap();
        formatter.begin_file(Path::new("two.txt")).unwrap();
        formatter.format_line("2", 1, true).unwrap();
        assert_eq!(render(formatter), "==> one.txt <==\n1\n\n==> two.txt <==\n2\n");
    }
}
