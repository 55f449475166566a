//! JSON output formatter

use super::OutputFormatter;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

/// JSON formatter - outputs lines as a JSON array
pub struct JsonFormatter<W: Write> {
    writer: W,
    pretty: bool,
    current_file: String,
    lines: Vec<LineData>,
}

/// Data structure for JSON output
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LineData {
    /// File the line was read from
    pub file: String,
    /// 1-based line number within the file
    pub number: u64,
    /// The line text, without separator
    pub text: String,
    /// Whether this is the final line of the file
    pub last: bool,
}

impl<W: Write> JsonFormatter<W> {
    /// Create a new JSON formatter
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            pretty: true,
            current_file: String::new(),
            lines: Vec::new(),
        }
    }

    /// Choose between pretty and compact output
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Consume the formatter, returning the writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send + Sync> OutputFormatter for JsonFormatter<W> {
    fn begin_file(&mut self, path: &Path) -> Result<()> {
        self.current_file = path.display().to_string();
        Ok(())
    }

    fn format_line(&mut self, line: &str, number: u64, last: bool) -> Result<()> {
        self.lines.push(LineData {
            file: self.current_file.clone(),
            number,
            text: line.to_string(),
            last,
        });
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, &self.lines)?;
        } else {
            serde_json::to_writer(&mut self.writer, &self.lines)?;
        }
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
