//! Output formatting module

use anyhow::Result;
use std::path::Path;

/// Trait for output formatters
pub trait OutputFormatter: Send + Sync {
    /// Start the lines of a new input file
    fn begin_file(&mut self, path: &Path) -> Result<()>;

    /// Format and output a single line; `number` starts at 1
    fn format_line(&mut self, line: &str, number: u64, last: bool) -> Result<()>;

    /// Finalize output (e.g., close JSON array)
    fn finish(&mut self) -> Result<()>;
}

pub mod json;
pub mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;
