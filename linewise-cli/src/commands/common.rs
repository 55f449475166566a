//! Arguments shared by the line-reading commands

use crate::config::CliConfig;
use crate::error::CliError;
use anyhow::{Context, Result};
use clap::Args;
use linewise_core::ReaderConfig;
use std::path::PathBuf;

/// Reader settings; flags override the config file
#[derive(Debug, Args, Default)]
pub struct ReaderArgs {
    /// Literal separator (escapes: \n \r \t \0 \\)
    #[arg(short, long, value_name = "TEXT", conflicts_with = "pattern")]
    pub separator: Option<String>,

    /// Regular-expression separator
    #[arg(short, long, value_name = "REGEX")]
    pub pattern: Option<String>,

    /// Input encoding label (utf-8, latin1, utf-16le, ...)
    #[arg(short, long, value_name = "LABEL")]
    pub encoding: Option<String>,

    /// Chunk size in bytes
    #[arg(short, long, value_name = "BYTES")]
    pub buffer_size: Option<usize>,

    /// Configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl ReaderArgs {
    /// Load the config file, if any
    pub fn load_config(&self) -> Result<CliConfig> {
        CliConfig::load_or_default(self.config.as_deref())
    }

    /// Merge flags over `file` into a reader configuration
    pub fn reader_config(&self, file: &CliConfig) -> Result<ReaderConfig> {
        let mut builder = ReaderConfig::builder()
            .encoding(self.encoding.as_deref().unwrap_or(&file.reader.encoding))
            .buffer_size(self.buffer_size.unwrap_or(file.reader.buffer_size));

        // a separator flag replaces a pattern from the file and vice versa
        let (separator, pattern) = if self.separator.is_some() || self.pattern.is_some() {
            (self.separator.as_deref(), self.pattern.as_deref())
        } else {
            (
                file.reader.separator.as_deref(),
                file.reader.pattern.as_deref(),
            )
        };
        if let Some(separator) = separator {
            builder = builder.separator(unescape(separator)?);
        } else if let Some(pattern) = pattern {
            builder = builder.pattern(pattern);
        }

        let config = builder.build().context("Invalid reader settings")?;
        log::debug!(
            "reader: separator={:?} encoding={} buffer_size={}",
            config.separator.as_ref().map(ToString::to_string),
            config.encoding.name(),
            config.buffer_size
        );
        Ok(config)
    }
}

/// Logging flags
#[derive(Debug, Args, Default)]
pub struct LogArgs {
    /// Suppress progress output and logging
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl LogArgs {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        let log_level = match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };

        if !self.quiet {
            let _ = env_logger::Builder::from_env(
                env_logger::Env::default().default_filter_or(log_level),
            )
            .try_init();
        }
    }
}

/// Resolve backslash escapes in a separator given on the command line
pub fn unescape(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some(other) => return Err(CliError::InvalidEscape(format!("\\{other}")).into()),
            None => return Err(CliError::InvalidEscape("\\".to_string()).into()),
        }
    }
    Ok(out)
}
