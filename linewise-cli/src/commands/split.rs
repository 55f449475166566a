//! Split command implementation

use super::common::{LogArgs, ReaderArgs};
use crate::config::CliConfig;
use crate::input::resolve_patterns;
use crate::output::{JsonFormatter, OutputFormatter, TextFormatter};
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use linewise_core::{each_line_sync, each_line_with_continuation, ReaderConfig, Traversal};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

/// Arguments for the split command
#[derive(Debug, Args)]
pub struct SplitArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (default: from config, else text)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Stop after this many lines of each file
    #[arg(short = 'n', long, value_name = "LINES")]
    pub head: Option<u64>,

    /// Mark the final line of each file
    #[arg(long)]
    pub show_last: bool,

    /// Read through the cooperative async driver
    #[arg(long)]
    pub cooperative: bool,

    #[command(flatten)]
    pub reader: ReaderArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text with one line per line
    Text,
    /// JSON array of lines with metadata
    Json,
}

impl SplitArgs {
    /// Execute the split command
    pub fn execute(&self) -> Result<()> {
        self.log.init_logging();
        log::info!("Starting line splitting");
        log::debug!("Arguments: {:?}", self);

        let file_config = self.reader.load_config()?;
        let config = self.reader.reader_config(&file_config)?;
        let files = resolve_patterns(&self.input)?;

        let mut formatter = self.create_formatter(&file_config, files.len() > 1)?;
        let mut progress = ProgressReporter::new(self.log.quiet);
        progress.init_files(files.len() as u64);

        for path in &files {
            formatter.begin_file(path)?;
            let traversal = if self.cooperative {
                self.split_cooperative(path, &config, formatter.as_mut())?
            } else {
                self.split_blocking(path, &config, formatter.as_mut())?
            };
            log::info!(
                "{}: {} lines{}",
                path.display(),
                traversal.lines,
                if traversal.stopped_early { " (stopped early)" } else { "" }
            );
            progress.file_completed(&path.display().to_string(), traversal.lines);
        }

        formatter.finish()?;
        progress.finish();
        Ok(())
    }

    fn create_formatter(
        &self,
        file_config: &CliConfig,
        multiple_files: bool,
    ) -> Result<Box<dyn OutputFormatter>> {
        let format = match self.format {
            Some(format) => format,
            None => OutputFormat::from_str(&file_config.output.format, true).map_err(|_| {
                crate::error::CliError::ConfigError(format!(
                    "unknown output format '{}'",
                    file_config.output.format
                ))
            })?,
        };
        let show_last = self.show_last || file_config.output.show_last;
        let pretty = file_config.output.pretty_json;

        let formatter: Box<dyn OutputFormatter> = match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file {}", path.display()))?;
                build_formatter(format, BufWriter::new(file), show_last, multiple_files, pretty)
            }
            None => build_formatter(
                format,
                BufWriter::new(io::stdout()),
                show_last,
                multiple_files,
                pretty,
            ),
        };
        Ok(formatter)
    }

    fn wants_more(&self, delivered: u64) -> bool {
        self.head.map_or(true, |head| delivered < head)
    }

    fn split_blocking(
        &self,
        path: &Path,
        config: &ReaderConfig,
        formatter: &mut dyn OutputFormatter,
    ) -> Result<Traversal> {
        if self.head == Some(0) {
            return Ok(Traversal::default());
        }

        let mut number = 0;
        let mut write_error = None;
        let traversal = each_line_sync(path, config, |line, last| {
            number += 1;
            if let Err(e) = formatter.format_line(&line, number, last) {
                write_error = Some(e);
                return false;
            }
            self.wants_more(number)
        })
        .with_context(|| format!("Failed to split {}", path.display()))?;

        match write_error {
            Some(e) => Err(e),
            None => Ok(traversal),
        }
    }

    fn split_cooperative(
        &self,
        path: &Path,
        config: &ReaderConfig,
        formatter: &mut dyn OutputFormatter,
    ) -> Result<Traversal> {
        if self.head == Some(0) {
            return Ok(Traversal::default());
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .context("Failed to start async runtime")?;

        runtime.block_on(async {
            let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
            let traversal = each_line_with_continuation(path, config, move |line, last, next| {
                // a dropped receiver drops `next`, which stops the traversal
                let _ = tx.send((line, last, next));
            });

            let mut number = 0;
            let mut write_error = None;
            while let Some((line, last, next)) = rx.recv().await {
                number += 1;
                match formatter.format_line(&line, number, last) {
                    Ok(()) => next.resume(self.wants_more(number)),
                    Err(e) => {
                        next.stop();
                        write_error = Some(e);
                    }
                }
            }

            let traversal = traversal
                .await
                .with_context(|| format!("Failed to split {}", path.display()))?;
            match write_error {
                Some(e) => Err(e),
                None => Ok(traversal),
            }
        })
    }
}

fn build_formatter<W>(
    format: OutputFormat,
    writer: W,
    show_last: bool,
    headers: bool,
    pretty: bool,
) -> Box<dyn OutputFormatter>
where
    W: io::Write + Send + Sync + 'static,
{
    match format {
        OutputFormat::Text => Box::new(
            TextFormatter::new(writer)
                .show_last(show_last)
                .headers(headers),
        ),
        OutputFormat::Json => Box::new(JsonFormatter::new(writer).pretty(pretty)),
    }
}
