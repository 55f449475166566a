//! Count command implementation

use super::common::{LogArgs, ReaderArgs};
use crate::input::resolve_patterns;
use crate::progress::ProgressReporter;
use anyhow::{Context, Result};
use clap::Args;
use linewise_core::ReaderConfig;
use std::io::Write;
use std::path::Path;

/// Arguments for the count command
#[derive(Debug, Args)]
pub struct CountArgs {
    /// Input files or patterns (supports glob)
    #[arg(short, long, value_name = "FILE/PATTERN", required = true)]
    pub input: Vec<String>,

    /// Read through the cooperative async line source
    #[arg(long)]
    pub cooperative: bool,

    #[command(flatten)]
    pub reader: ReaderArgs,

    #[command(flatten)]
    pub log: LogArgs,
}

impl CountArgs {
    /// Execute the count command
    pub fn execute(&self) -> Result<()> {
        self.log.init_logging();
        log::debug!("Arguments: {:?}", self);

        let file_config = self.reader.load_config()?;
        let config = self.reader.reader_config(&file_config)?;
        let files = resolve_patterns(&self.input)?;

        let mut progress = ProgressReporter::new(self.log.quiet);
        progress.init_files(files.len() as u64);

        let mut stdout = std::io::stdout().lock();
        let mut total = 0;
        for path in &files {
            let lines = if self.cooperative {
                count_cooperative(path, &config)
            } else {
                count_blocking(path, &config).map_err(anyhow::Error::from)
            }
            .with_context(|| format!("Failed to count lines of {}", path.display()))?;

            total += lines;
            progress.file_completed(&path.display().to_string(), lines);
            writeln!(stdout, "{lines:>8} {}", path.display())?;
        }
        progress.finish();

        if files.len() > 1 {
            writeln!(stdout, "{total:>8} total")?;
        }
        stdout.flush()?;
        Ok(())
    }
}

/// Count the lines of `path` with the blocking line source
pub fn count_blocking(path: &Path, config: &ReaderConfig) -> linewise_core::Result<u64> {
    let mut lines = 0;
    for line in linewise_core::open_sync(path, config)? {
        line?;
        lines += 1;
    }
    Ok(lines)
}

/// Count the lines of `path` with the cooperative line source
pub fn count_cooperative(path: &Path, config: &ReaderConfig) -> Result<u64> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .context("Failed to start async runtime")?;

    let lines = runtime.block_on(async {
        let mut reader = linewise_core::open(path, config).await?;
        let mut lines = 0;
        while reader.has_next_line() {
            reader.next_line().await?;
            lines += 1;
        }
        reader.close().await?;
        Ok::<_, linewise_core::LineError>(lines)
    })?;
    Ok(lines)
}
