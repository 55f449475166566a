//! linewise command-line entry point

use clap::Parser;
use linewise_cli::commands::Commands;
use std::process::ExitCode;

/// Split files into lines, chunk by chunk
#[derive(Debug, Parser)]
#[command(name = "linewise", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
