//! CLI command implementations

use anyhow::Result;
use clap::Subcommand;

pub mod common;
pub mod count;
pub mod generate_config;
pub mod split;

/// Encoding labels listed by `linewise list encodings`
const COMMON_ENCODINGS: &[&str] = &[
    "utf-8",
    "utf-16le",
    "utf-16be",
    "latin1",
    "windows-1252",
    "iso-8859-15",
    "shift_jis",
    "euc-jp",
    "gbk",
    "big5",
    "euc-kr",
    "koi8-r",
];

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print every line of the input files
    Split(split::SplitArgs),

    /// Count the lines of the input files
    Count(count::CountArgs),

    /// Write a configuration file template
    GenerateConfig(generate_config::GenerateConfigArgs),

    /// List available components
    List {
        #[command(subcommand)]
        subcommand: ListCommands,
    },
}

/// List subcommands
#[derive(Debug, Subcommand)]
pub enum ListCommands {
    /// List available output formats
    Formats,

    /// List common encoding labels
    Encodings,
}

impl Commands {
    /// Run the selected command
    pub fn execute(&self) -> Result<()> {
        match self {
            Commands::Split(args) => args.execute(),
            Commands::Count(args) => args.execute(),
            Commands::GenerateConfig(args) => args.execute(),
            Commands::List { subcommand } => {
                for line in subcommand.entries() {
                    println!("{line}");
                }
                Ok(())
            }
        }
    }
}

impl ListCommands {
    /// Lines printed for this listing
    pub fn entries(&self) -> Vec<String> {
        match self {
            ListCommands::Formats => vec![
                "text  - one line per output line".to_string(),
                "json  - array of {file, number, text, last} records".to_string(),
            ],
            ListCommands::Encodings => COMMON_ENCODINGS
                .iter()
                .filter_map(|label| {
                    encoding_rs::Encoding::for_label(label.as_bytes())
                        .map(|encoding| format!("{label:<14} {}", encoding.name()))
                })
                .collect(),
        }
    }
}
